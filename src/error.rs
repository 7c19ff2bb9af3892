use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Whole-file failure: the header row lacks required columns.
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Per-row failure: a date or amount cell could not be normalized.
    #[error("{0}")]
    Parse(String),

    /// Per-candidate failure: the store rejected an insert.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Error reading PDF: {0}")]
    Extraction(String),

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_missing_columns() {
        let err = BudgetError::Schema {
            missing: vec!["date".to_string(), "amount".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required columns: date, amount");
    }

    #[test]
    fn test_parse_error_is_bare_message() {
        let err = BudgetError::Parse("Unable to parse date: 13/45/2025".to_string());
        assert_eq!(err.to_string(), "Unable to parse date: 13/45/2025");
    }
}
