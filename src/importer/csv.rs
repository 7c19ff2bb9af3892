use std::collections::HashMap;

use rust_decimal::Decimal;

use super::{decode_text, parse_amount, parse_date, ParseReport};
use crate::categorizer::CategoryMatcher;
use crate::error::{BudgetError, Result};
use crate::models::{TransactionCandidate, TransactionType};

const REQUIRED_COLUMNS: &[&str] = &["date", "description", "amount"];

/// Header lookup keyed by trimmed, lower-cased column name.
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            // First occurrence of a repeated header wins.
            index.entry(name.trim().to_lowercase()).or_insert(i);
        }
        Self { index }
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn missing(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .filter(|n| !self.has(n))
            .map(|n| n.to_string())
            .collect()
    }

    /// Trimmed cell for `name`, `None` when the column is absent.
    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.index
            .get(name)
            .map(|&i| record.get(i).unwrap_or_default().trim())
    }
}

/// Parse a header-row CSV export. Missing required columns fail the whole
/// file before any row is read; a bad row is recorded and skipped.
pub fn parse_csv(data: &[u8], matcher: &CategoryMatcher) -> Result<ParseReport> {
    let text = decode_text(data);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = Columns::new(rdr.headers()?);
    let missing = columns.missing(REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(BudgetError::Schema { missing });
    }

    let mut report = ParseReport::default();
    for (idx, result) in rdr.records().enumerate() {
        let row = idx + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                report.fail(row, e.to_string());
                continue;
            }
        };
        // Blank lines carry no cells worth reporting.
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match parse_row(&columns, &record, matcher) {
            Ok(candidate) => report.push(candidate),
            Err(e) => report.fail(row, e.to_string()),
        }
    }
    Ok(report)
}

fn parse_row(
    columns: &Columns,
    record: &csv::StringRecord,
    matcher: &CategoryMatcher,
) -> Result<TransactionCandidate> {
    let date = parse_date(columns.get(record, "date").unwrap_or_default())?;
    let amount = parse_amount(columns.get(record, "amount").unwrap_or_default())?;
    if amount.is_zero() {
        return Err(BudgetError::Parse("Amount must be non-zero".to_string()));
    }
    let transaction_type = resolve_type(columns.get(record, "type"), amount);
    let description = columns.get(record, "description").unwrap_or_default();

    let mut candidate = TransactionCandidate::new(date, description, amount, transaction_type);
    candidate.category_id = columns
        .get(record, "category")
        .and_then(|hint| matcher.match_hint(hint));
    candidate.account_name = non_empty(columns.get(record, "account"));
    candidate.notes = non_empty(columns.get(record, "notes"));
    Ok(candidate)
}

/// An explicit `type` column decides by keyword; without one, a negative
/// amount is money coming in.
fn resolve_type(type_cell: Option<&str>, amount: Decimal) -> TransactionType {
    match type_cell {
        Some(cell) => {
            let t = cell.to_lowercase();
            if t.contains("income") || t.contains("credit") {
                TransactionType::Income
            } else {
                TransactionType::Expense
            }
        }
        None if amount.is_sign_negative() => TransactionType::Income,
        None => TransactionType::Expense,
    }
}

fn non_empty(cell: Option<&str>) -> Option<String> {
    cell.filter(|s| !s.is_empty()).map(str::to_string)
}
