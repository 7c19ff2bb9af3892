pub mod csv;
pub mod pdf;

use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::categorizer::CategoryMatcher;
use crate::db::TransactionStore;
use crate::error::{BudgetError, Result};
use crate::models::{Category, TransactionCandidate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Tried in order; the first format that consumes the whole string wins, so
/// `03/04/2025` is March 4 (month-first precedes day-first).
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%m.%d.%Y",
];

/// Statement PDFs also spell months out: `15 Jan 2025`, `15 January 2025`.
pub const STATEMENT_DATE_FORMATS: &[&str] = &["%d %b %Y", "%d %B %Y"];

pub fn parse_date_with(raw: &str, formats: &[&str]) -> Result<NaiveDate> {
    let s = raw.trim();
    formats
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        // chrono's %Y takes any width; only four-digit years are dates here.
        .find(|d| (1000..=9999).contains(&d.year()))
        .ok_or_else(|| BudgetError::Parse(format!("Unable to parse date: {s}")))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    parse_date_with(raw, DATE_FORMATS)
}

pub fn parse_statement_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).or_else(|_| parse_date_with(raw, STATEMENT_DATE_FORMATS))
}

/// Parse a signed amount: `$` and thousands separators are dropped and an
/// accounting-style `(123.45)` is read as `-123.45`.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = raw.replace(['$', ','], "");
    let s = cleaned.trim();
    let (negative, s) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };
    let value = Decimal::from_str(s)
        .map_err(|_| BudgetError::Parse(format!("Invalid amount: {}", raw.trim())))?;
    Ok(if negative { -value } else { value })
}

/// UTF-8 first, then a single-byte Latin fallback, then lossy UTF-8.
/// Never fails on encoding alone.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            match encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
            {
                Some(s) => {
                    debug!("input is not UTF-8, decoded as Latin-1");
                    s
                }
                None => String::from_utf8_lossy(bytes),
            }
        }
    };
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
            Some(rest) => Cow::Owned(rest.to_string()),
            None => Cow::Owned(s),
        },
    }
}

// ---------------------------------------------------------------------------
// Parse results
// ---------------------------------------------------------------------------

/// A row the parser dropped, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub row: usize,
    pub reason: String,
}

/// Successes and per-row failures from one file. Row failures never abort
/// the batch; they are only reported.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub candidates: Vec<TransactionCandidate>,
    pub failures: Vec<RowFailure>,
}

impl ParseReport {
    pub fn push(&mut self, candidate: TransactionCandidate) {
        self.candidates.push(candidate);
    }

    pub fn fail(&mut self, row: usize, reason: impl Into<String>) {
        self.failures.push(RowFailure {
            row,
            reason: reason.into(),
        });
    }
}

// ---------------------------------------------------------------------------
// Source kinds and modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Pdf,
}

impl SourceKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Pick a parser from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_key)
            .ok_or_else(|| {
                BudgetError::UnsupportedFile(format!(
                    "{} (expected a .csv or .pdf file)",
                    path.display()
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Preview,
    Commit,
}

/// Structured result of one import call. Serializes to the flat
/// `{success, ...}` JSON shapes the CLI prints with `--json`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ImportOutcome {
    Preview {
        success: bool,
        count: usize,
        preview: Vec<TransactionCandidate>,
    },
    Committed {
        success: bool,
        imported: usize,
        skipped: usize,
        errors: Vec<String>,
    },
    Failed {
        success: bool,
        error: String,
        imported: usize,
        skipped: usize,
        errors: Vec<String>,
    },
}

impl ImportOutcome {
    fn failed(err: &BudgetError) -> Self {
        Self::Failed {
            success: false,
            error: err.to_string(),
            imported: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Preview { success, .. }
            | Self::Committed { success, .. }
            | Self::Failed { success, .. } => *success,
        }
    }
}

// ---------------------------------------------------------------------------
// Importer
// ---------------------------------------------------------------------------

/// Drives preview and commit imports. Holds a category snapshot taken at
/// construction; build a new importer to see category changes.
pub struct Importer {
    matcher: CategoryMatcher,
    default_account: Option<String>,
}

impl Importer {
    pub fn new<S: TransactionStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self::from_categories(&store.list_categories()?))
    }

    pub fn from_categories(categories: &[Category]) -> Self {
        Self {
            matcher: CategoryMatcher::new(categories),
            default_account: None,
        }
    }

    /// Account name applied to candidates whose source row names none.
    pub fn with_default_account(mut self, account: Option<String>) -> Self {
        self.default_account = account.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn parse(&self, data: &[u8], kind: SourceKind) -> Result<ParseReport> {
        let mut report = match kind {
            SourceKind::Csv => self::csv::parse_csv(data, &self.matcher)?,
            SourceKind::Pdf => self::pdf::parse_pdf(data, &self.matcher)?,
        };

        for failure in &report.failures {
            warn!(
                source = kind.key(),
                row = failure.row,
                "Skipping row {}: {}",
                failure.row,
                failure.reason
            );
        }

        if let Some(account) = &self.default_account {
            for candidate in report.candidates.iter_mut() {
                if candidate.account_name.is_none() {
                    candidate.account_name = Some(account.clone());
                }
            }
        }
        Ok(report)
    }

    /// Run one import. Whole-file failures come back as a failed outcome;
    /// per-row and per-insert failures are counted and never abort the batch.
    pub fn import<S: TransactionStore + ?Sized>(
        &self,
        store: &S,
        data: &[u8],
        kind: SourceKind,
        mode: ImportMode,
    ) -> ImportOutcome {
        let report = match self.parse(data, kind) {
            Ok(report) => report,
            Err(e) => {
                warn!(source = kind.key(), "Import failed: {e}");
                return ImportOutcome::failed(&e);
            }
        };

        let candidates = report.candidates;
        if mode == ImportMode::Preview {
            debug!(count = candidates.len(), "preview only, nothing persisted");
            return ImportOutcome::Preview {
                success: true,
                count: candidates.len(),
                preview: candidates,
            };
        }

        let mut imported = 0usize;
        let mut skipped = 0usize;
        let mut errors = Vec::new();
        for candidate in &candidates {
            match store.create_transaction(candidate) {
                Ok(_) => imported += 1,
                Err(e) => {
                    skipped += 1;
                    let label = if candidate.description.is_empty() {
                        "transaction"
                    } else {
                        candidate.description.as_str()
                    };
                    errors.push(format!("Error importing {label}: {e}"));
                }
            }
        }

        info!(
            source = kind.key(),
            imported,
            skipped,
            dropped = report.failures.len(),
            "import committed"
        );
        ImportOutcome::Committed {
            success: true,
            imported,
            skipped,
            errors,
        }
    }
}
