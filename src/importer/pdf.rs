//! Bank-statement PDF extraction.
//!
//! Statements have no fixed schema, so extraction is a best-effort chain of
//! strategies over the document text: column-aligned tables first, then a
//! line-by-line scan that carries the last seen date forward. The first
//! strategy that yields anything wins.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{parse_amount, parse_statement_date, ParseReport};
use crate::categorizer::CategoryMatcher;
use crate::error::Result;
use crate::models::{TransactionCandidate, TransactionType};

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Slash/dash/dot digit groups (day or month first, or year first) and `15 Jan 2025`.
re!(re_date,
    r"(?i)\b(?:\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}|\d{4}[/.-]\d{1,2}[/.-]\d{1,2}|\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{4})\b");
// A whole table cell holding a money value with cents.
re!(re_amount_cell,
    r"^(?:\(\s*-?\$?\s*[\d,]*\d\.\d{2}\s*\)|-?\$?\s*-?[\d,]*\d\.\d{2})$");
// A money value with cents anywhere in a line of text.
re!(re_amount_text,
    r"\(\$?[\d,]*\d\.\d{2}\)|-?\$?[\d,]*\d\.\d{2}\b");
// Column gaps in laid-out text: tabs or runs of two or more spaces.
re!(re_column_gap, r"\t+|\s{2,}");

const INCOME_WORDS: &[&str] = &["credit", "deposit", "refund"];

/// Parse raw PDF bytes. An unreadable document fails the whole file; a
/// readable one with nothing recognizable is an empty success.
pub fn parse_pdf(data: &[u8], matcher: &CategoryMatcher) -> Result<ParseReport> {
    let text = extract_text(data)?;
    let candidates = extract_candidates(&text);
    if candidates.is_empty() {
        warn!(chars = text.len(), "no transactions recognized in PDF text");
    }
    let mut report = ParseReport::default();
    for mut candidate in candidates {
        if candidate.category_id.is_none() {
            candidate.category_id = matcher.match_description(&candidate.description);
        }
        report.push(candidate);
    }
    Ok(report)
}

/// pdf-extract panics on some malformed documents (unknown font encodings,
/// broken xref entries); a panic is an unreadable file like any other error.
#[cfg(feature = "pdf")]
fn extract_text(data: &[u8]) -> Result<String> {
    use crate::error::BudgetError;

    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(BudgetError::Extraction(e.to_string())),
        Err(payload) => {
            let detail = payload
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| payload.downcast_ref::<&str>().copied())
                .unwrap_or("malformed document");
            warn!("PDF extraction panicked: {detail}");
            Err(BudgetError::Extraction(detail.to_string()))
        }
    }
}

#[cfg(not(feature = "pdf"))]
fn extract_text(_data: &[u8]) -> Result<String> {
    Err(crate::error::BudgetError::UnsupportedFile(
        "PDF support is not compiled in (enable the `pdf` feature)".to_string(),
    ))
}

type Strategy = fn(&str) -> Vec<TransactionCandidate>;

const STRATEGIES: &[(&str, Strategy)] = &[("table", from_tables), ("text", from_lines)];

/// Run the strategy chain over extracted document text.
pub fn extract_candidates(text: &str) -> Vec<TransactionCandidate> {
    for (name, strategy) in STRATEGIES {
        let found = strategy(text);
        if !found.is_empty() {
            debug!(strategy = name, count = found.len(), "pdf strategy matched");
            return found;
        }
        debug!(strategy = name, "pdf strategy found nothing");
    }
    Vec::new()
}

fn looks_like_date(cell: &str) -> bool {
    re_date().is_match(cell)
}

fn looks_like_amount(cell: &str) -> bool {
    re_amount_cell().is_match(cell)
}

fn find_date(text: &str) -> Option<NaiveDate> {
    re_date()
        .find(text)
        .and_then(|m| parse_statement_date(m.as_str()).ok())
}

// ---------------------------------------------------------------------------
// Table strategy
// ---------------------------------------------------------------------------

/// Group each page's column-aligned lines into tables. A run of consecutive
/// lines that split into three or more cells is one table.
fn find_tables(text: &str) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    for page in text.split('\u{000C}') {
        let mut current: Vec<Vec<String>> = Vec::new();
        for line in page.lines() {
            let cells: Vec<String> = re_column_gap()
                .split(line.trim())
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if cells.len() >= 3 {
                current.push(cells);
            } else if !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            tables.push(current);
        }
    }
    tables
}

fn from_tables(text: &str) -> Vec<TransactionCandidate> {
    find_tables(text)
        .iter()
        .filter(|table| table.len() >= 2)
        // First row is the header.
        .flat_map(|table| table[1..].iter())
        .filter_map(|row| parse_table_row(row))
        .collect()
}

fn parse_table_row(cells: &[String]) -> Option<TransactionCandidate> {
    let mut date_cell: Option<&str> = None;
    let mut amount_cell: Option<&str> = None;
    let mut description: Vec<&str> = Vec::new();

    for cell in cells.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if date_cell.is_none() && looks_like_date(cell) {
            date_cell = Some(cell);
        } else if amount_cell.is_none() && looks_like_amount(cell) {
            amount_cell = Some(cell);
        } else {
            description.push(cell);
        }
    }

    let date = find_date(date_cell?)?;
    let amount = parse_amount(amount_cell?).ok().filter(|a| !a.is_zero())?;
    let transaction_type = if amount > Decimal::ZERO {
        TransactionType::Expense
    } else {
        TransactionType::Income
    };
    Some(TransactionCandidate::new(
        date,
        description.join(" "),
        amount,
        transaction_type,
    ))
}

// ---------------------------------------------------------------------------
// Text-line strategy
// ---------------------------------------------------------------------------

fn from_lines(text: &str) -> Vec<TransactionCandidate> {
    let mut current_date: Option<NaiveDate> = None;
    let mut out = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let date_match = re_date().find(line);
        if let Some(date) = date_match.and_then(|m| parse_statement_date(m.as_str()).ok()) {
            current_date = Some(date);
        }
        let Some(date) = current_date else {
            continue;
        };

        // Every date goes, so a dotted `15.01.2025` never reads as an amount.
        let rest = re_date().replace_all(line, " ");
        let Some(amount_match) = re_amount_text().find(&rest) else {
            continue;
        };
        let Ok(amount) = parse_amount(amount_match.as_str()) else {
            continue;
        };
        if amount.is_zero() {
            continue;
        }

        let description = re_amount_text()
            .replace_all(&rest, " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if description.is_empty() {
            continue;
        }

        let lower = description.to_lowercase();
        let transaction_type = if INCOME_WORDS.iter().any(|w| lower.contains(w)) {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };
        out.push(TransactionCandidate::new(date, description, amount, transaction_type));
    }
    out
}
