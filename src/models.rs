use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[allow(dead_code)]
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed-but-not-yet-persisted transaction. `amount` is never negative;
/// direction lives in `transaction_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionCandidate {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub transaction_type: TransactionType,
    pub account_name: Option<String>,
    pub notes: Option<String>,
}

impl TransactionCandidate {
    /// Stores the absolute value of `amount`; the sign is the caller's to
    /// turn into `transaction_type` first.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            date,
            description: description.into().trim().to_string(),
            amount: amount.abs(),
            category_id: None,
            transaction_type,
            account_name: None,
            notes: None,
        }
    }
}

/// A persisted transaction row, as listed back out of the store.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub category_name: Option<String>,
    pub transaction_type: String,
    pub account_name: Option<String>,
}
