use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::prelude::ToPrimitive;

use crate::error::{BudgetError, Result};
use crate::models::{Category, Transaction, TransactionCandidate};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    category_id INTEGER,
    transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
    account_name TEXT,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
";

// (name, description)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Housing", "Rent, mortgage, repairs"),
    ("Food & Groceries", "Supermarket runs, eating out"),
    ("Transportation", "Fuel, transit, rideshare, parking"),
    ("Healthcare", "Doctor visits, pharmacy, insurance copays"),
    ("Entertainment", "Streaming, movies, games, outings"),
    ("Education", "School fees, books, courses"),
    ("Shopping", "Clothing, household goods, online orders"),
    ("Bills & Utilities", "Electric, water, internet, phone"),
    ("Personal Care", "Haircuts, toiletries, gym"),
    ("Savings", "Transfers into savings and investments"),
    ("Income", "Salary, refunds, gifts received"),
    ("Other", "Anything else"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, description) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, description) VALUES (?1, ?2)",
                params![name, description],
            )?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM categories ORDER BY name")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn create_category(conn: &Connection, name: &str, description: Option<&str>) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BudgetError::Other("Category name cannot be empty".to_string()));
    }
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1 COLLATE NOCASE",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(BudgetError::Other(format!("Category '{name}' already exists")));
    }
    conn.execute(
        "INSERT INTO categories (name, description) VALUES (?1, ?2)",
        params![name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Insert one candidate. Each insert is its own statement, so a rejected
/// row leaves earlier rows in place.
pub fn create_transaction(conn: &Connection, candidate: &TransactionCandidate) -> Result<i64> {
    let amount = candidate
        .amount
        .to_f64()
        .ok_or_else(|| BudgetError::Storage(format!("Amount out of range: {}", candidate.amount)))?;
    conn.execute(
        "INSERT INTO transactions (date, description, amount, category_id, transaction_type, account_name, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            candidate.date.format("%Y-%m-%d").to_string(),
            candidate.description,
            amount,
            candidate.category_id,
            candidate.transaction_type.as_str(),
            candidate.account_name,
            candidate.notes,
        ],
    )
    .map_err(|e| BudgetError::Storage(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Newest first. Either bound may be omitted; both are inclusive.
pub fn list_transactions(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Transaction>> {
    let from = from.map(|d| d.format("%Y-%m-%d").to_string());
    let to = to.map(|d| d.format("%Y-%m-%d").to_string());
    let mut stmt = conn.prepare(
        "SELECT t.id, t.date, t.description, t.amount, c.name, t.transaction_type, t.account_name
         FROM transactions t
         LEFT JOIN categories c ON t.category_id = c.id
         WHERE (?1 IS NULL OR t.date >= ?1) AND (?2 IS NULL OR t.date <= ?2)
         ORDER BY t.date DESC, t.id DESC",
    )?;
    let rows = stmt
        .query_map(params![from, to], |row| {
            Ok(Transaction {
                id: row.get(0)?,
                date: row.get(1)?,
                description: row.get(2)?,
                amount: row.get(3)?,
                category_name: row.get(4)?,
                transaction_type: row.get(5)?,
                account_name: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM transactions", [], |row| row.get(0))?)
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// What the importer needs from persistence.
pub trait TransactionStore {
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn create_transaction(&self, candidate: &TransactionCandidate) -> Result<i64>;
}

impl TransactionStore for Connection {
    fn list_categories(&self) -> Result<Vec<Category>> {
        list_categories(self)
    }

    fn create_transaction(&self, candidate: &TransactionCandidate) -> Result<i64> {
        create_transaction(self, candidate)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::models::TransactionType;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn candidate(date: &str, description: &str, amount: &str) -> TransactionCandidate {
        TransactionCandidate::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description,
            Decimal::from_str(amount).unwrap(),
            TransactionType::Expense,
        )
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["categories", "transactions"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        assert_eq!(list_categories(&conn).unwrap().len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_init_db_seeds_family_categories() {
        let (_dir, conn) = test_db();
        let names: Vec<String> = list_categories(&conn).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names.len(), 12);
        assert!(names.contains(&"Food & Groceries".to_string()));
        assert!(names.contains(&"Bills & Utilities".to_string()));
        // Listed by name.
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_create_category() {
        let (_dir, conn) = test_db();
        let id = create_category(&conn, "  Pets ", Some("Vet, food, toys")).unwrap();
        let pets = list_categories(&conn).unwrap().into_iter().find(|c| c.id == id).unwrap();
        assert_eq!(pets.name, "Pets");
        assert_eq!(pets.description.as_deref(), Some("Vet, food, toys"));
    }

    #[test]
    fn test_create_category_rejects_duplicates_and_blanks() {
        let (_dir, conn) = test_db();
        assert!(create_category(&conn, "housing", None).is_err());
        assert!(create_category(&conn, "   ", None).is_err());
    }

    #[test]
    fn test_create_and_list_transactions() {
        let (_dir, conn) = test_db();
        create_transaction(&conn, &candidate("2025-01-10", "Bakery", "6.25")).unwrap();
        let mut income = candidate("2025-01-31", "Paycheck", "2500.00");
        income.transaction_type = TransactionType::Income;
        income.category_id = list_categories(&conn)
            .unwrap()
            .iter()
            .find(|c| c.name == "Income")
            .map(|c| c.id);
        create_transaction(&conn, &income).unwrap();

        let rows = list_transactions(&conn, None, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "Paycheck");
        assert_eq!(rows[0].date, "2025-01-31");
        assert_eq!(rows[0].transaction_type, "income");
        assert_eq!(rows[0].category_name.as_deref(), Some("Income"));
        assert!((rows[0].amount - 2500.0).abs() < 0.001);
        assert_eq!(rows[1].category_name, None);
    }

    #[test]
    fn test_list_transactions_date_range() {
        let (_dir, conn) = test_db();
        for (date, desc) in [("2025-01-05", "A"), ("2025-02-05", "B"), ("2025-03-05", "C")] {
            create_transaction(&conn, &candidate(date, desc, "1.00")).unwrap();
        }
        let from = NaiveDate::from_ymd_opt(2025, 2, 1);
        let to = NaiveDate::from_ymd_opt(2025, 3, 5);
        let rows = list_transactions(&conn, from, to).unwrap();
        let descs: Vec<_> = rows.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["C", "B"]);
        assert_eq!(list_transactions(&conn, None, from).unwrap().len(), 1);
    }

    #[test]
    fn test_constraint_violation_is_storage_error() {
        let (_dir, conn) = test_db();
        let mut bad = candidate("2025-01-10", "Orphan", "6.25");
        bad.category_id = Some(9999);
        let err = create_transaction(&conn, &bad).unwrap_err();
        assert!(matches!(err, BudgetError::Storage(_)), "got {err:?}");
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn test_store_trait_on_connection() {
        let (_dir, conn) = test_db();
        let store: &dyn TransactionStore = &conn;
        assert_eq!(store.list_categories().unwrap().len(), 12);
        store.create_transaction(&candidate("2025-01-10", "Bakery", "6.25")).unwrap();
        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }
}
