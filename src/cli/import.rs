use std::collections::HashMap;
use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::list_categories;
use crate::error::{BudgetError, Result};
use crate::fmt::money_decimal;
use crate::importer::{ImportMode, ImportOutcome, Importer, SourceKind};
use crate::models::{TransactionCandidate, TransactionType};
use crate::settings::load_settings;

use super::open_db;

const MAX_ERRORS_SHOWN: usize = 5;

pub fn run(
    file: &str,
    format: Option<&str>,
    preview: bool,
    json: bool,
    account: Option<String>,
) -> Result<()> {
    let path = PathBuf::from(file);
    let kind = match format {
        Some(key) => SourceKind::from_key(key)
            .ok_or_else(|| BudgetError::UnsupportedFile(format!("unknown format '{key}'")))?,
        None => SourceKind::from_path(&path)?,
    };
    let data = std::fs::read(&path)?;

    let conn = open_db()?;
    let importer =
        Importer::new(&conn)?.with_default_account(account.or(load_settings().default_account));
    let mode = if preview { ImportMode::Preview } else { ImportMode::Commit };
    let outcome = importer.import(&conn, &data, kind, mode);

    if json {
        let out = serde_json::to_string_pretty(&outcome)
            .map_err(|e| BudgetError::Other(e.to_string()))?;
        println!("{out}");
        if outcome.is_success() {
            return Ok(());
        }
    }

    match outcome {
        ImportOutcome::Failed { error, .. } => Err(BudgetError::Other(error)),
        ImportOutcome::Preview { count, preview, .. } => {
            let categories = list_categories(&conn)?;
            let names: HashMap<i64, &str> =
                categories.iter().map(|c| (c.id, c.name.as_str())).collect();
            print_preview(&preview, &names);
            println!("{count} transaction(s) found. Nothing was saved.");
            Ok(())
        }
        ImportOutcome::Committed { imported, skipped, errors, .. } => {
            println!("{imported} imported, {skipped} skipped");
            for err in errors.iter().take(MAX_ERRORS_SHOWN) {
                println!("  {}", err.yellow());
            }
            if errors.len() > MAX_ERRORS_SHOWN {
                println!("  ... and {} more", errors.len() - MAX_ERRORS_SHOWN);
            }
            Ok(())
        }
    }
}

fn print_preview(candidates: &[TransactionCandidate], names: &HashMap<i64, &str>) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Type", "Category", "Account"]);
    for c in candidates {
        let amount = match c.transaction_type {
            TransactionType::Income => money_decimal(c.amount).green(),
            TransactionType::Expense => money_decimal(c.amount).red(),
        };
        let category = c
            .category_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or("");
        table.add_row(vec![
            Cell::new(c.date.format("%Y-%m-%d")),
            Cell::new(&c.description),
            Cell::new(amount),
            Cell::new(c.transaction_type),
            Cell::new(category),
            Cell::new(c.account_name.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
}
