use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::list_transactions;
use crate::error::Result;
use crate::fmt::money;

use super::{open_db, parse_date_arg};

pub fn list(from: Option<String>, to: Option<String>) -> Result<()> {
    let from = parse_date_arg(&from)?;
    let to = parse_date_arg(&to)?;
    let conn = open_db()?;
    let rows = list_transactions(&conn, from, to)?;

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Category", "Account"]);
    for t in &rows {
        let amount = if t.transaction_type == "income" {
            money(t.amount).green().to_string()
        } else {
            money(t.amount).red().to_string()
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(amount),
            Cell::new(t.category_name.as_deref().unwrap_or("Uncategorized")),
            Cell::new(t.account_name.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    println!("{} transaction(s)", rows.len());
    Ok(())
}
