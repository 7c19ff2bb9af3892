use comfy_table::{Cell, Table};

use crate::db::{create_category, list_categories};
use crate::error::Result;

use super::open_db;

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let categories = list_categories(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Description"]);
    for cat in categories {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(cat.name),
            Cell::new(cat.description.unwrap_or_default()),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(name: &str, description: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let id = create_category(&conn, name, description)?;
    println!("Added category {id}: {}", name.trim());
    Ok(())
}
