use crate::db::{count_transactions, get_connection, list_categories};
use crate::error::Result;
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = db_path(&data_dir);

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!(
        "Account:    {}",
        settings.default_account.as_deref().unwrap_or("(not set)")
    );

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let categories = list_categories(&conn)?.len();
        let transactions = count_transactions(&conn)?;

        println!();
        println!("Categories:    {categories}");
        println!("Transactions:  {transactions}");
    } else {
        println!();
        println!("Database not found. Run `budgetbook init` to set up.");
    }

    Ok(())
}
