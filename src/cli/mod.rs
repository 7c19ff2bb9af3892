pub mod categories;
pub mod import;
pub mod init;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{BudgetError, Result};
use crate::settings::{db_path, get_data_dir};

/// Open the configured database, refusing to create one outside `init`.
pub(crate) fn open_db() -> Result<Connection> {
    let path = db_path(&get_data_dir());
    if !path.exists() {
        return Err(BudgetError::Other(format!(
            "Database not found at {}. Run `budgetbook init` first.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub(crate) fn parse_date_arg(raw: &Option<String>) -> Result<Option<chrono::NaiveDate>> {
    raw.as_deref().map(crate::importer::parse_date).transpose()
}

#[derive(Parser)]
#[command(
    name = "budgetbook",
    version,
    about = "Family budget tracker: import bank exports and statements into a local ledger."
)]
pub struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for budget data (default: ~/Documents/budgetbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a CSV export or PDF statement.
    Import {
        /// Path to a .csv or .pdf file
        file: String,
        /// Parser to use instead of guessing from the extension (csv, pdf)
        #[arg(long)]
        format: Option<String>,
        /// Show what would be imported without saving anything
        #[arg(long)]
        preview: bool,
        /// Print the import result as JSON
        #[arg(long)]
        json: bool,
        /// Account name for rows that do not carry one
        #[arg(long)]
        account: Option<String>,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Browse stored transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List all categories.
    List,
    /// Add a new category.
    Add {
        /// Category name
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List transactions, newest first.
    List {
        /// Earliest date to include
        #[arg(long)]
        from: Option<String>,
        /// Latest date to include
        #[arg(long)]
        to: Option<String>,
    },
}
