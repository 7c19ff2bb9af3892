mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod settings;

use clap::Parser;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

use cli::{CategoriesCommands, Cli, Commands, TransactionsCommands};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            file,
            format,
            preview,
            json,
            account,
        } => cli::import::run(&file, format.as_deref(), preview, json, account),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add { name, description } => {
                cli::categories::add(&name, description.as_deref())
            }
        },
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { from, to } => cli::transactions::list(from, to),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
