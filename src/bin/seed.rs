// src/bin/seed.rs

//! On-demand import: `seed [DATA_DIR]`.
//!
//! Imports every JSON paper below the directory (default: `DATA_DIR` from the
//! environment) and prints the run summary. Safe to re-run.

use std::path::PathBuf;
use std::process::ExitCode;

use testprep::config::Config;
use testprep::db;
use testprep::services::{bootstrap, importer::ImportOutcome};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.rust_log))
        .with_target(false)
        .init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_dir.clone());

    let pool = match db::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Could not open database {}: {}", config.database_url, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = db::migrate(&pool).await {
        eprintln!("Could not apply migrations: {}", e);
        return ExitCode::FAILURE;
    }

    println!("Seeding from {}", data_dir.display());

    let code = match bootstrap::run_import(&pool, &data_dir).await {
        Ok(ImportOutcome::Completed(stats)) => {
            println!("{}", stats);
            ExitCode::SUCCESS
        }
        Ok(ImportOutcome::MissingDirectory(dir)) => {
            println!(
                "Data directory not found, created {}. Add JSON files to it and run again.",
                dir.display()
            );
            ExitCode::SUCCESS
        }
        Ok(ImportOutcome::NoFiles) => {
            println!("No JSON files found in {}", data_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Import failed: {}", e);
            ExitCode::FAILURE
        }
    };

    if let Some(seed) = &config.seed_user {
        if let Err(e) = bootstrap::seed_user(&pool, seed).await {
            eprintln!("Failed to seed user: {}", e);
            return ExitCode::FAILURE;
        }
    }

    code
}
