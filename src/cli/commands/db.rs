use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::schema::SCHEMA;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create enum types, tables and indexes (idempotent)")]
    Init,

    #[command(about = "Check database connectivity")]
    Ping,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to the database (is DATABASE_URL set?)")?;

    match cmd {
        DbCommands::Init => {
            DatabaseManager::bootstrap_schema(&pool)
                .await
                .context("schema bootstrap failed")?;
            output_success(
                output_format,
                "Database schema is up to date",
                Some(json!({ "statements": SCHEMA.len() })),
            )
        }
        DbCommands::Ping => {
            DatabaseManager::health_check(&pool)
                .await
                .context("database did not answer")?;
            output_success(output_format, "Database is reachable", None)
        }
    }
}
