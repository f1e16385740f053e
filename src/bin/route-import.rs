use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use route_insights::config::{mask_password, Config, REQUIRED_VARIABLES};
use route_insights::db::Database;
use route_insights::import;

/// Loads last-mile dataset files into the route database.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: ImportCommand,
}

#[derive(Subcommand)]
enum ImportCommand {
    /// Route metadata and stops (`route_data.json`).
    Metadata { file: PathBuf },
    /// Recorded stop sequences (`actual_sequences.json`).
    Actual { file: PathBuf },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn read(file: &Path) -> anyhow::Result<String> {
    log::info!("Reading {}", file.display());
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::env().inspect_err(|e| {
        log::error!(
            "config: {e}. Check all required environment variables ({}) are set.",
            REQUIRED_VARIABLES.join(", ")
        );
    })?;

    let database = Database::connect(&config.pg_url).await?;
    log::info!("Connected to database ({})", mask_password(&config.pg_url));

    database.init_schema().await?;

    let summary = match args.command {
        ImportCommand::Metadata { file } => {
            let routes = import::parse_route_metadata(&read(&file)?)
                .with_context(|| format!("parsing {}", file.display()))?;
            log::info!("Loaded {} route entries", routes.len());

            import::import_route_metadata(&database.pool, &routes).await?
        }
        ImportCommand::Actual { file } => {
            let entries = import::parse_actual_sequences(&read(&file)?)
                .with_context(|| format!("parsing {}", file.display()))?;
            log::info!("Loaded {} route entries", entries.len());

            import::import_actual_sequences(&database.pool, &entries).await?
        }
    };

    summary.log();
    Ok(())
}
