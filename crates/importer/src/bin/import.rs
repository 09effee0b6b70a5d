use clap::{Parser, Subcommand};
use importer::{ParsedFile, read_registrations, read_scores};
use sqlx::postgres::PgPoolOptions;
use std::fs::File;
use std::path::{Path, PathBuf};
use storage::{
    dto::import::{ImportRegistrationsRequest, ImportReport, ImportScoresRequest},
    models::Round,
    services::batch_import,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OPERATOR: &str = "meet-import";

#[derive(Parser)]
#[command(name = "meet-import")]
#[command(about = "Athletics meet registration and result importer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// CSV with columns student_no,event_name[,group_name]
    Registrations {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// CSV with columns student_no,event_name,value
    Scores {
        file: PathBuf,

        #[arg(long, default_value = "final")]
        round: Round,

        #[arg(long)]
        validate_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("meet_import={log_level},importer={log_level},storage={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let report = match cli.command {
        Commands::Registrations {
            file,
            validate_only,
        } => handle_registrations(&file, validate_only, &cli.database_url).await?,
        Commands::Scores {
            file,
            round,
            validate_only,
        } => handle_scores(&file, round, validate_only, &cli.database_url).await?,
    };

    log_report(&report);

    if report.failed > 0 {
        return Err(format!("{} row(s) failed to import", report.failed).into());
    }

    Ok(())
}

async fn handle_registrations(
    file: &Path,
    validate_only: bool,
    database_url: &str,
) -> Result<ImportReport, Box<dyn std::error::Error>> {
    tracing::info!("Loading registrations from: {}", file.display());
    let parsed = read_registrations(File::open(file)?)?;
    log_parsed(&parsed);

    if validate_only {
        return Ok(parsed.merge_report(ImportReport::default()));
    }

    let pool = connect(database_url).await?;
    let request = ImportRegistrationsRequest {
        rows: parsed.rows.clone(),
    };
    let report = batch_import::import_registrations(&pool, &request, Some(OPERATOR)).await?;

    Ok(parsed.merge_report(report))
}

async fn handle_scores(
    file: &Path,
    round: Round,
    validate_only: bool,
    database_url: &str,
) -> Result<ImportReport, Box<dyn std::error::Error>> {
    tracing::info!("Loading {} results from: {}", round.as_str(), file.display());
    let parsed = read_scores(File::open(file)?)?;
    log_parsed(&parsed);

    if validate_only {
        return Ok(parsed.merge_report(ImportReport::default()));
    }

    let pool = connect(database_url).await?;
    let request = ImportScoresRequest {
        round: round.as_str().to_string(),
        rows: parsed.rows.clone(),
    };
    let report = batch_import::import_scores(&pool, &request, Some(OPERATOR)).await?;

    Ok(parsed.merge_report(report))
}

async fn connect(database_url: &str) -> Result<sqlx::PgPool, sqlx::Error> {
    tracing::info!("Connecting to database...");
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

fn log_parsed<T>(parsed: &ParsedFile<T>) {
    tracing::info!(
        "Read {} row(s), {} unreadable line(s)",
        parsed.rows.len(),
        parsed.errors.len()
    );
}

fn log_report(report: &ImportReport) {
    for error in &report.errors {
        tracing::warn!("  line {}: {}", error.row, error.message);
    }

    tracing::info!(
        "Summary: {} succeeded, {} skipped, {} failed",
        report.succeeded,
        report.skipped,
        report.failed
    );
}
