use std::io::{stderr, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use statement_sync::api::{DashboardApi, Document, HttpApi};
use statement_sync::config::SyncConfig;
use statement_sync::engine::{ConnectionState, DashboardEngine, DashboardView};
use statement_sync::models::{AggregateStats, Job, Transaction};
use statement_sync::storage::TransactionStore;
use statement_sync::types::TransactionId;

#[derive(Debug, Parser)]
#[command(name = "statement-sync", version, about = "Live view of the bank statement processing pipeline")]
struct Cli {
    #[command(flatten)]
    config: SyncConfig,

    /// Available log levels: error, warn, info, debug, trace
    #[arg(long, global = true, env = "STATEMENT_SYNC_LOG_LEVEL", default_value = "error")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Follow jobs and transactions live until interrupted (default)
    Watch,
    /// Print the current jobs, transactions and totals as JSON
    Snapshot,
    /// Upload a statement for processing
    Upload {
        path: PathBuf
    },
    /// Delete a single transaction from the ledger
    DeleteTransaction {
        id: TransactionId
    },
    /// Delete the newest job together with its transactions
    DeleteLatestJob
}

#[derive(Serialize)]
struct Snapshot<'a> {
    jobs: &'a [Job],
    transactions: &'a [Transaction],
    stats: AggregateStats
}

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: A missing .env file is the normal case
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    setup_logging(parse_log_level(&cli.log_level));

    let timer = Instant::now();

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(&cli.config).await?,
        Commands::Snapshot => snapshot(&cli.config).await?,
        Commands::Upload { path } => {
            let document = Document::read(&path).await?;
            let receipt = http_api(&cli.config)?.submit_document(document).await?;

            match receipt.id {
                Some(job_id) => println!("Submitted {} as job {job_id}", path.display()),
                None => println!("Submitted {}", path.display())
            }
        }
        Commands::DeleteTransaction { id } => {
            http_api(&cli.config)?.delete_transaction(id).await?;
            println!("Deleted transaction {id}");
        }
        Commands::DeleteLatestJob => {
            http_api(&cli.config)?.delete_most_recent_job().await?;
            println!("Deleted the most recent job");
        }
    }

    info!("Finished in: {:?}", timer.elapsed());

    Ok(())
}

fn http_api(config: &SyncConfig) -> Result<HttpApi> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    Ok(HttpApi::new(client, &config.jobs_url, &config.ledger_url))
}

async fn snapshot(config: &SyncConfig) -> Result<()> {
    let api = http_api(config)?;

    let (jobs, transactions, server_stats) = tokio::join!(api.list_jobs(), api.list_transactions(), api.fetch_stats());

    let jobs = jobs.context("Failed to fetch jobs")?;
    let mut store = TransactionStore::new();
    store.replace_all(transactions.context("Failed to fetch transactions")?);

    match server_stats {
        Ok(server_stats) => {
            store.check_server_stats(&server_stats);
        }
        Err(error) => warn!("Ledger stats unavailable: {error}")
    }

    let mut output = BufWriter::new(stdout().lock());

    serde_json::to_writer_pretty(&mut output, &Snapshot {
        jobs: &jobs,
        transactions: store.transactions(),
        stats: store.stats()
    })?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}

async fn watch(config: &SyncConfig) -> Result<()> {
    let engine = DashboardEngine::start(config)?;
    let mut views = engine.handle().subscribe();

    print_view(&views.borrow_and_update());

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }

                print_view(&views.borrow_and_update());
            }
        }
    }

    engine.shutdown().await;

    Ok(())
}

fn print_view(view: &DashboardView) {
    let connection = match &view.connection {
        ConnectionState::Connecting => "connecting".to_string(),
        ConnectionState::Connected => "live".to_string(),
        ConnectionState::Disconnected(error) => format!("offline ({error})")
    };

    let uploads = view.jobs.iter().filter(|entry| entry.optimistic).count();
    let last_completed = view.last_completed_job.as_ref()
        .map(|job| job.file_name().to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "[{connection}] jobs: {} (uploading: {uploads}) | last completed: {last_completed} | transactions: {} | income: {} | expenses: {} | balance: {}",
        view.jobs.len() - uploads,
        view.stats.total_count,
        view.stats.total_income,
        view.stats.total_expenses,
        view.stats.total_balance
    );

    if let Some(error) = &view.error {
        println!("  error: {error}");
    }
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the command output, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
