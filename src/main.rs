use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use romanized_person_search::{
    config::{Config, ObservabilityConfig},
    models::Person,
    search::SearchService,
    state::InMemoryPersonStore,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "romsearch")]
#[command(about = "Romanization-aware person search", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "ROMSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of person records
    #[arg(short, long)]
    records: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every loaded record
    Index,

    /// Remove a record from the index
    Remove {
        #[arg(short, long)]
        repo: String,

        #[arg(short = 'i', long)]
        record_id: String,
    },

    /// Search persons by name
    Search {
        #[arg(short, long)]
        repo: String,

        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Remove expired records from the index
    Expire,

    /// Show index statistics
    Stats,
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("romanized_person_search={}", observability.log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output
    if observability.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.observability);

    tracing::info!("Starting romsearch v{}", env!("CARGO_PKG_VERSION"));

    let records = match &cli.records {
        Some(path) => InMemoryPersonStore::from_json_file(path)
            .with_context(|| format!("Failed to load records from {}", path.display()))?,
        None => InMemoryPersonStore::new(),
    };
    let records = Arc::new(records);
    tracing::info!(records = records.len(), "Record store initialized");

    let service = SearchService::new(config.search.clone(), records.clone())
        .context("Failed to initialize search service")?;

    // An in-memory index starts empty on every run
    if config.search.index_path.is_none() && !matches!(cli.command, Commands::Index) {
        service.index_records(&records.all()).await?;
    }

    match cli.command {
        Commands::Index => {
            let indexed = service.index_records(&records.all()).await?;
            println!("{}", serde_json::to_string_pretty(&json!({ "indexed": indexed }))?);
        }

        Commands::Remove { repo, record_id } => {
            let person = Person::new(repo, record_id);
            service.remove_record(&person).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "removed": romanized_person_search::search::document_id(&person.repo, &person.record_id),
                }))?
            );
        }

        Commands::Search { repo, limit, query } => {
            let results = service.search(&repo, &query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Commands::Expire => {
            let removed = service.remove_expired(&records.all(), Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&json!({ "removed": removed }))?);
        }

        Commands::Stats => {
            let stats = service.get_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
