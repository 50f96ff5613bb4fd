use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use medassist_client::{ApiClient, PriceReportDraft, api_url_from_env};
use medassist_core::reporting::{ForwardingReporter, install_reporter};
use medassist_core::{DEFAULT_HTTP_PORT, InsuranceType, env_string};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "medassist")]
#[command(about = "Medication cost-assistance server and API tools", long_about = None)]
struct Cli {
    /// Server base URL for client commands (defaults to MEDASSIST_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_HTTP_PORT)]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// JSON fixture for the in-memory backend (ignored with DATABASE_URL)
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Apply the PostgreSQL schema
    Migrate,
    /// Look up a medication strategy, or list all of them
    Strategy {
        medication_id: Option<String>,
        /// Only show savings options open to this insurance type
        #[arg(short, long)]
        insurance: Option<InsuranceType>,
        /// Plain-text output instead of JSON
        #[arg(long)]
        human: bool,
    },
    /// Price statistics for one medication at one source
    Prices { medication_id: String, source: String },
    /// Submit a price report
    Report {
        medication_id: String,
        source: String,
        price: f64,
        #[arg(short, long)]
        location: Option<String>,
        /// Date paid, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Price statistics for every medication and source
    PriceStats,
}

pub(crate) fn database_url() -> Option<String> {
    env_string("DATABASE_URL")
}

fn api_client(api_url: Option<String>) -> Result<ApiClient> {
    let url = api_url.unwrap_or_else(api_url_from_env);
    Ok(ApiClient::new(&url)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();
    install_reporter(Arc::new(ForwardingReporter::new(None)));

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, fixtures } => {
            commands::serve::run(port, host, fixtures.as_deref()).await?;
        },
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Strategy { medication_id, insurance, human } => {
            commands::client::strategy(
                api_client(cli.api_url)?,
                medication_id.as_deref(),
                insurance,
                human,
            )
            .await?;
        },
        Commands::Prices { medication_id, source } => {
            commands::client::prices(api_client(cli.api_url)?, &medication_id, &source).await?;
        },
        Commands::Report { medication_id, source, price, location, date } => {
            let draft = PriceReportDraft { medication_id, source, price, location, date };
            commands::client::report(api_client(cli.api_url)?, draft).await?;
        },
        Commands::PriceStats => commands::client::price_stats(api_client(cli.api_url)?).await?,
    }

    Ok(())
}
