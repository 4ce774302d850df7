//! GBIF Explorer - Entry Point
//!
//! Runs the web interface or a one-off import from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gbif_explorer::{
    Database, GbifClient, config::Config, import::import_person, server::WebServer,
};

#[derive(Parser, Debug)]
#[command(name = "gbif-explorer")]
#[command(about = "Download, filter and export GBIF occurrences by collector name")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web interface
    Serve {
        /// HTTP server port
        #[arg(long, default_value = "5000", env = "PORT")]
        port: u16,
    },
    /// Download and store all occurrences recorded by a person
    Import {
        /// Collector name as it appears in `recordedBy`
        person_name: String,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting GBIF Explorer");

    let config = Config::from_env()?;
    let db = Database::new(&config.database_path).await?;
    let client = GbifClient::new(&config)?;

    match cli.command {
        Command::Serve { port } => {
            tracing::info!(port, database = %config.database_path.display(), "Running web server");
            WebServer::new(db, client, config).run(port).await?;
        }
        Command::Import { person_name } => {
            let outcome = import_person(&db, &client, &person_name).await?;
            println!(
                "Search {}: fetched {}, stored {}, skipped {}",
                outcome.search_id, outcome.fetched, outcome.inserted, outcome.skipped
            );
            db.close().await;
        }
    }

    Ok(())
}
