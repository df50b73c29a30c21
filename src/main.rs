use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grant_rag::Result;
use grant_rag::commands;
use grant_rag::config::{Config, default_data_dir};

#[derive(Parser)]
#[command(name = "grant-rag")]
#[command(about = "Semantic grant search with LLM eligibility analysis and proposal drafting")]
#[command(version)]
struct Cli {
    /// Override the data directory (config file, grants file, vector index)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active configuration
    Config,
    /// Build the vector index from the grants file
    Index {
        /// Remove any existing index and rebuild from scratch
        #[arg(long)]
        rebuild: bool,
        /// Path to the grants JSON file (defaults to grants.json in the data
        /// directory)
        #[arg(long)]
        grants: Option<PathBuf>,
    },
    /// Search the index for grants matching a query
    Search {
        /// Free-text query
        query: String,
        /// Number of results to return
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
    /// Build or load the index, then serve the HTTP API
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show the state of the data directory and persisted index
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir().map_err(|e| grant_rag::GrantRagError::Config(e.to_string()))?,
    };
    let config = Config::load(&data_dir)?;

    match cli.command {
        Commands::Config => {
            commands::show_config(&config)?;
        }
        Commands::Index { rebuild, grants } => {
            let mut config = config;
            if grants.is_some() {
                config.grants_file = grants;
            }
            commands::build_index(config, rebuild).await?;
        }
        Commands::Search { query, limit } => {
            commands::search_once(config, &query, limit).await?;
        }
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            commands::serve(config).await?;
        }
        Commands::Status => {
            commands::show_status(config).await?;
        }
    }

    Ok(())
}
