use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::api::server::{AppState, router};
use crate::api::{GrantSearchResult, content_preview};
use crate::config::Config;
use crate::database::lancedb::VectorStore;
use crate::embeddings::ollama::OllamaClient;
use crate::indexer::Indexer;
use crate::pipeline::GrantPipeline;
use crate::{GrantRagError, Result};

/// Print the active configuration as TOML
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    println!("Data directory: {}", config.base_dir.display());
    println!("Config file: {}", config.config_file_path().display());
    println!();
    let rendered =
        toml::to_string_pretty(config).context("Failed to render configuration as TOML")?;
    println!("{}", rendered);
    Ok(())
}

/// Build the vector index from the grants file. With `rebuild`, any existing
/// persisted index is removed first; otherwise an existing index is left
/// alone.
#[inline]
pub async fn build_index(config: Config, rebuild: bool) -> Result<()> {
    if rebuild {
        VectorStore::wipe(&config)?;
    }

    let indexer = Indexer::new(config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .context("Failed to build progress style")?,
    );
    spinner.set_message("Embedding grant chunks...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let (store, stats) = indexer.ensure_index().await?;
    spinner.finish_and_clear();

    match stats {
        Some(stats) => {
            println!("✅ Index built successfully!");
            println!("  Grants indexed: {}", stats.grants);
            println!("  Chunks embedded: {}", stats.chunks);
        }
        None => {
            let rows = store.count_rows().await?;
            println!("Index already present ({} rows).", rows);
            println!("Use 'grant-rag index --rebuild' to rebuild it from scratch.");
        }
    }

    Ok(())
}

/// Run one similarity search from the command line and print the ranked
/// results
#[inline]
pub async fn search_once(config: Config, query: &str, limit: usize) -> Result<()> {
    let store = VectorStore::open_existing(&config)
        .await?
        .ok_or_else(|| {
            GrantRagError::IndexUnavailable(
                "no persisted index found; run 'grant-rag index' first".to_string(),
            )
        })?;

    let client =
        OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let query_vector = client
        .embed(query)
        .map_err(|e| GrantRagError::Embedding(format!("{:#}", e)))?;

    let results = store.search_similar(&query_vector, limit).await?;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("Top {} results for {:?}:", results.len(), query);
    println!();
    for (rank, result) in results.iter().enumerate() {
        let formatted = GrantSearchResult::from_search(result);
        println!(
            "{}. 📋 {} (distance {:.4})",
            rank + 1,
            if formatted.program_name.is_empty() {
                "<unnamed program>"
            } else {
                &formatted.program_name
            },
            formatted.relevance_score
        );
        if !formatted.location.is_empty() || !formatted.country.is_empty() {
            println!("   Location: {} {}", formatted.location, formatted.country);
        }
        if !formatted.program_status.is_empty() {
            println!("   Status: {}", formatted.program_status);
        }
        println!("   {}", content_preview(&formatted.full_content).replace('\n', " "));
        println!();
    }

    Ok(())
}

/// Build or load the index, then serve the HTTP API until interrupted
#[inline]
pub async fn serve(config: Config) -> Result<()> {
    let indexer = Indexer::new(config.clone())?;
    let (store, stats) = indexer.ensure_index().await?;
    if let Some(stats) = stats {
        info!(
            "Built index at startup: {} grants, {} chunks",
            stats.grants, stats.chunks
        );
    }

    let client = Arc::new(
        OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?,
    );

    // generation failures degrade to placeholder text, so a failed health
    // check is worth a warning but not a refusal to start
    if let Err(e) = client.health_check() {
        warn!("Ollama health check failed: {:#}", e);
        println!("⚠️  Ollama health check failed: {:#}", e);
        println!("   Generation requests will return placeholder text until it recovers.");
    }

    let state = AppState {
        store: Arc::new(store),
        client: Arc::clone(&client),
        pipeline: Arc::new(GrantPipeline::new(client)),
    };

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!("🌐 Serving grant API on http://{}", addr);
    println!("   POST /api/search, /api/eligibility, /api/questions, /api/answer, /api/generate_proposal");
    println!("Press Ctrl+C to stop the server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\n📴 Received interrupt signal, shutting down...");
        })
        .await
        .context("HTTP server error")?;

    println!("✅ Shutdown complete");
    Ok(())
}

/// Show the state of the data directory and persisted index
#[inline]
pub async fn show_status(config: Config) -> Result<()> {
    println!("Data directory: {}", config.base_dir.display());

    let grants_path = config.grants_file_path();
    if grants_path.exists() {
        println!("Grants file: {} ✅", grants_path.display());
    } else {
        println!("Grants file: {} (missing)", grants_path.display());
    }

    match VectorStore::open_existing(&config).await {
        Ok(Some(store)) => {
            println!(
                "Persisted index: {} rows at {}",
                store.count_rows().await?,
                config.vector_database_path().display()
            );
        }
        Ok(None) => {
            println!("Persisted index: not built (run 'grant-rag index')");
        }
        Err(GrantRagError::CorruptIndex(reason)) => {
            println!("Persisted index: unusable ({})", reason);
            println!("It will be rebuilt on the next 'grant-rag index' or 'grant-rag serve'.");
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
