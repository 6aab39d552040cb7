use std::time::Duration;

use clap::Parser;
use insights_core::{
    ChatClient, EmbeddingClient, IndexClient, IndexHandle, IndexSpec, InsightStore, InsightsConfig,
};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use insights_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "insights.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

/// Read a required secret from the environment; absence is fatal.
fn require_env(name: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => v,
        _ => {
            eprintln!("{} is not set — cannot start", name);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match InsightsConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Both provider keys are required up front
    let openai_key = require_env("OPENAI_API_KEY");
    let pinecone_key = require_env("PINECONE_API_KEY");

    let chat = ChatClient::new(openai_key.clone(), config.openai.chat_model.clone())?;
    let embeddings = EmbeddingClient::new(
        openai_key,
        config.openai.embedding_model.clone(),
        config.openai.dimensions,
    )?;
    let index = IndexClient::new(pinecone_key.clone())?;

    if args.health {
        match index.describe(&config.index.name).await {
            Ok(d) => println!(
                "✅ Index '{}' reachable (host {}, ready: {})",
                d.name, d.host, d.status.ready
            ),
            Err(e) => {
                println!("❌ Index '{}' check failed: {}", config.index.name, e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Provision the index before serving. This blocks startup until the
    // remote reports ready; there is no timeout.
    let spec = IndexSpec {
        name: config.index.name.clone(),
        dimension: config.openai.dimensions,
        metric: config.index.metric.clone(),
        cloud: config.index.cloud.clone(),
        region: config.index.region.clone(),
    };
    let host = index
        .ensure_index(
            &spec,
            Duration::from_secs(config.index.poll_interval_seconds),
        )
        .await?;
    tracing::info!(index = %config.index.name, host = %host, "Vector index ready");

    let handle = IndexHandle::new(&host, pinecone_key)?;
    let store = InsightStore::new(embeddings, handle);

    let state = HttpState {
        chat,
        store,
        index,
        config,
    };

    // Shutdown signal
    let (tx, rx) = broadcast::channel(1);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = tx.send(());
    });

    http::start_http_server(state, rx).await?;

    Ok(())
}
