//! lexis server binary.
//!
//! Reads `lexis.toml` (or the path specified with `--config`), opens the
//! SQLite vocabulary store, and serves the translation API over HTTP. The
//! daily word set is generated through Gemini.

mod config;
mod gemini;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use lexis_core::{engine::Engine, memory::MemoryStore, store::VocabStore};
use lexis_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  config::{ServerConfig, expand_tilde},
  gemini::GeminiOracle,
};

#[derive(Parser)]
#[command(author, version, about = "Lexis vocabulary server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "lexis.toml")]
  config: PathBuf,

  /// Keep all state in memory; nothing survives a restart.
  #[arg(long)]
  in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let oracle =
    GeminiOracle::new(server_cfg.gemini()).context("failed to build Gemini client")?;

  if cli.in_memory {
    tracing::warn!("running with an in-memory store");
    return serve(MemoryStore::new(), oracle, &server_cfg).await;
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = ?store_path, "opened vocabulary store");

  serve(store, oracle, &server_cfg).await
}

async fn serve<S>(store: S, oracle: GeminiOracle, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: VocabStore + 'static,
{
  let engine = Arc::new(Engine::new(
    store,
    oracle,
    server_cfg.matcher(),
    server_cfg.engine_config(),
  ));

  let app = lexis_api::api_router(engine);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
