mod app;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use gameshelf_core::{
    config::{self, AppConfig},
    FileKeyValueStore, GameStorage, Library,
};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // The stock config file holds only comments; loading before writing it is safe.
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    config::ensure_default_config()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Starting gameshelf");

    let storage = GameStorage::new(FileKeyValueStore::new(&config.data_dir));
    let mut library = Library::new(storage);
    library.hydrate();

    let mut app = app::GameshelfApp::new(library);
    app.run().await
}

// The terminal owns stdout while the UI runs, so logs only go to a file.
fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("gameshelf.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
