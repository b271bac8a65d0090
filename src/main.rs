use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pdfripper::config::Config;
use pdfripper::Extractor;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber, RUST_LOG overrides the default level
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse CLI arguments
    let config = Config::parse();

    info!("pdfripper v{} starting...", env!("CARGO_PKG_VERSION"));

    let extractor = Extractor::from_config(&config)
        .await
        .context("initializing extractor")?;
    extractor
        .extract_pages()
        .await
        .context("extracting pages")?;

    info!("Pages written to {}", extractor.output_dir().display());
    println!("Extraction complete.");
    Ok(())
}
