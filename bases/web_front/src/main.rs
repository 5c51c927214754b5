// bases/web_front/src/main.rs
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use media_downloader::{MediaDownloader, YtDlp};

mod config;
mod error;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web_front=info,media_downloader=info,tower_http=info".into()),
        )
        .init();

    let args = config::CliArgs::parse();
    let config = config::Config::from_args(args);

    let extractor = Arc::new(YtDlp::new(&config.ytdlp));
    let downloader = MediaDownloader::new_with_extractor(&config.download_dir, extractor).await?;
    tracing::info!(
        "Storing downloads in {}",
        downloader.download_path().display()
    );

    server::run(downloader, config).await?;

    Ok(())
}
