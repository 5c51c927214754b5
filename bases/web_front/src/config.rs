// bases/web_front/src/config.rs
use clap::Parser;
use std::path::PathBuf;

const MEGABYTE: usize = 1024 * 1024;

/// Assets shipped with this crate
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Web front configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Flat directory downloads are written to and served from
    pub download_dir: PathBuf,

    /// Directory with the page's static assets
    pub static_dir: PathBuf,

    /// Ceiling on incoming request bodies, in bytes
    pub max_body_bytes: usize,

    /// Extractor executable
    pub ytdlp: PathBuf,
}

/// Media fetch web front
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,

    /// Directory to store downloaded files in (created if missing)
    #[arg(short, long, default_value = "downloads")]
    pub download_dir: PathBuf,

    /// Directory with static assets served under /static
    #[arg(long, default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    /// Maximum request body size in megabytes
    #[arg(long, default_value_t = 100)]
    pub max_body_mb: usize,

    /// Path or name of the yt-dlp executable
    #[arg(long = "yt-dlp", default_value = "yt-dlp")]
    pub ytdlp: PathBuf,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            download_dir: args.download_dir,
            static_dir: args.static_dir,
            max_body_bytes: args.max_body_mb.saturating_mul(MEGABYTE),
            ytdlp: args.ytdlp,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
