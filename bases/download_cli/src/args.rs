// bases/download_cli/src/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and download media through yt-dlp
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to store downloaded files
    #[arg(short, long, global = true, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Path or name of the yt-dlp executable
    #[arg(long = "yt-dlp", global = true, default_value = "yt-dlp")]
    pub ytdlp: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Show metadata and the available formats
    Analyze {
        /// URL to analyze
        url: String,
    },

    /// Download a URL into the output directory
    Download {
        /// URL to download from
        url: String,

        /// Extract the audio track and convert it to mp3
        #[arg(short, long)]
        audio: bool,

        /// Format identifier as listed by `analyze`
        #[arg(short, long)]
        format: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_download_with_flags() {
        let args = Args::parse_from([
            "download-cli",
            "download",
            "https://example.com/v",
            "--audio",
            "-f",
            "251",
            "-o",
            "/tmp/media",
        ]);

        assert_eq!(args.output_dir, PathBuf::from("/tmp/media"));
        assert_eq!(
            args.command,
            Command::Download {
                url: "https://example.com/v".to_string(),
                audio: true,
                format: Some("251".to_string()),
            }
        );
    }

    #[test]
    fn analyze_uses_defaults() {
        let args = Args::parse_from(["download-cli", "analyze", "https://example.com/v"]);

        assert_eq!(args.output_dir, PathBuf::from("downloads"));
        assert_eq!(args.ytdlp, PathBuf::from("yt-dlp"));
        assert!(!args.verbose);
    }
}
