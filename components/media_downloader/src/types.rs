// components/media_downloader/src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Unreadable extractor output: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("{0}")]
    FileNotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Unknown download type: {0}")]
    InvalidDownloadType(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// What the user wants out of a download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    #[default]
    Video,
    Audio,
}

impl DownloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadType::Video => "video",
            DownloadType::Audio => "audio",
        }
    }
}

impl fmt::Display for DownloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadType {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(DownloadType::Video),
            "audio" => Ok(DownloadType::Audio),
            other => Err(DownloadError::InvalidDownloadType(other.to_string())),
        }
    }
}

/// One concrete encoding option offered for a piece of media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub ext: String,
    pub resolution: String,
    pub fps: Option<f64>,
    /// Exact size in bytes when the extractor knows it, approximate otherwise
    pub filesize: u64,
    pub vcodec: String,
    pub acodec: String,
    pub format_note: String,
}

/// Metadata shown to the user after analyzing a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    /// Formatted as `H:MM:SS`
    pub duration: String,
    pub uploader: String,
    pub upload_date: String,
    pub view_count: u64,
    pub like_count: u64,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    /// Video formats first, then by descending resolution and ascending size
    pub formats: Vec<FormatDescriptor>,
}

/// Raw metadata as reported by the extractor in metadata-only mode
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbedMedia {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub formats: Option<Vec<ProbedFormat>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbedFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub format_note: Option<String>,
}

/// A download the user asked for
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: Option<String>,
    pub download_type: DownloadType,
}

/// A finished download sitting in the download directory
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// File name relative to the download directory
    pub filename: String,

    /// Sanitized media title
    pub title: String,

    pub download_type: DownloadType,

    /// The format identifier the user picked, if any
    pub format_id: Option<String>,

    /// Absolute location on disk
    pub path: PathBuf,

    /// When the download finished
    pub finished_at: DateTime<Utc>,
}

/// A file in the download directory that was asked for by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Decoded name, also used as the suggested save name
    pub name: String,
    pub path: PathBuf,
}
