// components/media_downloader/src/lib.rs
mod formats;
mod types;
mod utils;
mod ytdlp;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub use formats::{collect_formats, compare_formats};
pub use types::{
    DownloadError, DownloadOutcome, DownloadRequest, DownloadType, FormatDescriptor, MediaInfo,
    ProbedFormat, ProbedMedia, StoredFile,
};
pub use utils::{decode_file_name, format_duration, format_selector, sanitize_title};
pub use ytdlp::{AudioCodec, DownloadOptions, Extractor, YtDlp};

#[cfg(any(test, feature = "stub"))]
pub use ytdlp::stub;

const OUTPUT_TEMPLATE: &str = "%(id)s.%(ext)s";

pub struct MediaDownloader {
    download_path: PathBuf,
    extractor: Arc<dyn Extractor + Send + Sync>,
}

impl MediaDownloader {
    /// Create a new MediaDownloader that stores files in the given directory,
    /// using `yt-dlp` from `PATH`
    pub async fn new(download_path: impl AsRef<Path>) -> Result<Self, DownloadError> {
        Self::new_with_extractor(download_path, Arc::new(YtDlp::default())).await
    }

    /// Create a new MediaDownloader with a specific extractor implementation
    pub async fn new_with_extractor(
        download_path: impl AsRef<Path>,
        extractor: Arc<dyn Extractor + Send + Sync>,
    ) -> Result<Self, DownloadError> {
        extractor.check_available().await?;

        tokio::fs::create_dir_all(download_path.as_ref()).await?;
        let download_path = tokio::fs::canonicalize(download_path.as_ref()).await?;

        Ok(Self {
            download_path,
            extractor,
        })
    }

    /// Absolute path of the download directory
    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    /// Look up metadata and the available formats without downloading
    pub async fn analyze(&self, url: &str) -> Result<MediaInfo, DownloadError> {
        let url = extractor_url(url)?;
        let probed = self.extractor.probe(url).await?;
        Ok(MediaInfo::from(probed))
    }

    /// Download a URL into the download directory
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome, DownloadError> {
        let url = extractor_url(&request.url)?;

        // The probe tells us the id the output template will expand to
        let probed = self.extractor.probe(url).await?;

        let extract_audio = match request.download_type {
            DownloadType::Audio => Some(AudioCodec::Mp3),
            DownloadType::Video => None,
        };
        let options = DownloadOptions {
            format: format_selector(request.format_id.as_deref(), request.download_type),
            output_template: self.download_path.join(OUTPUT_TEMPLATE),
            extract_audio,
        };

        let reported = self.extractor.download(url, &options).await?;

        let expected_ext = match extract_audio {
            Some(codec) => Some(codec.extension()),
            None => probed.ext.as_deref(),
        };
        let path = match self.accept_reported(reported).await {
            Some(path) => path,
            None => {
                debug!(id = %probed.id, "no usable reported path, scanning download directory");
                utils::find_downloaded_file(&self.download_path, &probed.id, expected_ext)
                    .await?
                    .ok_or_else(|| DownloadError::FileNotFound("Downloaded file not found".to_string()))?
            }
        };

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DownloadError::FileNotFound("Downloaded file not found".to_string()))?;

        info!(%filename, download_type = %request.download_type, "download finished");

        Ok(DownloadOutcome {
            filename,
            title: sanitize_title(&probed.title),
            download_type: request.download_type,
            format_id: request.format_id.clone(),
            path,
            finished_at: chrono::Utc::now(),
        })
    }

    /// Map a requested (percent-encoded) file name onto the download directory
    pub fn resolve_file(&self, requested: &str) -> Result<StoredFile, DownloadError> {
        let name = decode_file_name(requested)?;
        let path = self.download_path.join(&name);
        Ok(StoredFile { name, path })
    }

    /// Use the extractor's reported path if it names a file in the download directory
    async fn accept_reported(&self, reported: Option<PathBuf>) -> Option<PathBuf> {
        let path = reported?;
        let path = tokio::fs::canonicalize(&path).await.ok()?;
        if path.parent() != Some(self.download_path.as_path()) {
            return None;
        }
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        metadata.is_file().then_some(path)
    }
}

/// The extractor decides what a URL means (`youtu.be/…` without a scheme is
/// fine); only a blank one is refused here
fn extractor_url(url: &str) -> Result<&str, DownloadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DownloadError::InvalidUrl("no URL given".to_string()));
    }
    Ok(url)
}
