// components/media_downloader/src/ytdlp.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::types::{DownloadError, ProbedMedia};

/// Target codec for audio extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Mp3,
}

impl AudioCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCodec::Mp3 => "mp3",
        }
    }

    /// Extension of the files the transcoder produces
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

/// How a download should be carried out
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOptions {
    /// Format selector, e.g. `bestaudio/best` or a concrete format id
    pub format: String,

    /// Output path template, e.g. `/srv/downloads/%(id)s.%(ext)s`
    pub output_template: PathBuf,

    /// Transcode the result to this audio codec after downloading
    pub extract_audio: Option<AudioCodec>,
}

#[async_trait]
pub trait Extractor {
    /// Check if the extractor and its dependencies are installed
    async fn check_available(&self) -> Result<(), DownloadError>;

    /// Fetch metadata and the list of formats without downloading
    async fn probe(&self, url: &str) -> Result<ProbedMedia, DownloadError>;

    /// Download (and post-process) the media
    ///
    /// Returns the final file path when the extractor reports it.
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<Option<PathBuf>, DownloadError>;
}

/// Extractor backed by the `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Output, DownloadError> {
        debug!(binary = %self.binary.display(), ?args, "running extractor");

        let output = Command::new(&self.binary).args(&args).output().await?;

        if !output.status.success() {
            let message = failure_message(&output);
            warn!(status = %output.status, "extractor failed: {}", message);
            return Err(DownloadError::Extraction(message));
        }

        Ok(output)
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(&self.binary)
            .map(|_| ())
            .map_err(|_| DownloadError::DependencyNotFound(self.binary.display().to_string()))
    }

    async fn probe(&self, url: &str) -> Result<ProbedMedia, DownloadError> {
        let output = self.run(probe_args(url)).await?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<Option<PathBuf>, DownloadError> {
        let output = self.run(download_args(url, options)).await?;
        Ok(reported_path(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn common_args() -> Vec<OsString> {
    ["--quiet", "--no-warnings", "--no-playlist"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

/// Arguments for a metadata-only run
pub(crate) fn probe_args(url: &str) -> Vec<OsString> {
    let mut args = common_args();
    args.push("--dump-single-json".into());
    args.push("--no-download".into());
    args.push("--".into());
    args.push(url.into());
    args
}

/// Arguments for a download run
///
/// `--print after_move:filepath` makes the extractor print the final path
/// once post-processing has moved the file into place.
pub(crate) fn download_args(url: &str, options: &DownloadOptions) -> Vec<OsString> {
    let mut args = common_args();
    args.push("--format".into());
    args.push(options.format.clone().into());
    args.push("--output".into());
    args.push(options.output_template.clone().into_os_string());

    if let Some(codec) = options.extract_audio {
        args.push("--extract-audio".into());
        args.push("--audio-format".into());
        args.push(codec.as_str().into());
    }

    args.push("--print".into());
    args.push("after_move:filepath".into());
    args.push("--".into());
    args.push(url.into());
    args
}

/// Last non-empty line of the extractor's stdout, if any
fn reported_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("yt-dlp exited with status: {}", output.status)
    } else {
        stderr.to_string()
    }
}

#[cfg(any(test, feature = "stub"))]
pub mod stub {
    //! In-process stand-in for the extractor

    use super::*;
    use crate::types::ProbedFormat;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct ExtractorStub {
        media: ProbedMedia,
        content: Vec<u8>,
        failure: Option<String>,
        report_path: bool,
        skip_output: bool,
        urls: Mutex<Vec<String>>,
        downloads: Mutex<Vec<DownloadOptions>>,
    }

    impl ExtractorStub {
        /// A stub describing one short clip with a handful of formats
        pub fn new() -> Self {
            Self {
                media: sample_media(),
                content: b"stub media bytes".to_vec(),
                failure: None,
                report_path: true,
                skip_output: false,
                urls: Mutex::new(Vec::new()),
                downloads: Mutex::new(Vec::new()),
            }
        }

        pub fn with_media(mut self, media: ProbedMedia) -> Self {
            self.media = media;
            self
        }

        pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
            self.content = content.into();
            self
        }

        /// Make every call fail the way the real extractor reports errors
        pub fn failing(mut self, message: impl Into<String>) -> Self {
            self.failure = Some(message.into());
            self
        }

        /// Stay silent about the final path, forcing a directory scan
        pub fn without_reported_path(mut self) -> Self {
            self.report_path = false;
            self
        }

        /// Succeed without writing anything, like a post-processor that lost the file
        pub fn without_output(mut self) -> Self {
            self.skip_output = true;
            self.report_path = false;
            self
        }

        /// Options of every download requested so far
        pub fn downloads(&self) -> Vec<DownloadOptions> {
            self.downloads
                .lock()
                .map(|d| d.clone())
                .unwrap_or_default()
        }

        /// URLs handed to `probe` and `download`, in call order
        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().map(|u| u.clone()).unwrap_or_default()
        }

        fn record(&self, url: &str) {
            if let Ok(mut urls) = self.urls.lock() {
                urls.push(url.to_string());
            }
        }

        fn check_failure(&self) -> Result<(), DownloadError> {
            match &self.failure {
                Some(message) => Err(DownloadError::Extraction(message.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl Extractor for ExtractorStub {
        async fn check_available(&self) -> Result<(), DownloadError> {
            Ok(())
        }

        async fn probe(&self, url: &str) -> Result<ProbedMedia, DownloadError> {
            self.record(url);
            self.check_failure()?;
            Ok(self.media.clone())
        }

        async fn download(
            &self,
            url: &str,
            options: &DownloadOptions,
        ) -> Result<Option<PathBuf>, DownloadError> {
            self.record(url);
            self.check_failure()?;
            if let Ok(mut downloads) = self.downloads.lock() {
                downloads.push(options.clone());
            }

            let ext = match options.extract_audio {
                Some(codec) => codec.extension().to_string(),
                None => self.media.ext.clone().unwrap_or_else(|| "mp4".to_string()),
            };
            let path = options
                .output_template
                .to_string_lossy()
                .replace("%(id)s", &self.media.id)
                .replace("%(ext)s", &ext);
            let path = PathBuf::from(path);

            if self.skip_output {
                return Ok(None);
            }
            tokio::fs::write(&path, &self.content).await?;

            Ok(self.report_path.then_some(path))
        }
    }

    pub fn sample_media() -> ProbedMedia {
        let format = |id: &str, ext: &str, resolution: &str, vcodec: &str, size: Option<f64>| {
            ProbedFormat {
                format_id: id.to_string(),
                ext: Some(ext.to_string()),
                resolution: Some(resolution.to_string()),
                fps: (vcodec != "none").then_some(30.0),
                filesize: size,
                filesize_approx: None,
                vcodec: Some(vcodec.to_string()),
                acodec: Some("mp4a.40.2".to_string()),
                format_note: Some(resolution.to_string()),
            }
        };

        ProbedMedia {
            id: "dQw4w9WgXcQ".to_string(),
            title: "Test Clip! (Official)".to_string(),
            ext: Some("mp4".to_string()),
            thumbnail: Some("https://example.com/thumb.jpg".to_string()),
            duration: Some(212.0),
            uploader: Some("Test Uploader".to_string()),
            upload_date: Some("20091025".to_string()),
            view_count: Some(1_000),
            like_count: Some(10),
            categories: Some(vec!["Music".to_string()]),
            tags: Some(vec!["test".to_string()]),
            description: Some("A test clip".to_string()),
            formats: Some(vec![
                format("140", "m4a", "audio only", "none", Some(3_400_000.0)),
                format("18", "mp4", "360p", "avc1.42001E", Some(9_000_000.0)),
                format("22", "mp4", "720p", "avc1.64001F", Some(20_000_000.0)),
                format("sb0", "mhtml", "storyboard", "none", None),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/watch?v=abc";

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn probe_runs_metadata_only() {
        let args = strings(&probe_args(URL));
        assert!(args.contains(&"--dump-single-json".to_string()));
        assert!(args.contains(&"--no-download".to_string()));
        assert!(args.contains(&"--quiet".to_string()));
        assert!(args.contains(&"--no-warnings".to_string()));
        assert_eq!(
            args[args.len() - 2..].to_vec(),
            vec!["--".to_string(), "https://example.com/watch?v=abc".to_string()]
        );
    }

    #[test]
    fn video_download_has_no_audio_extraction() {
        let options = DownloadOptions {
            format: "best".to_string(),
            output_template: PathBuf::from("/downloads/%(id)s.%(ext)s"),
            extract_audio: None,
        };

        let args = strings(&download_args(URL, &options));
        assert!(!args.contains(&"--extract-audio".to_string()));

        let pos = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(args[pos + 1], "best");
        let pos = args.iter().position(|a| a == "--output").unwrap();
        assert_eq!(args[pos + 1], "/downloads/%(id)s.%(ext)s");
        assert_eq!(args.last().unwrap(), "https://example.com/watch?v=abc");
    }

    #[test]
    fn audio_download_transcodes_to_mp3() {
        let options = DownloadOptions {
            format: "bestaudio/best".to_string(),
            output_template: PathBuf::from("/downloads/%(id)s.%(ext)s"),
            extract_audio: Some(AudioCodec::Mp3),
        };

        let args = strings(&download_args(URL, &options));
        let pos = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[pos + 1], "mp3");
        assert!(args.contains(&"--extract-audio".to_string()));
        assert!(args.contains(&"after_move:filepath".to_string()));
    }

    #[test]
    fn scheme_less_url_is_passed_verbatim() {
        let args = strings(&probe_args("youtu.be/dQw4w9WgXcQ"));
        assert_eq!(args.last().unwrap(), "youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn reported_path_takes_last_line() {
        assert_eq!(
            reported_path("\n/downloads/abc.webm\n/downloads/abc.mp3\n\n"),
            Some(PathBuf::from("/downloads/abc.mp3"))
        );
        assert_eq!(reported_path("   \n"), None);
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let ytdlp = YtDlp::new("/nonexistent/definitely-not-yt-dlp");
        let result = ytdlp.check_available().await;
        assert!(matches!(result, Err(DownloadError::DependencyNotFound(_))));
    }
}
