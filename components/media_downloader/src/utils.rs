// components/media_downloader/src/utils.rs
use std::path::{Path, PathBuf};

use crate::types::{DownloadError, DownloadType};

const VIDEO_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";
const AUDIO_SELECTOR: &str = "bestaudio/best";

/// Suffixes the extractor leaves behind for unfinished downloads
const PARTIAL_SUFFIXES: [&str; 2] = [".part", ".ytdl"];

/// Keep alphanumerics, spaces, dots, underscores and dashes
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .collect();
    kept.trim_end().to_string()
}

/// Format a duration in seconds as `H:MM:SS`
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    let clock = format!("{hours}:{minutes:02}:{secs:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

/// Pick the format selector handed to the extractor
pub fn format_selector(format_id: Option<&str>, download_type: DownloadType) -> String {
    match (format_id, download_type) {
        (Some(id), _) => id.to_string(),
        (None, DownloadType::Video) => VIDEO_SELECTOR.to_string(),
        (None, DownloadType::Audio) => AUDIO_SELECTOR.to_string(),
    }
}

/// Undo percent-encoding in a requested file name and make sure it stays
/// inside the download directory
pub fn decode_file_name(requested: &str) -> Result<String, DownloadError> {
    let decoded = urlencoding::decode(requested)
        .map_err(|e| DownloadError::InvalidFileName(e.to_string()))?
        .into_owned();

    if decoded.is_empty()
        || decoded == "."
        || decoded == ".."
        || decoded.contains(['/', '\\', '\0'])
    {
        return Err(DownloadError::InvalidFileName(decoded));
    }

    Ok(decoded)
}

/// Find the file a download produced for `id`
///
/// Post-processing may change the extension, so any entry starting with the
/// id qualifies. `<id>.<preferred_ext>` wins, then any `<id>.*`, then the rest
/// in name order.
pub async fn find_downloaded_file(
    dir: &Path,
    id: &str,
    preferred_ext: Option<&str>,
) -> Result<Option<PathBuf>, DownloadError> {
    let exact = preferred_ext.map(|ext| format!("{id}.{ext}"));
    let stem = format!("{id}.");

    let mut candidates = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(id) || PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let rank = if exact.as_deref() == Some(name.as_str()) {
            0
        } else if name.starts_with(&stem) {
            1
        } else {
            2
        };
        candidates.push((rank, name, entry.path()));
    }

    candidates.sort();
    Ok(candidates.into_iter().next().map(|(_, _, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("My Video! (2024).mp4"), "My Video 2024.mp4");
        assert_eq!(sanitize_title("a/b\\c:d*e?f"), "abcdef");
        assert_eq!(sanitize_title("trailing   "), "trailing");
        assert_eq!(sanitize_title("  leading kept"), "  leading kept");
        assert_eq!(sanitize_title("Ångström_über-1.0"), "Ångström_über-1.0");
    }

    #[rstest]
    #[case("My Video! (2024).mp4")]
    #[case("   spaced   out  !!")]
    #[case("émoji 🎵 track")]
    #[case("")]
    fn sanitize_title_is_idempotent(#[case] title: &str) {
        let once = sanitize_title(title);
        assert_eq!(sanitize_title(&once), once);
    }

    #[rstest]
    #[case(0.0, "0:00:00")]
    #[case(59.9, "0:00:59")]
    #[case(61.0, "0:01:01")]
    #[case(3661.0, "1:01:01")]
    #[case(86_399.0, "23:59:59")]
    #[case(86_400.0, "1 day, 0:00:00")]
    #[case(2.0 * 86_400.0 + 5.0, "2 days, 0:00:05")]
    #[case(-5.0, "0:00:00")]
    fn test_format_duration(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }

    #[test]
    fn explicit_format_id_is_used_verbatim() {
        assert_eq!(format_selector(Some("137+140"), DownloadType::Video), "137+140");
        assert_eq!(format_selector(Some("251"), DownloadType::Audio), "251");
    }

    #[test]
    fn default_selectors_depend_on_type() {
        assert_eq!(format_selector(None, DownloadType::Video), VIDEO_SELECTOR);
        assert_eq!(format_selector(None, DownloadType::Audio), AUDIO_SELECTOR);
    }

    #[test]
    fn decode_file_name_undoes_escapes() {
        assert_eq!(decode_file_name("My%20Video.mp4").unwrap(), "My Video.mp4");
        assert_eq!(decode_file_name("plain.mp3").unwrap(), "plain.mp3");
    }

    #[rstest]
    #[case("..")]
    #[case("%2E%2E")]
    #[case("..%2Fsecret")]
    #[case("dir%5Cfile")]
    #[case("")]
    fn decode_file_name_rejects_escaping_names(#[case] requested: &str) {
        assert_matches!(
            decode_file_name(requested),
            Err(DownloadError::InvalidFileName(_))
        );
    }

    #[tokio::test]
    async fn finds_file_with_changed_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc123.mp3"), b"audio").unwrap();
        std::fs::write(dir.path().join("other.mp4"), b"video").unwrap();

        let found = find_downloaded_file(dir.path(), "abc123", Some("webm"))
            .await
            .unwrap();
        assert_eq!(found, Some(dir.path().join("abc123.mp3")));
    }

    #[tokio::test]
    async fn prefers_expected_extension_and_skips_partials() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc123.f137.mp4.part"), b"").unwrap();
        std::fs::write(dir.path().join("abc123.m4a"), b"").unwrap();
        std::fs::write(dir.path().join("abc123.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("abc1234.mp4"), b"").unwrap();

        let found = find_downloaded_file(dir.path(), "abc123", Some("mp4"))
            .await
            .unwrap();
        assert_eq!(found, Some(dir.path().join("abc123.mp4")));
    }

    #[tokio::test]
    async fn missing_file_yields_none() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("zzz.mp4"), b"").unwrap();

        let found = find_downloaded_file(dir.path(), "abc123", None).await.unwrap();
        assert!(found.is_none());
    }
}
