// components/media_downloader/src/formats.rs
use std::cmp::{Ordering, Reverse};

use crate::types::{FormatDescriptor, MediaInfo, ProbedFormat, ProbedMedia};
use crate::utils::format_duration;

impl FormatDescriptor {
    /// Build a descriptor from a probed format, or `None` when its size is unknown
    pub fn from_probe(format: ProbedFormat) -> Option<Self> {
        let filesize = format
            .filesize
            .or(format.filesize_approx)
            .filter(|size| size.is_finite() && *size >= 0.0)?;

        Some(Self {
            format_id: format.format_id,
            ext: format.ext.unwrap_or_else(|| "unknown".to_string()),
            resolution: format.resolution.unwrap_or_else(|| "unknown".to_string()),
            fps: format.fps,
            filesize: filesize as u64,
            vcodec: format.vcodec.unwrap_or_else(|| "none".to_string()),
            acodec: format.acodec.unwrap_or_else(|| "none".to_string()),
            format_note: format.format_note.unwrap_or_default(),
        })
    }

    /// Whether this format carries a video stream
    pub fn is_video(&self) -> bool {
        !self.vcodec.is_empty() && self.vcodec != "none"
    }

    /// Vertical resolution from a `<number>p` label such as `720p` or `1080p60`
    pub fn resolution_rank(&self) -> u32 {
        match self.resolution.split_once('p') {
            Some((digits, _)) => digits.trim().parse().unwrap_or(0),
            None => 0,
        }
    }

    fn sort_key(&self) -> (u8, Reverse<u32>, u64) {
        let class = if self.is_video() { 0 } else { 1 };
        (class, Reverse(self.resolution_rank()), self.filesize)
    }
}

/// Compare two formats by presentation order
pub fn compare_formats(a: &FormatDescriptor, b: &FormatDescriptor) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// Drop formats of unknown size and order the rest for presentation
pub fn collect_formats(formats: Vec<ProbedFormat>) -> Vec<FormatDescriptor> {
    let mut descriptors: Vec<_> = formats
        .into_iter()
        .filter_map(FormatDescriptor::from_probe)
        .collect();
    descriptors.sort_by(compare_formats);
    descriptors
}

impl From<ProbedMedia> for MediaInfo {
    fn from(media: ProbedMedia) -> Self {
        Self {
            id: media.id,
            title: media.title,
            thumbnail: media.thumbnail.unwrap_or_default(),
            duration: format_duration(media.duration.unwrap_or(0.0)),
            uploader: media.uploader.unwrap_or_else(|| "Unknown".to_string()),
            upload_date: media.upload_date.unwrap_or_default(),
            view_count: media.view_count.unwrap_or(0),
            like_count: media.like_count.unwrap_or(0),
            categories: media.categories.unwrap_or_default(),
            tags: media.tags.unwrap_or_default(),
            description: media.description.unwrap_or_default(),
            formats: collect_formats(media.formats.unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn probed(id: &str, resolution: &str, vcodec: &str, size: Option<f64>) -> ProbedFormat {
        ProbedFormat {
            format_id: id.to_string(),
            ext: Some("mp4".to_string()),
            resolution: Some(resolution.to_string()),
            vcodec: Some(vcodec.to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            filesize: size,
            ..Default::default()
        }
    }

    #[test]
    fn formats_without_size_are_dropped() {
        let formats = collect_formats(vec![
            probed("a", "720p", "avc1", Some(100.0)),
            probed("b", "720p", "avc1", None),
        ]);

        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].format_id, "a");
    }

    #[test]
    fn approximate_size_is_used_when_exact_is_missing() {
        let format = ProbedFormat {
            format_id: "251".to_string(),
            filesize_approx: Some(4096.7),
            ..Default::default()
        };

        let descriptor = FormatDescriptor::from_probe(format).unwrap();
        assert_eq!(descriptor.filesize, 4096);
        assert_eq!(descriptor.ext, "unknown");
        assert_eq!(descriptor.resolution, "unknown");
        assert_eq!(descriptor.vcodec, "none");
        assert_eq!(descriptor.acodec, "none");
        assert_eq!(descriptor.format_note, "");
    }

    #[test]
    fn exact_size_wins_over_approximate() {
        let format = ProbedFormat {
            format_id: "18".to_string(),
            filesize: Some(10.0),
            filesize_approx: Some(99.0),
            ..Default::default()
        };

        assert_eq!(FormatDescriptor::from_probe(format).unwrap().filesize, 10);
    }

    #[rstest]
    #[case("1080p", 1080)]
    #[case("720p60", 720)]
    #[case("1920x1080", 0)]
    #[case("audio only", 0)]
    #[case("unknown", 0)]
    #[case("p", 0)]
    fn resolution_rank_parses_p_labels(#[case] label: &str, #[case] expected: u32) {
        let descriptor = FormatDescriptor::from_probe(probed("x", label, "avc1", Some(1.0))).unwrap();
        assert_eq!(descriptor.resolution_rank(), expected);
    }

    #[test]
    fn video_before_audio_then_resolution_then_size() {
        let formats = collect_formats(vec![
            probed("audio-small", "audio only", "none", Some(10.0)),
            probed("v480", "480p", "avc1", Some(300.0)),
            probed("v1080-big", "1080p", "vp9", Some(900.0)),
            probed("v1080-small", "1080p", "avc1", Some(800.0)),
            probed("audio-big", "audio only", "none", Some(20.0)),
        ]);

        let ids: Vec<_> = formats.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["v1080-small", "v1080-big", "v480", "audio-small", "audio-big"]
        );

        for pair in formats.windows(2) {
            assert_ne!(compare_formats(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn media_info_fills_defaults() {
        let media = ProbedMedia {
            id: "abc".to_string(),
            title: "Title".to_string(),
            duration: Some(3661.0),
            ..Default::default()
        };

        let info = MediaInfo::from(media);
        assert_eq!(info.duration, "1:01:01");
        assert_eq!(info.uploader, "Unknown");
        assert_eq!(info.thumbnail, "");
        assert_eq!(info.view_count, 0);
        assert!(info.categories.is_empty());
        assert!(info.formats.is_empty());
    }
}
