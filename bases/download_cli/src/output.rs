// bases/download_cli/src/output.rs
use media_downloader::{DownloadOutcome, FormatDescriptor, MediaInfo};

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_analyze_start(&self, url: &str) {
        println!("Analyzing: {}", url);
    }

    pub fn print_media_info(&self, info: &MediaInfo) {
        println!("{} [{}]", info.title, info.id);
        println!("Uploader: {}", info.uploader);
        println!("Duration: {}", info.duration);

        if self.verbose {
            println!("Uploaded: {}", info.upload_date);
            println!("Views: {}  Likes: {}", info.view_count, info.like_count);
            if !info.categories.is_empty() {
                println!("Categories: {}", info.categories.join(", "));
            }
            if !info.tags.is_empty() {
                println!("Tags: {}", info.tags.join(", "));
            }
        }

        println!();
        println!(
            "{:<12} {:<6} {:<12} {:>6} {:>10}  {}",
            "ID", "EXT", "RESOLUTION", "FPS", "SIZE", "CODECS"
        );
        for format in &info.formats {
            println!("{}", format_row(format));
        }
    }

    pub fn print_download_start(&self, url: &str) {
        println!("Starting download from: {}", url);
    }

    pub fn print_download_complete(&self, outcome: &DownloadOutcome) {
        println!("Downloaded: {} to {}", outcome.title, outcome.path.display());
        println!("Type: {}", outcome.download_type);

        if let Some(format_id) = &outcome.format_id {
            println!("Format: {}", format_id);
        }

        if self.verbose {
            println!("File name: {}", outcome.filename);
            println!("Finished at: {}", outcome.finished_at);
        }
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}

fn format_row(format: &FormatDescriptor) -> String {
    let fps = format
        .fps
        .map(|fps| format!("{fps:.0}"))
        .unwrap_or_default();

    format!(
        "{:<12} {:<6} {:<12} {:>6} {:>10}  {}/{}",
        format.format_id,
        format.ext,
        format.resolution,
        fps,
        human_size(format.filesize),
        format.vcodec,
        format.acodec
    )
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
