// bases/download_cli/src/app.rs
use std::sync::Arc;

use color_eyre::Result;
use media_downloader::{DownloadRequest, DownloadType, Extractor, MediaDownloader, YtDlp};
use crate::args::{Args, Command};
use crate::output::OutputHandler;

pub struct App {
    args: Args,
    output: OutputHandler,
}

impl App {
    pub fn new(args: Args) -> Self {
        let output = OutputHandler::new(args.verbose);
        Self { args, output }
    }

    pub async fn run(&self) -> Result<()> {
        let extractor = Arc::new(YtDlp::new(&self.args.ytdlp));
        self.run_with(extractor).await
    }

    async fn run_with(&self, extractor: Arc<dyn Extractor + Send + Sync>) -> Result<()> {
        let downloader =
            MediaDownloader::new_with_extractor(&self.args.output_dir, extractor).await?;

        match &self.args.command {
            Command::Analyze { url } => {
                self.output.print_analyze_start(url);

                let info = downloader.analyze(url).await?;

                self.output.print_media_info(&info);
            }
            Command::Download { url, audio, format } => {
                self.output.print_download_start(url);

                let request = DownloadRequest {
                    url: url.clone(),
                    format_id: format.clone(),
                    download_type: if *audio {
                        DownloadType::Audio
                    } else {
                        DownloadType::Video
                    },
                };
                let outcome = downloader.download(&request).await?;

                self.output.print_download_complete(&outcome);
            }
        }

        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}
