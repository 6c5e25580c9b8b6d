// Metadata fetcher - asks the yt-dlp binary for a video's format list
//
// Every failure (spawn error, non-zero exit, bad JSON, missing or empty
// `formats`) collapses into `None`; the caller then skips format selection
// and goes straight to the conservative fallback selector.

use std::sync::Arc;

use tracing::{debug, warn};

use super::diagnostics::summarize_failure;
use super::traits::{parse_formats, FormatDescriptor};
use crate::downloader::traits::ToolRunner;
use crate::ytdlp::YtDlp;

pub struct CliMetadataFetcher {
    ytdlp: YtDlp,
    runner: Arc<dyn ToolRunner>,
}

impl CliMetadataFetcher {
    pub fn new(ytdlp: YtDlp, runner: Arc<dyn ToolRunner>) -> Self {
        Self { ytdlp, runner }
    }

    pub async fn fetch(&self, url: &str, alternate_client: bool) -> Option<Vec<FormatDescriptor>> {
        let args = self.ytdlp.metadata_args(url, alternate_client);
        debug!(target: "metadata", "{} {}", self.ytdlp.program(), args.join(" "));

        let output = match self.runner.run(self.ytdlp.program(), &args).await {
            Ok(out) if out.success() => out,
            Ok(out) => {
                warn!(
                    target: "metadata",
                    "metadata query for {} exited with {:?}: {}",
                    url,
                    out.exit_code,
                    summarize_failure(&out.combined())
                );
                return None;
            }
            Err(e) => {
                warn!(target: "metadata", "metadata query for {} failed: {}", url, e);
                return None;
            }
        };

        let json: serde_json::Value = match serde_json::from_str(&output.stdout) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "metadata", "invalid JSON for {}: {}", url, e);
                return None;
            }
        };

        match parse_formats(&json) {
            Ok(formats) if !formats.is_empty() => {
                debug!(target: "metadata", "{} formats for {}", formats.len(), url);
                Some(formats)
            }
            Ok(_) => {
                warn!(target: "metadata", "empty format list for {}", url);
                None
            }
            Err(e) => {
                warn!(target: "metadata", "{} for {}", e, url);
                None
            }
        }
    }
}
