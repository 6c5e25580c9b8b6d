// Retry ladder - walks a fixed list of ever-safer attempts for one URL

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::extractors::{diagnose_failure, summarize_failure, FailureMarker};
use super::models::Attempt;
use super::traits::ToolRunner;
use crate::ytdlp::{DownloadTarget, YtDlp};

/// Number of rungs in every ladder
pub const LADDER_LEN: usize = 5;

/// The fixed ladder for `initial_spec`:
/// initial spec with the alternate client, initial spec without it,
/// `18/best[height<=C]`, `best[height<=C]`, `worst`.
pub fn build_ladder(initial_spec: &str, height_ceiling: u32) -> [Attempt; LADDER_LEN] {
    [
        Attempt {
            format_spec: initial_spec.to_string(),
            use_alternate_client: true,
            label: "selected format, alternate client",
        },
        Attempt {
            format_spec: initial_spec.to_string(),
            use_alternate_client: false,
            label: "selected format, default client",
        },
        Attempt {
            format_spec: format!("18/best[height<={}]", height_ceiling),
            use_alternate_client: false,
            label: "legacy 18 or best under ceiling",
        },
        Attempt {
            format_spec: format!("best[height<={}]", height_ceiling),
            use_alternate_client: false,
            label: "best under ceiling",
        },
        Attempt {
            format_spec: "worst".to_string(),
            use_alternate_client: false,
            label: "worst available",
        },
    ]
}

/// How the ladder ended for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LadderOutcome {
    /// `rung` is 1-based
    Succeeded { rung: usize, attempt: Attempt },
    Exhausted { last_marker: Option<FailureMarker> },
}

impl LadderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

pub struct RetryLadder {
    ytdlp: YtDlp,
    runner: Arc<dyn ToolRunner>,
    height_ceiling: u32,
}

impl RetryLadder {
    pub fn new(ytdlp: YtDlp, runner: Arc<dyn ToolRunner>, height_ceiling: u32) -> Self {
        Self {
            ytdlp,
            runner,
            height_ceiling,
        }
    }

    /// Download `url` into `output_dir`, stopping at the first rung that exits cleanly
    pub async fn download(&self, initial_spec: &str, url: &str, output_dir: &Path) -> LadderOutcome {
        let mut last_marker = None;

        for (idx, attempt) in build_ladder(initial_spec, self.height_ceiling)
            .into_iter()
            .enumerate()
        {
            let rung = idx + 1;
            info!(
                target: "ladder",
                "{} | attempt {}/{}: -f {} ({})",
                url, rung, LADDER_LEN, attempt.format_spec, attempt.label
            );

            let args = self.ytdlp.download_args(
                &attempt.format_spec,
                DownloadTarget::Url(url),
                output_dir,
                attempt.use_alternate_client,
            );

            let log = match self.runner.run(self.ytdlp.program(), &args).await {
                Ok(out) if out.success() => {
                    info!(target: "ladder", "{} | succeeded on attempt {}", url, rung);
                    return LadderOutcome::Succeeded { rung, attempt };
                }
                Ok(out) => out.combined(),
                Err(e) => e.to_string(),
            };

            last_marker = diagnose_failure(&log);
            warn!(
                target: "ladder",
                "{} | attempt {} failed ({}): {}",
                url,
                rung,
                last_marker.map_or("no output", |m| m.description()),
                summarize_failure(&log)
            );
        }

        warn!(target: "ladder", "{} | all {} attempts failed", url, LADDER_LEN);
        LadderOutcome::Exhausted { last_marker }
    }
}
