// Group classifier and the two group runners (batch / adaptive)

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{error, info, warn};

use super::errors::DownloadError;
use super::extractors::CliMetadataFetcher;
use super::format_selector::FormatSelector;
use super::models::{Group, RunResult};
use super::orchestrator::{LadderOutcome, RetryLadder};
use super::traits::ToolRunner;
use crate::ytdlp::{DownloadTarget, YtDlp};

/// Routes URLs containing any of `patterns` to the group `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    pub name: String,
    pub patterns: Vec<String>,
}

impl GroupRule {
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| !p.is_empty() && url.contains(p.as_str()))
    }
}

/// Ordered rules, evaluated top to bottom; first match wins
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<GroupRule>,
    default_group: String,
    output_root: PathBuf,
}

impl Classifier {
    pub fn new(rules: Vec<GroupRule>, default_group: impl Into<String>, output_root: PathBuf) -> Self {
        Self {
            rules,
            default_group: default_group.into(),
            output_root,
        }
    }

    pub fn group_for(&self, url: &str) -> &str {
        self.rules
            .iter()
            .find(|r| r.matches(url))
            .map_or(self.default_group.as_str(), |r| r.name.as_str())
    }

    /// Partition `urls` into groups. Groups come out in rule order with the
    /// default group last; URL order is kept within each group and empty
    /// groups are dropped.
    pub fn classify(&self, urls: &[String]) -> Vec<Group> {
        let names = self
            .rules
            .iter()
            .map(|r| r.name.as_str())
            .chain(std::iter::once(self.default_group.as_str()));

        let mut groups: Vec<Group> = Vec::new();
        for name in names {
            if groups.iter().any(|g| g.name == name) {
                continue;
            }
            let members: Vec<String> = urls
                .iter()
                .filter(|u| self.group_for(u) == name)
                .cloned()
                .collect();
            if !members.is_empty() {
                groups.push(Group {
                    name: name.to_string(),
                    urls: members,
                    output_dir: self.output_root.join(name),
                });
            }
        }
        groups
    }
}

/// Runs one group and reports its aggregate outcome
#[async_trait]
pub trait GroupRunner: Send + Sync {
    /// Name of the runner (for logging)
    fn name(&self) -> &'static str;

    async fn run_group(&self, group: &Group) -> RunResult;
}

async fn ensure_output_dir(group: &Group) -> Result<(), RunResult> {
    fs::create_dir_all(&group.output_dir).await.map_err(|e| {
        error!(
            target: "groups",
            "[{}] cannot create {}: {}",
            group.name,
            group.output_dir.display(),
            e
        );
        RunResult::new(
            group.name.clone(),
            None,
            format!("cannot create {}: {}", group.output_dir.display(), e),
        )
    })
}

/// Scratch URL list; removed when the returned handle drops
fn write_scratch_list(urls: &[String]) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("tube-batch-")
        .suffix(".txt")
        .tempfile()?;
    for url in urls {
        writeln!(file, "{}", url)?;
    }
    file.flush()?;
    Ok(file)
}

/// One yt-dlp call for the whole group with a fixed selector
pub struct BatchRunner {
    ytdlp: YtDlp,
    runner: Arc<dyn ToolRunner>,
    format_spec: String,
}

impl BatchRunner {
    pub fn new(ytdlp: YtDlp, runner: Arc<dyn ToolRunner>, format_spec: impl Into<String>) -> Self {
        Self {
            ytdlp,
            runner,
            format_spec: format_spec.into(),
        }
    }
}

#[async_trait]
impl GroupRunner for BatchRunner {
    fn name(&self) -> &'static str {
        "batch"
    }

    async fn run_group(&self, group: &Group) -> RunResult {
        if let Err(failed) = ensure_output_dir(group).await {
            return failed;
        }

        let scratch = match write_scratch_list(&group.urls) {
            Ok(file) => file,
            Err(e) => {
                error!(target: "batch", "[{}] cannot write URL list: {}", group.name, e);
                return RunResult::new(group.name.clone(), None, format!("cannot write URL list: {}", e));
            }
        };

        let args = self.ytdlp.download_args(
            &self.format_spec,
            DownloadTarget::BatchFile(scratch.path()),
            &group.output_dir,
            false,
        );
        info!(
            target: "batch",
            "[{}] {} URL(s) -> {} (-f {})",
            group.name,
            group.urls.len(),
            group.output_dir.display(),
            self.format_spec
        );

        let result = match self.runner.run(self.ytdlp.program(), &args).await {
            Ok(out) => RunResult::new(group.name.clone(), out.exit_code, out.combined()),
            Err(e) => {
                if e.is_missing_tool() {
                    error!(target: "batch", "[{}] {}", group.name, e);
                } else {
                    error!(target: "batch", "[{}] invocation failed: {}", group.name, e);
                }
                RunResult::new(group.name.clone(), None, e.to_string())
            }
        };

        // Scratch list is removed here, whatever the outcome
        drop(scratch);
        result
    }
}

/// Metadata, format selection and the retry ladder for each URL in turn
pub struct AdaptiveRunner {
    fetcher: CliMetadataFetcher,
    ladder: RetryLadder,
    height_ceiling: u32,
    metadata_alternate_client: bool,
}

impl AdaptiveRunner {
    pub fn new(
        fetcher: CliMetadataFetcher,
        ladder: RetryLadder,
        height_ceiling: u32,
        metadata_alternate_client: bool,
    ) -> Self {
        Self {
            fetcher,
            ladder,
            height_ceiling,
            metadata_alternate_client,
        }
    }

    /// Download a single URL; `Err` carries a short reason for the group log
    pub async fn download_one(&self, url: &str, group: &Group) -> Result<usize, DownloadError> {
        let formats = self.fetcher.fetch(url, self.metadata_alternate_client).await;
        if formats.is_none() {
            warn!(target: "adaptive", "{} | no metadata, using conservative fallback", url);
        }
        let spec = FormatSelector::initial_spec(formats.as_deref(), self.height_ceiling);
        info!(target: "adaptive", "{} | selected -f {}", url, spec);

        match self.ladder.download(&spec, url, &group.output_dir).await {
            LadderOutcome::Succeeded { rung, .. } => Ok(rung),
            LadderOutcome::Exhausted { last_marker } => Err(last_marker.map_or_else(
                || DownloadError::ExecutionError("all attempts failed".to_string()),
                DownloadError::from,
            )),
        }
    }
}

#[async_trait]
impl GroupRunner for AdaptiveRunner {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    async fn run_group(&self, group: &Group) -> RunResult {
        if let Err(failed) = ensure_output_dir(group).await {
            return failed;
        }

        let mut log = Vec::with_capacity(group.urls.len());
        let mut failures = 0usize;

        for url in &group.urls {
            match self.download_one(url, group).await {
                Ok(rung) => log.push(format!("OK {} (attempt {})", url, rung)),
                Err(e) => {
                    failures += 1;
                    log.push(format!("FAILED {} ({})", url, e));
                }
            }
        }

        info!(
            target: "adaptive",
            "[{}] {}/{} URL(s) downloaded",
            group.name,
            group.urls.len() - failures,
            group.urls.len()
        );

        let exit_code = if failures == 0 { 0 } else { 1 };
        RunResult::new(group.name.clone(), Some(exit_code), log.join("\n"))
    }
}
