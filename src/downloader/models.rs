// Common data models for the batch downloader

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a group of URLs is handed to yt-dlp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// One yt-dlp call per group with a fixed format selector
    Batch,
    /// Metadata + format selection + retry ladder for every URL
    #[default]
    Adaptive,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// One rung of the retry ladder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// yt-dlp `-f` argument
    pub format_spec: String,
    /// Whether the alternate player client override is passed
    pub use_alternate_client: bool,
    /// Short label for logs
    pub label: &'static str,
}

/// URLs routed to one output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub urls: Vec<String>,
    pub output_dir: PathBuf,
}

/// Outcome of one group run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub group: String,
    /// Process exit code; `None` when the tool could not be started at all
    pub exit_code: Option<i32>,
    pub output_log: String,
}

impl RunResult {
    pub fn new(group: impl Into<String>, exit_code: Option<i32>, output_log: String) -> Self {
        Self {
            group: group.into(),
            exit_code,
            output_log,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Download accelerator (aria2c) settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceleratorOptions {
    /// Path or name of the aria2c binary
    pub program: String,
    /// `-x`: max connections per server
    pub connections: u32,
    /// `-s`: pieces downloaded in parallel
    pub split: u32,
    /// `-k`: minimum piece size (e.g. "1M")
    pub min_split_size: String,
}

impl Default for AcceleratorOptions {
    fn default() -> Self {
        Self {
            program: "aria2c".to_string(),
            connections: 16,
            split: 16,
            min_split_size: "1M".to_string(),
        }
    }
}

/// Options shared by every yt-dlp download invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Output template relative to the group directory
    pub output_template: String,
    /// Forced container for merged output
    pub merge_format: String,
    /// `None` lets yt-dlp use its native downloader
    pub accelerator: Option<AcceleratorOptions>,
    /// `-N`: fragments downloaded concurrently
    pub concurrent_fragments: u32,
    /// `--http-chunk-size`
    pub http_chunk_size: String,
    /// Browser to read cookies from (chrome, firefox, ...)
    pub cookies_browser: Option<String>,
    /// YouTube player client used by the alternate extractor mode
    pub alternate_client: String,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Directory or binary path of ffmpeg for merging
    pub ffmpeg_location: Option<String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_template: "%(title)s.%(ext)s".to_string(),
            merge_format: "mp4".to_string(),
            accelerator: Some(AcceleratorOptions::default()),
            concurrent_fragments: 4,
            http_chunk_size: "10M".to_string(),
            cookies_browser: Some("chrome".to_string()),
            alternate_client: "android".to_string(),
            proxy: None,
            ffmpeg_location: None,
        }
    }
}

/// Captured output of one external tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr, as one log blob
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_result_success_requires_zero() {
        assert!(RunResult::new("A", Some(0), String::new()).succeeded());
        assert!(!RunResult::new("A", Some(1), String::new()).succeeded());
        assert!(!RunResult::new("A", None, String::new()).succeeded());
    }

    #[test]
    fn test_combined_output() {
        let out = ToolOutput {
            exit_code: Some(1),
            stdout: "[download] 10%".to_string(),
            stderr: "ERROR: boom".to_string(),
        };
        assert_eq!(out.combined(), "[download] 10%\nERROR: boom");
        assert!(!out.success());
    }

    #[test]
    fn test_run_mode_deserializes_lowercase() {
        let mode: RunMode = serde_json::from_str("\"batch\"").unwrap();
        assert_eq!(mode, RunMode::Batch);
        assert_eq!(RunMode::default().to_string(), "adaptive");
    }
}
