//! Run configuration: defaults, optional JSON file, env overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::downloader::format_selector::DEFAULT_HEIGHT_CEILING;
use crate::downloader::groups::GroupRule;
use crate::downloader::models::{AcceleratorOptions, DownloadOptions, RunMode};
use crate::downloader::tools::ToolPaths;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid json at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorConfig {
    pub enabled: bool,
    pub connections: u32,
    pub split: u32,
    pub min_split_size: String,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        let defaults = AcceleratorOptions::default();
        Self {
            enabled: true,
            connections: defaults.connections,
            split: defaults.split,
            min_split_size: defaults.min_split_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Text file with one URL per line
    pub queue_file: PathBuf,
    /// Parent of every group directory
    pub output_root: PathBuf,
    pub mode: RunMode,
    /// Height ceiling for format selection and the ladder's fallback rungs
    pub height_ceiling: u32,
    /// Fixed selector used by batch mode
    pub batch_format: String,
    pub output_template: String,
    pub merge_format: String,
    pub concurrent_fragments: u32,
    pub http_chunk_size: String,
    pub accelerator: AcceleratorConfig,
    pub cookies_browser: Option<String>,
    pub alternate_client: String,
    /// Pass the alternate client to the metadata query as well
    pub metadata_alternate_client: bool,
    /// Seconds before a metadata query is abandoned; downloads never time out
    pub metadata_timeout_secs: Option<u64>,
    pub proxy: Option<String>,
    pub tools: ToolPaths,
    /// Evaluated top to bottom, first match wins
    pub groups: Vec<GroupRule>,
    pub default_group: String,
}

fn default_output_root() -> PathBuf {
    dirs::video_dir()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for AppConfig {
    fn default() -> Self {
        let download = DownloadOptions::default();
        Self {
            queue_file: PathBuf::from("urls.txt"),
            output_root: default_output_root(),
            mode: RunMode::default(),
            height_ceiling: DEFAULT_HEIGHT_CEILING,
            batch_format: format!(
                "bv*[height<={h}]+ba/b[height<={h}]/18/worst",
                h = DEFAULT_HEIGHT_CEILING
            ),
            output_template: download.output_template,
            merge_format: download.merge_format,
            concurrent_fragments: download.concurrent_fragments,
            http_chunk_size: download.http_chunk_size,
            accelerator: AcceleratorConfig::default(),
            cookies_browser: download.cookies_browser,
            alternate_client: download.alternate_client,
            metadata_alternate_client: true,
            metadata_timeout_secs: None,
            proxy: None,
            tools: ToolPaths::default(),
            groups: vec![
                GroupRule::new("Knowledge", &["list=PLknowledge", "knowledge"]),
                GroupRule::new("Music", &["music.youtube.com", "list=RD"]),
                GroupRule::new("Shorts", &["/shorts/"]),
            ],
            default_group: "Videos".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults merged with `path` (when given), then env overrides.
    /// Not validated: callers apply their own overrides and then call `validate`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `TUBE_BATCH_YTDLP`, `TUBE_BATCH_ARIA2C`, `TUBE_BATCH_FFMPEG` point at tool binaries
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("TUBE_BATCH_YTDLP") {
            self.tools.ytdlp = Some(v);
        }
        if let Some(v) = non_empty("TUBE_BATCH_ARIA2C") {
            self.tools.aria2c = Some(v);
        }
        if let Some(v) = non_empty("TUBE_BATCH_FFMPEG") {
            self.tools.ffmpeg = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height_ceiling == 0 {
            return Err(ConfigError::Validation("height_ceiling must be positive".to_string()));
        }
        if self.default_group.trim().is_empty() {
            return Err(ConfigError::Validation("default_group must not be empty".to_string()));
        }
        if let Some(rule) = self.groups.iter().find(|r| r.name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "group rule with patterns {:?} has no name",
                rule.patterns
            )));
        }
        Ok(())
    }

    /// Download options once tool paths are known
    pub fn download_options(&self, aria2c: Option<&str>, ffmpeg: Option<&str>) -> DownloadOptions {
        let accelerator = match (self.accelerator.enabled, aria2c) {
            (true, Some(program)) => Some(AcceleratorOptions {
                program: program.to_string(),
                connections: self.accelerator.connections,
                split: self.accelerator.split,
                min_split_size: self.accelerator.min_split_size.clone(),
            }),
            _ => None,
        };

        DownloadOptions {
            output_template: self.output_template.clone(),
            merge_format: self.merge_format.clone(),
            accelerator,
            concurrent_fragments: self.concurrent_fragments,
            http_chunk_size: self.http_chunk_size.clone(),
            cookies_browser: self.cookies_browser.clone(),
            alternate_client: self.alternate_client.clone(),
            proxy: self.proxy.clone(),
            ffmpeg_location: ffmpeg.map(|s| s.to_string()),
        }
    }
}
