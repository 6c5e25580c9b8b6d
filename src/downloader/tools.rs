// External tool discovery: yt-dlp (extractor), aria2c (accelerator), ffmpeg (muxer)

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::errors::DownloadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Aria2c,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Aria2c => "aria2c",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::Ffmpeg => "-version",
            _ => "--version",
        }
    }
}

/// Explicit binary locations; `None` means search the system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ytdlp: Option<String>,
    pub aria2c: Option<String>,
    pub ffmpeg: Option<String>,
}

impl ToolPaths {
    fn get(&self, tool: ToolType) -> Option<&str> {
        match tool {
            ToolType::YtDlp => self.ytdlp.as_deref(),
            ToolType::Aria2c => self.aria2c.as_deref(),
            ToolType::Ffmpeg => self.ffmpeg.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
}

impl ToolInfo {
    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

/// Resolved binaries for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolset {
    pub ytdlp: String,
    /// `None` when the accelerator is disabled
    pub aria2c: Option<String>,
    pub ffmpeg: String,
}

pub struct ToolManager {
    overrides: ToolPaths,
}

impl ToolManager {
    pub fn new(overrides: ToolPaths) -> Self {
        Self { overrides }
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let path = self.detect_tool(tool_type);
        let version = path.as_deref().and_then(|p| Self::get_version(p, tool_type));
        ToolInfo {
            tool_type,
            version,
            path,
        }
    }

    /// Locate every tool the run needs; a missing one is a setup failure
    pub fn ensure_required(&self, use_accelerator: bool) -> Result<Toolset, DownloadError> {
        let mut required = vec![ToolType::YtDlp, ToolType::Ffmpeg];
        if use_accelerator {
            required.push(ToolType::Aria2c);
        }

        let mut found = Vec::with_capacity(required.len());
        for tool in required {
            let info = self.get_tool_info(tool);
            if !info.is_available() {
                return Err(DownloadError::ToolNotFound(tool.as_str().to_string()));
            }
            info!(
                target: "tools",
                "{} found at {} ({})",
                tool.as_str(),
                info.path.as_deref().unwrap_or_default(),
                info.version.as_deref().unwrap_or("unknown version")
            );
            found.push(info);
        }

        let path_of = |tool: ToolType| {
            found
                .iter()
                .find(|i| i.tool_type == tool)
                .and_then(|i| i.path.clone())
        };

        Ok(Toolset {
            ytdlp: path_of(ToolType::YtDlp)
                .ok_or_else(|| DownloadError::ToolNotFound("yt-dlp".to_string()))?,
            aria2c: path_of(ToolType::Aria2c),
            ffmpeg: path_of(ToolType::Ffmpeg)
                .ok_or_else(|| DownloadError::ToolNotFound("ffmpeg".to_string()))?,
        })
    }

    fn detect_tool(&self, tool_type: ToolType) -> Option<String> {
        // 1. Explicit override
        if let Some(path) = self.overrides.get(tool_type) {
            return Self::resolve(path);
        }

        let binary_name = tool_type.as_str();

        // 2. Common install locations
        let common_dirs = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];
        for dir in common_dirs {
            let candidate = Path::new(dir).join(binary_name);
            if candidate.is_file() {
                return Some(candidate.to_string_lossy().to_string());
            }
        }

        // 3. PATH
        which::which(binary_name)
            .ok()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// An override may be a path or a bare command name
    fn resolve(path: &str) -> Option<String> {
        let candidate = PathBuf::from(path);
        if candidate.is_file() {
            return Some(path.to_string());
        }
        which::which(path)
            .ok()
            .map(|p| p.to_string_lossy().to_string())
    }

    fn get_version(path: &str, tool_type: ToolType) -> Option<String> {
        match Command::new(path).arg(tool_type.version_arg()).output() {
            Ok(output) if output.status.success() => {
                let out = String::from_utf8_lossy(&output.stdout);
                // ffmpeg prints a banner; keep the first line only
                let first = out.lines().next().unwrap_or("").trim().to_string();
                debug!(target: "tools", "{} version: {}", tool_type.as_str(), first);
                Some(first)
            }
            _ => None,
        }
    }
}
