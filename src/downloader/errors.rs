// Error types for the downloader

use std::path::PathBuf;

use thiserror::Error;

use super::extractors::FailureMarker;

#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// yt-dlp, aria2c or ffmpeg not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Process could not be spawned or its pipes could not be read
    #[error("Failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Network timeout while waiting for the tool
    #[error("Network timeout: {0}")]
    NetworkTimeout(String),

    /// Remote side refused the request (403, 429, bot check)
    #[error("Request blocked: {0}")]
    Blocked(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl DownloadError {
    /// True when the executable itself is missing, as opposed to a failing run.
    pub fn is_missing_tool(&self) -> bool {
        matches!(self, Self::ToolNotFound(_))
    }
}

// Final verdict for a URL whose retry ladder ran out
impl From<FailureMarker> for DownloadError {
    fn from(marker: FailureMarker) -> Self {
        match marker {
            FailureMarker::Blocked => Self::Blocked("HTTP 403/429 or bot check".to_string()),
            FailureMarker::NetworkTimeout => {
                Self::NetworkTimeout("no response from server".to_string())
            }
            other => Self::ExecutionError(other.description().to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue file not found: {0}")]
    Missing(PathBuf),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_conversion() {
        assert!(matches!(
            DownloadError::from(FailureMarker::NetworkTimeout),
            DownloadError::NetworkTimeout(_)
        ));
        assert!(matches!(
            DownloadError::from(FailureMarker::Blocked),
            DownloadError::Blocked(_)
        ));

        let err = DownloadError::from(FailureMarker::FormatUnavailable);
        assert_eq!(err.to_string(), "Execution error: requested format not available");
        assert!(!err.is_missing_tool());
    }
}
