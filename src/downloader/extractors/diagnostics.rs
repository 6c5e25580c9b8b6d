// Failure diagnostics - classifies yt-dlp output after a non-zero exit
//
// The retry ladder advances regardless of the marker; the last one becomes
// the URL's error once every rung has failed.

/// Known reasons a download attempt fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMarker {
    /// "Requested format is not available"
    FormatUnavailable,

    /// Selected stream type does not exist for this media (image posts, audio-only pages)
    MediaTypeMismatch,

    /// A player client was skipped by the extractor
    ClientSkipped,

    /// HTTP 403 / 429 / bot check
    Blocked,

    /// Network timeout
    NetworkTimeout,

    /// Video deleted, private or otherwise gone
    VideoUnavailable,

    /// Generic failure
    Unknown,
}

impl FailureMarker {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::FormatUnavailable => "requested format not available",
            Self::MediaTypeMismatch => "media type mismatch",
            Self::ClientSkipped => "extractor client skipped",
            Self::Blocked => "request blocked",
            Self::NetworkTimeout => "network timeout",
            Self::VideoUnavailable => "video unavailable",
            Self::Unknown => "unknown failure",
        }
    }
}

/// Analyze tool output and return the most specific failure marker.
/// Returns `None` for empty output.
pub fn diagnose_failure(output: &str) -> Option<FailureMarker> {
    let lower = output.to_lowercase();

    // Check patterns in order of specificity

    if lower.contains("requested format is not available")
        || lower.contains("requested format not available")
    {
        return Some(FailureMarker::FormatUnavailable);
    }

    if lower.contains("only images are available")
        || lower.contains("no video formats found")
        || lower.contains("no audio formats found")
    {
        return Some(FailureMarker::MediaTypeMismatch);
    }

    if lower.contains("skipping client") || lower.contains("skipping player responses") {
        return Some(FailureMarker::ClientSkipped);
    }

    if lower.contains("video unavailable")
        || lower.contains("private video")
        || lower.contains("video has been removed")
        || lower.contains("this video is no longer available")
    {
        return Some(FailureMarker::VideoUnavailable);
    }

    if lower.contains("403")
        || lower.contains("forbidden")
        || lower.contains("429")
        || lower.contains("too many requests")
        || lower.contains("not a bot")
    {
        return Some(FailureMarker::Blocked);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return Some(FailureMarker::NetworkTimeout);
    }

    if !output.trim().is_empty() {
        return Some(FailureMarker::Unknown);
    }

    None
}

/// First line worth showing in a log: an `ERROR:` line, else the last non-empty line
pub fn summarize_failure(output: &str) -> String {
    output
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| output.lines().map(str::trim).rev().find(|l| !l.is_empty()))
        .map(|l| l.chars().take(200).collect())
        .unwrap_or_else(|| "no output".to_string())
}
