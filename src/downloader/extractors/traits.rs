// Format descriptors parsed from yt-dlp JSON

use serde::{Deserialize, Serialize};

use crate::downloader::errors::DownloadError;

/// One downloadable stream variant of a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Format ID (e.g., "18", "137", "140")
    pub format_id: String,
    /// Video codec (avc1, vp9, av01) or "none"
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus) or "none"
    pub acodec: Option<String>,
    /// Video height in pixels
    pub height: Option<u32>,
    /// File size in bytes
    pub filesize: Option<u64>,
    /// Approximate file size (when exact is unknown)
    pub filesize_approx: Option<u64>,
    /// Total bitrate in kbps
    pub tbr: Option<f64>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
}

/// Only the literal "none" marks a missing stream. An absent or null codec
/// means the extractor did not report it, as with generic HLS formats.
fn codec_present(codec: &Option<String>) -> bool {
    codec.as_deref() != Some("none")
}

impl FormatDescriptor {
    pub fn has_video(&self) -> bool {
        codec_present(&self.vcodec)
    }

    pub fn has_audio(&self) -> bool {
        codec_present(&self.acodec)
    }

    /// Video and audio muxed into one stream
    pub fn is_combined(&self) -> bool {
        self.has_video() && self.has_audio()
    }

    pub fn is_video_only(&self) -> bool {
        self.has_video() && !self.has_audio()
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }

    /// Exact size, or yt-dlp's estimate when the exact one is unknown
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// Known height no greater than `ceiling`
    pub fn fits_under(&self, ceiling: u32) -> bool {
        self.height.map_or(false, |h| h <= ceiling)
    }
}

fn as_u64(v: &serde_json::Value) -> Option<u64> {
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

/// Parse the `formats` array of a `yt-dlp -J` document.
///
/// A missing or non-array `formats` key is a parse error; an empty array
/// parses to an empty list.
pub fn parse_formats(json: &serde_json::Value) -> Result<Vec<FormatDescriptor>, DownloadError> {
    let formats_array = json["formats"]
        .as_array()
        .ok_or_else(|| DownloadError::ParseError("No formats array in JSON".to_string()))?;

    let formats = formats_array
        .iter()
        .map(|f| FormatDescriptor {
            format_id: f["format_id"].as_str().unwrap_or("").to_string(),
            vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
            acodec: f["acodec"].as_str().map(|s| s.to_string()),
            height: as_u64(&f["height"]).and_then(|h| u32::try_from(h).ok()),
            filesize: as_u64(&f["filesize"]),
            filesize_approx: as_u64(&f["filesize_approx"]),
            tbr: f["tbr"].as_f64(),
            abr: f["abr"].as_f64(),
        })
        .filter(|f| !f.format_id.is_empty())
        .collect();

    Ok(formats)
}
