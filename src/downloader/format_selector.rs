// FormatSelector - picks the yt-dlp `-f` argument from a format list
//
// Tiers, first match wins:
// 1. Combined audio+video stream at or under the height ceiling
//    (highest height, then smallest file)
// 2. Best video-only + best audio-only pair (`video+audio`)
// 3. Legacy progressive format "18"
// 4. "worst"

use std::cmp::Ordering;
use std::fmt;

use super::extractors::FormatDescriptor;

/// Height ceiling used when none is configured
pub const DEFAULT_HEIGHT_CEILING: u32 = 360;

/// Selector used when no metadata could be fetched at all
pub const NO_METADATA_SPEC: &str = "18/worst";

/// Well-known, universally compatible progressive format
pub const LEGACY_FORMAT_ID: &str = "18";

/// Result of format selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single stream carrying both video and audio
    Combined(String),
    /// Video-only and audio-only streams merged by yt-dlp
    Split { video: String, audio: String },
    /// Format "18"
    Legacy,
    /// yt-dlp's own lowest-quality choice
    Worst,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combined(id) => write!(f, "{}", id),
            Self::Split { video, audio } => write!(f, "{}+{}", video, audio),
            Self::Legacy => write!(f, "{}", LEGACY_FORMAT_ID),
            Self::Worst => write!(f, "worst"),
        }
    }
}

pub struct FormatSelector;

impl FormatSelector {
    /// Pick a selector for `formats` under `height_ceiling`. Never fails.
    pub fn select(formats: &[FormatDescriptor], height_ceiling: u32) -> Selector {
        if let Some(best) = Self::best_combined(formats, height_ceiling) {
            return Selector::Combined(best.format_id.clone());
        }

        if let (Some(video), Some(audio)) = (
            Self::best_video_only(formats, height_ceiling),
            Self::best_audio_only(formats),
        ) {
            return Selector::Split {
                video: video.format_id.clone(),
                audio: audio.format_id.clone(),
            };
        }

        if formats.iter().any(|f| f.format_id == LEGACY_FORMAT_ID) {
            return Selector::Legacy;
        }

        Selector::Worst
    }

    /// Initial `-f` argument for the retry ladder; `None` means metadata was unavailable
    pub fn initial_spec(formats: Option<&[FormatDescriptor]>, height_ceiling: u32) -> String {
        match formats {
            Some(formats) => Self::select(formats, height_ceiling).to_string(),
            None => NO_METADATA_SPEC.to_string(),
        }
    }

    fn best_combined(formats: &[FormatDescriptor], ceiling: u32) -> Option<&FormatDescriptor> {
        let mut candidates: Vec<&FormatDescriptor> = formats
            .iter()
            .filter(|f| f.is_combined() && f.fits_under(ceiling))
            .collect();

        // Unknown sizes sort after every known size
        let size = |f: &FormatDescriptor| f.effective_size().unwrap_or(u64::MAX);
        candidates.sort_by(|a, b| b.height.cmp(&a.height).then_with(|| size(*a).cmp(&size(*b))));
        candidates.first().copied()
    }

    fn best_video_only(formats: &[FormatDescriptor], ceiling: u32) -> Option<&FormatDescriptor> {
        let mut candidates: Vec<&FormatDescriptor> = formats
            .iter()
            .filter(|f| f.is_video_only() && f.fits_under(ceiling))
            .collect();

        candidates.sort_by(|a, b| {
            b.height
                .cmp(&a.height)
                .then_with(|| desc_rate(a.tbr, b.tbr))
        });
        candidates.first().copied()
    }

    fn best_audio_only(formats: &[FormatDescriptor]) -> Option<&FormatDescriptor> {
        let mut candidates: Vec<&FormatDescriptor> =
            formats.iter().filter(|f| f.is_audio_only()).collect();

        candidates.sort_by(|a, b| desc_rate(a.abr, b.abr));
        candidates.first().copied()
    }
}

/// Descending order on an optional bitrate; unknown rates go last
fn desc_rate(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(f64::NEG_INFINITY);
    let b = b.unwrap_or(f64::NEG_INFINITY);
    b.total_cmp(&a)
}
