// Metadata extraction via the yt-dlp binary
//
// - traits: format descriptors and `formats` array parsing
// - cli: the fetcher that runs `yt-dlp -J`
// - diagnostics: failure markers found in tool output

mod cli;
mod diagnostics;
mod traits;

pub use cli::CliMetadataFetcher;
pub use diagnostics::{diagnose_failure, summarize_failure, FailureMarker};
pub use traits::{parse_formats, FormatDescriptor};
