// Downloader module - metadata, format selection, retry ladder, grouping, queue

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod groups;
pub mod models;
pub mod orchestrator;
pub mod queue;
pub mod reconcile;
pub mod tools;
pub mod traits;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{DownloadError, QueueError};
pub use format_selector::{FormatSelector, Selector};
pub use models::{Attempt, DownloadOptions, Group, RunMode, RunResult, ToolOutput};
pub use orchestrator::{LadderOutcome, RetryLadder};
pub use traits::ToolRunner;
