// Tool runner trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::ToolOutput;

/// Runs an external program to completion and captures its output.
///
/// Exactly one invocation is in flight at a time; callers await each run
/// before starting the next. A missing executable is reported as
/// [`DownloadError::ToolNotFound`], any other spawn failure as
/// [`DownloadError::Spawn`]. A non-zero exit is *not* an error here.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, DownloadError>;
}
