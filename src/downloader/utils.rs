// Process helpers shared by the metadata fetcher and both runners

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::errors::DownloadError;
use super::models::ToolOutput;
use super::traits::ToolRunner;
use crate::ytdlp::parse_progress;

/// Runs real processes via `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout_secs: Option<u64>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Kill the process if it has not exited after `secs` seconds
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> DownloadError {
    if err.kind() == ErrorKind::NotFound {
        DownloadError::ToolNotFound(program.to_string())
    } else {
        DownloadError::Spawn {
            program: program.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, DownloadError> {
        let mut child = TokioCommand::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let stdout_pipe = child.stdout.take().ok_or_else(|| DownloadError::Spawn {
            program: program.to_string(),
            message: "failed to capture stdout".to_string(),
        })?;
        let mut stderr_pipe = child.stderr.take().ok_or_else(|| DownloadError::Spawn {
            program: program.to_string(),
            message: "failed to capture stderr".to_string(),
        })?;

        // stdout is read line by line so download progress shows up in debug logs
        let stdout_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stdout_pipe);
            let mut collected = Vec::new();
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf).await? == 0 {
                    break;
                }
                let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                if let Some(status) = parse_progress(&line) {
                    debug!(target: "progress", "{}", status);
                }
                collected.push(line);
            }
            Ok::<String, std::io::Error>(collected.join("\n"))
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr_pipe.read_to_end(&mut buf).await?;
            Ok::<String, std::io::Error>(String::from_utf8_lossy(&buf).trim_end().to_string())
        });

        let waited = match self.timeout_secs {
            Some(secs) => match timeout(Duration::from_secs(secs), child.wait()).await {
                Ok(res) => res,
                Err(_) => {
                    let _ = child.kill().await;
                    stdout_task.abort();
                    stderr_task.abort();
                    return Err(DownloadError::NetworkTimeout(format!(
                        "{} timed out after {}s",
                        program, secs
                    )));
                }
            },
            None => child.wait().await,
        };
        let status = waited.map_err(|e| spawn_error(program, e))?;

        let read_error = |e: String| DownloadError::Spawn {
            program: program.to_string(),
            message: e,
        };
        let stdout = stdout_task
            .await
            .map_err(|e| read_error(format!("stdout task failed: {}", e)))?
            .map_err(|e| read_error(format!("failed to read stdout: {}", e)))?;
        let stderr = stderr_task
            .await
            .map_err(|e| read_error(format!("stderr task failed: {}", e)))?
            .map_err(|e| read_error(format!("failed to read stderr: {}", e)))?;

        Ok(ToolOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_exit_code_and_streams() {
        let out = ProcessRunner::new()
            .run("sh", &sh("echo line1; echo line2; echo oops >&2; exit 3"))
            .await
            .unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout, "line1\nline2");
        assert_eq!(out.stderr, "oops");
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let err = ProcessRunner::new()
            .run("definitely-not-a-real-binary-tube-batch", &[])
            .await
            .unwrap_err();
        assert!(err.is_missing_tool());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let err = ProcessRunner::new()
            .with_timeout(Some(1))
            .run("sh", &sh("sleep 5"))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::NetworkTimeout(_)));
    }
}
