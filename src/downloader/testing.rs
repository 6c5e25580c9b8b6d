// Scripted ToolRunner for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::ToolOutput;
use super::traits::ToolRunner;

/// Replays canned results in order and records every argument vector
pub struct ScriptedRunner {
    script: Mutex<VecDeque<Result<ToolOutput, DownloadError>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new(script: Vec<Result<ToolOutput, DownloadError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Exit codes only, empty output
    pub fn with_exit_codes(codes: &[i32]) -> Self {
        Self::new(codes.iter().map(|c| Ok(exit(*c, ""))).collect())
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn exit(code: i32, stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Value following `flag` in an argument vector
pub fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    async fn run(&self, _program: &str, args: &[String]) -> Result<ToolOutput, DownloadError> {
        self.calls.lock().unwrap().push(args.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DownloadError::ExecutionError("script exhausted".to_string())))
    }
}
