//! Subprocess execution seam.
//!
//! Every external binary the helper touches (`docker`, `crictl`, `nsenter`,
//! `tc`) goes through the [`CommandRunner`] trait so tests can substitute a
//! recording fake for the real process spawner. Commands are spawned
//! argv-style, never through a shell.

use async_trait::async_trait;

use crate::error::Result;

/// Captured output of a finished subprocess.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Raw standard error.
    pub stderr: Vec<u8>,
}

impl CmdOutput {
    /// Returns true if the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Standard output as lossy UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Combined stdout and stderr as lossy UTF-8, for error reporting.
    pub fn combined(&self) -> String {
        let mut out = String::from_utf8_lossy(&self.stdout).into_owned();
        let err = String::from_utf8_lossy(&self.stderr);
        if !err.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&err);
        }
        out.trim_end().to_string()
    }
}

/// Runs external commands, capturing their output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` to completion and captures its output.
    ///
    /// A non-zero exit is not an error at this layer; callers classify the
    /// exit status themselves. `Err` means the process could not be spawned
    /// or waited on.
    async fn run(&self, program: &str, args: &[String]) -> Result<CmdOutput>;
}

/// Production [`CommandRunner`] backed by [`tokio::process::Command`].
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a new process runner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CmdOutput> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await?;

        Ok(CmdOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
