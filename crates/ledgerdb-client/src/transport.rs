//! Transport seam between the client and the engine
//!
//! The client never spawns processes directly; it hands an [`Invocation`]
//! to a [`Transport`]. [`crate::process::ProcessTransport`] is the real
//! implementation. Tests substitute fakes that return canned output.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::ClientResult;

/// Default cap for each captured output stream (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// A fully described engine call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory (the repository path)
    pub cwd: PathBuf,
    /// Variables applied on top of the inherited environment
    pub env: BTreeMap<String, String>,
    /// Cap for each captured stream in run-to-completion mode
    pub max_output_bytes: usize,
}

/// Output of a process that exited successfully
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// How an attached process is wired to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchStdio {
    /// Share the caller's own stdin/stdout/stderr
    #[default]
    Inherit,
    /// Pipe stdout back to the caller; stderr is still inherited
    Pipe,
}

/// Readable stdout of an attached process
pub type ProcessStdout = Box<dyn AsyncRead + Send + Unpin>;

/// A live engine process started in attached mode
#[async_trait]
pub trait AttachedProcess: Send {
    /// OS process id, while known
    fn id(&self) -> Option<u32>;

    /// Take the piped stdout; `None` when inherited or already taken
    fn take_stdout(&mut self) -> Option<ProcessStdout>;

    /// Exit code if the process has already exited
    fn try_wait(&mut self) -> io::Result<Option<Option<i32>>>;

    /// Wait for the process to exit
    async fn wait(&mut self) -> io::Result<Option<i32>>;

    /// Kill the process and reap it
    async fn kill(&mut self) -> io::Result<()>;
}

/// Runs engine invocations
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run to completion and capture output; non-zero exit is an error
    async fn run(&self, invocation: &Invocation) -> ClientResult<CapturedOutput>;

    /// Start the process and hand back a live handle
    fn spawn_attached(
        &self,
        invocation: &Invocation,
        stdio: WatchStdio,
    ) -> ClientResult<Box<dyn AttachedProcess>>;
}
