//! Subprocess execution of the engine
//!
//! One child process per invocation. Run-to-completion calls capture both
//! streams up to a byte cap; attached calls hand the live child back to the
//! caller, who owns its lifetime.

use std::io;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::transport::{
    AttachedProcess, CapturedOutput, Invocation, ProcessStdout, Transport, WatchStdio,
};

/// Transport that spawns the engine executable
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTransport;

impl ProcessTransport {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(&invocation.env)
            .kill_on_drop(false);
        command
    }

    fn spawn_error(invocation: &Invocation, source: io::Error) -> ClientError {
        ClientError::Spawn {
            program: invocation.program.clone(),
            source,
        }
    }
}

#[async_trait]
impl Transport for ProcessTransport {
    async fn run(&self, invocation: &Invocation) -> ClientResult<CapturedOutput> {
        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            "running ledgerdb"
        );

        let mut child = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(invocation, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stderr not captured"))?;

        let limit = invocation.max_output_bytes;
        let captured = tokio::try_join!(read_capped(stdout, limit), read_capped(stderr, limit));
        let (stdout, stderr) = match captured {
            Ok(streams) => streams,
            Err(e) => {
                reap(&mut child).await;
                return Err(e.into());
            }
        };
        let status = child.wait().await?;

        if !status.success() {
            let stderr_text = String::from_utf8_lossy(&stderr.bytes);
            warn!(status = %status, "ledgerdb exited with failure");
            return Err(ClientError::execution(
                describe_failure(invocation, &status),
                status.code(),
                &stderr_text,
            ));
        }

        if stdout.overflowed {
            return Err(ClientError::OutputLimit {
                stream: "stdout",
                limit,
            });
        }
        if stderr.overflowed {
            return Err(ClientError::OutputLimit {
                stream: "stderr",
                limit,
            });
        }

        debug!(bytes = stdout.bytes.len(), "ledgerdb finished");
        Ok(CapturedOutput {
            stdout: String::from_utf8_lossy(&stdout.bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr.bytes).into_owned(),
        })
    }

    fn spawn_attached(
        &self,
        invocation: &Invocation,
        stdio: WatchStdio,
    ) -> ClientResult<Box<dyn AttachedProcess>> {
        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            ?stdio,
            "starting attached ledgerdb"
        );

        let mut command = Self::command(invocation);
        match stdio {
            WatchStdio::Inherit => {
                command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            WatchStdio::Pipe => {
                command
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::inherit());
            }
        }

        let child = command
            .spawn()
            .map_err(|e| Self::spawn_error(invocation, e))?;
        Ok(Box::new(ChildProcess { child }))
    }
}

/// Bytes read from one stream, capped
struct Captured {
    bytes: Vec<u8>,
    overflowed: bool,
}

/// Read up to `limit` bytes, then keep draining so the child never blocks
/// on a full pipe.
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> io::Result<Captured> {
    let mut bytes = Vec::new();
    (&mut reader)
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;

    let overflowed = bytes.len() > limit;
    if overflowed {
        bytes.truncate(limit);
        tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    }

    Ok(Captured { bytes, overflowed })
}

/// Kill and wait for a child whose output could not be read
async fn reap(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "ledgerdb already exited");
    }
    if let Err(e) = child.wait().await {
        warn!(error = %e, "failed to reap ledgerdb");
    }
}

fn describe_failure(invocation: &Invocation, status: &ExitStatus) -> String {
    let program = invocation.program.display();
    match status.code() {
        Some(code) => format!("Command failed: {} exited with status {}", program, code),
        None => format!("Command failed: {} was terminated by a signal", program),
    }
}

/// An attached engine process
struct ChildProcess {
    child: Child,
}

#[async_trait]
impl AttachedProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn take_stdout(&mut self) -> Option<ProcessStdout> {
        self.child
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as ProcessStdout)
    }

    fn try_wait(&mut self) -> io::Result<Option<Option<i32>>> {
        Ok(self.child.try_wait()?.map(|status| status.code()))
    }

    async fn wait(&mut self) -> io::Result<Option<i32>> {
        Ok(self.child.wait().await?.code())
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }
}
