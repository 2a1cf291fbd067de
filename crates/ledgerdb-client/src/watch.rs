//! Continuous index watch
//!
//! `index watch` runs as a long-lived engine process. [`IndexWatch`] is the
//! caller-owned handle for it: dropping the handle leaves the process
//! running, so callers end it with [`IndexWatch::terminate`].

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::index::IndexOverrides;
use crate::models::IndexSyncResult;
use crate::transport::{AttachedProcess, ProcessStdout, WatchStdio};

/// Options for starting a watch
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Index settings layered over the session defaults
    pub overrides: IndexOverrides,
    /// Ask the engine for one JSON record per reported pass
    pub json: bool,
    pub stdio: WatchStdio,
}

impl WatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overrides(mut self, overrides: IndexOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn stdio(mut self, stdio: WatchStdio) -> Self {
        self.stdio = stdio;
        self
    }
}

/// Handle to a running `index watch` process
pub struct IndexWatch {
    process: Box<dyn AttachedProcess>,
    args: Vec<String>,
    exit: Option<Option<i32>>,
    terminated: bool,
}

impl IndexWatch {
    pub(crate) fn new(process: Box<dyn AttachedProcess>, args: Vec<String>) -> Self {
        info!(pid = ?process.id(), "index watch started");
        Self {
            process,
            args,
            exit: None,
            terminated: false,
        }
    }

    /// Full argument vector the engine was started with
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// OS process id while the process is known to be running
    pub fn id(&self) -> Option<u32> {
        if self.exit.is_some() {
            return None;
        }
        self.process.id()
    }

    /// Take the engine's stdout
    ///
    /// Only available once, and only when the watch was started with
    /// [`WatchStdio::Pipe`].
    pub fn output(&mut self) -> Option<WatchOutput> {
        self.process.take_stdout().map(WatchOutput::new)
    }

    /// Whether [`terminate`](Self::terminate) has completed
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Exit code if the process has exited (`Some(None)` when killed by a signal)
    pub fn try_exit(&mut self) -> ClientResult<Option<Option<i32>>> {
        if self.exit.is_none() {
            self.exit = self.process.try_wait()?;
        }
        Ok(self.exit)
    }

    /// Wait for the engine to exit on its own
    pub async fn wait(&mut self) -> ClientResult<Option<i32>> {
        if let Some(code) = self.exit {
            return Ok(code);
        }
        let code = self.process.wait().await?;
        self.exit = Some(code);
        Ok(code)
    }

    /// Stop the engine and reap it
    ///
    /// Safe to call any number of times, including after the process has
    /// already exited.
    pub async fn terminate(&mut self) -> ClientResult<()> {
        if self.terminated {
            return Ok(());
        }

        if self.try_exit()?.is_none() {
            self.process.kill().await?;
            self.exit = Some(self.process.try_wait()?.unwrap_or(None));
        }

        self.terminated = true;
        info!(exit = ?self.exit, "index watch terminated");
        Ok(())
    }
}

impl std::fmt::Debug for IndexWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWatch")
            .field("pid", &self.process.id())
            .field("args", &self.args)
            .field("exit", &self.exit)
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

impl Drop for IndexWatch {
    fn drop(&mut self) {
        if !self.terminated && self.exit.is_none() {
            debug!(
                pid = ?self.process.id(),
                "index watch handle dropped while engine may still run"
            );
        }
    }
}

/// Reader over the piped stdout of a watch
pub struct WatchOutput {
    reader: BufReader<ProcessStdout>,
    pending: Vec<u8>,
}

impl WatchOutput {
    pub(crate) fn new(stdout: ProcessStdout) -> Self {
        Self {
            reader: BufReader::new(stdout),
            pending: Vec::new(),
        }
    }

    /// Next raw line of output, without the line terminator
    pub async fn next_line(&mut self) -> ClientResult<Option<String>> {
        let mut bytes = std::mem::take(&mut self.pending);
        let consumed_pending = match bytes.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                self.pending = bytes.split_off(pos + 1);
                true
            }
            None => false,
        };

        if !consumed_pending {
            let read = self.reader.read_until(b'\n', &mut bytes).await?;
            if read == 0 && bytes.is_empty() {
                return Ok(None);
            }
        }

        while matches!(bytes.last(), Some(b'\n' | b'\r')) {
            bytes.pop();
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Next sync report, for watches started with `json`
    ///
    /// Records may span several lines. Returns `Ok(None)` once the stream
    /// ends cleanly.
    pub async fn next_result(&mut self) -> ClientResult<Option<IndexSyncResult>> {
        loop {
            if let Some(result) = self.parse_pending()? {
                return Ok(Some(result));
            }

            let mut chunk = [0u8; 4096];
            let read = self.reader.read(&mut chunk).await?;
            if read == 0 {
                if self.pending.iter().all(u8::is_ascii_whitespace) {
                    self.pending.clear();
                    return Ok(None);
                }
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                return Err(ClientError::decode(
                    format!("truncated watch record: {}", text.trim()),
                    "",
                ));
            }
            self.pending.extend_from_slice(&chunk[..read]);
        }
    }

    /// Pull one complete record off the front of the buffer
    fn parse_pending(&mut self) -> ClientResult<Option<IndexSyncResult>> {
        let next = {
            let mut stream =
                serde_json::Deserializer::from_slice(&self.pending).into_iter::<IndexSyncResult>();
            match stream.next() {
                Some(Ok(result)) => Some(Ok((result, stream.byte_offset()))),
                Some(Err(e)) => Some(Err(e)),
                None => None,
            }
        };

        match next {
            None => Ok(None),
            // Incomplete record; wait for more output
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => {
                self.pending.clear();
                Err(ClientError::decode(e, ""))
            }
            Some(Ok((result, offset))) => {
                self.pending.drain(..offset);
                Ok(Some(result))
            }
        }
    }
}
