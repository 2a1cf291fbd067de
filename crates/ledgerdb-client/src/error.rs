//! Client error handling
//!
//! Every failure the client can report falls into one of a few kinds:
//! configuration problems caught before anything runs, the engine failing
//! to start, the engine exiting non-zero, or the engine succeeding with
//! output that cannot be decoded.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the ledger engine
#[derive(Error, Debug)]
pub enum ClientError {
    /// Invalid session or call configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The engine executable could not be started
    #[error("ledgerdb: failed to start '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The engine ran and exited with a non-zero status
    #[error("{message}")]
    Execution {
        message: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The engine exited successfully but its output was not the expected shape
    #[error("{message}")]
    Decode { message: String },

    /// A captured output stream exceeded the configured buffer cap
    #[error("ledgerdb {stream} exceeded the {limit} byte output limit")]
    OutputLimit { stream: &'static str, limit: usize },

    /// I/O failure while talking to a running engine process
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// Build an execution error, appending trimmed diagnostics when present
    pub fn execution(description: impl Into<String>, code: Option<i32>, stderr: &str) -> Self {
        let description = description.into();
        let details = stderr.trim();
        let message = if details.is_empty() {
            description
        } else {
            format!("{}: {}", description, details)
        };
        ClientError::Execution {
            message,
            code,
            stderr: details.to_string(),
        }
    }

    /// Build a decode error from a parse failure and the engine's diagnostics
    pub fn decode(error: impl std::fmt::Display, stderr: &str) -> Self {
        let details = stderr.trim();
        let message = if details.is_empty() {
            format!("ledgerdb json parse failed: {}", error)
        } else {
            format!("ledgerdb json parse failed: {}: {}", error, details)
        };
        ClientError::Decode { message }
    }

    /// Check if this error was raised before any process was started
    pub fn is_config(&self) -> bool {
        matches!(self, ClientError::Config(_))
    }

    /// Diagnostic text captured from the engine, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ClientError::Execution { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
