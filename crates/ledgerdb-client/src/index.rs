//! Index configuration
//!
//! The session holds a fully resolved [`IndexConfig`]. Each `sync` or
//! `watch` call layers an [`IndexOverrides`] on top of it and validates the
//! merged value, so an invariant holds no matter which layer set a field.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Default polling interval for `index watch`
pub const DEFAULT_INTERVAL_MS: i64 = 1000;

/// Default number of commits folded into one index transaction
pub const DEFAULT_BATCH_COMMITS: u32 = 200;

/// File name of the index database inside the repository
pub const DEFAULT_DB_FILE: &str = "index.db";

/// What the local index materializes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Every transaction per document, in causal order
    History,
    /// Only the latest value per document
    #[default]
    State,
}

impl IndexMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexMode::History => "history",
            IndexMode::State => "state",
        }
    }
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "history" => Ok(IndexMode::History),
            "state" => Ok(IndexMode::State),
            "" => Err(ClientError::Config("index mode is required".to_string())),
            other => Err(ClientError::Config(format!("invalid index mode: {}", other))),
        }
    }
}

/// Which index subcommand the arguments are built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexCommand {
    Sync,
    Watch,
}

impl IndexCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexCommand::Sync => "sync",
            IndexCommand::Watch => "watch",
        }
    }
}

/// Fully resolved index configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub db_path: PathBuf,
    pub mode: IndexMode,
    /// Watch polling interval in milliseconds; must be positive for watch
    pub interval_ms: i64,
    /// Upper bound of the random delay added to each wake; ignored unless positive
    pub jitter_ms: i64,
    /// Commits per index transaction; zero leaves the engine default
    pub batch_commits: u32,
    /// Relax index durability for faster indexing
    pub fast: bool,
    /// Fetch remote updates before syncing
    pub fetch: bool,
    /// Watch only reports passes that changed the index
    pub only_changes: bool,
}

impl IndexConfig {
    /// Defaults for a repository, with the database inside it
    pub fn for_repo(repo_path: &Path) -> Self {
        Self {
            db_path: repo_path.join(DEFAULT_DB_FILE),
            mode: IndexMode::default(),
            interval_ms: DEFAULT_INTERVAL_MS,
            jitter_ms: 0,
            batch_commits: DEFAULT_BATCH_COMMITS,
            fast: true,
            fetch: true,
            only_changes: true,
        }
    }

    /// Layer overrides on top of this configuration
    ///
    /// Returns a new value; `self` is left untouched.
    pub fn merge(&self, overrides: &IndexOverrides) -> Self {
        Self {
            db_path: overrides.db_path.clone().unwrap_or_else(|| self.db_path.clone()),
            mode: overrides.mode.unwrap_or(self.mode),
            interval_ms: overrides.interval_ms.unwrap_or(self.interval_ms),
            jitter_ms: overrides.jitter_ms.unwrap_or(self.jitter_ms),
            batch_commits: overrides.batch_commits.unwrap_or(self.batch_commits),
            fast: overrides.fast.unwrap_or(self.fast),
            fetch: overrides.fetch.unwrap_or(self.fetch),
            only_changes: overrides.only_changes.unwrap_or(self.only_changes),
        }
    }

    /// Check the invariants the given subcommand depends on
    pub fn validate(&self, command: IndexCommand) -> ClientResult<()> {
        if command == IndexCommand::Watch && self.interval_ms <= 0 {
            return Err(ClientError::Config(format!(
                "index watch interval must be > 0 (got {}ms)",
                self.interval_ms
            )));
        }
        Ok(())
    }

    /// Build `index <sync|watch>` and its flags
    ///
    /// The flag order is fixed so the same configuration always yields the
    /// same vector.
    pub fn to_args(&self, command: IndexCommand) -> ClientResult<Vec<String>> {
        self.validate(command)?;

        let mut args = vec![
            "index".to_string(),
            command.as_str().to_string(),
            "--db".to_string(),
            self.db_path.to_string_lossy().into_owned(),
            "--mode".to_string(),
            self.mode.to_string(),
        ];

        if command == IndexCommand::Watch {
            args.push("--interval".to_string());
            args.push(format!("{}ms", self.interval_ms));
            if self.jitter_ms > 0 {
                args.push("--jitter".to_string());
                args.push(format!("{}ms", self.jitter_ms));
            }
            if self.only_changes {
                args.push("--only-changes".to_string());
            }
        }

        if self.batch_commits > 0 {
            args.push("--batch-commits".to_string());
            args.push(self.batch_commits.to_string());
        }
        if self.fast {
            args.push("--fast".to_string());
        }
        if !self.fetch {
            args.push("--fetch=false".to_string());
        }

        Ok(args)
    }
}

/// Per-call (or per-session) index settings; unset fields fall through
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<IndexMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_commits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_changes: Option<bool>,
}

impl IndexOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    pub fn mode(mut self, mode: IndexMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn interval_ms(mut self, interval_ms: i64) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }

    pub fn jitter_ms(mut self, jitter_ms: i64) -> Self {
        self.jitter_ms = Some(jitter_ms);
        self
    }

    pub fn batch_commits(mut self, batch_commits: u32) -> Self {
        self.batch_commits = Some(batch_commits);
        self
    }

    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = Some(fast);
        self
    }

    pub fn fetch(mut self, fetch: bool) -> Self {
        self.fetch = Some(fetch);
        self
    }

    pub fn only_changes(mut self, only_changes: bool) -> Self {
        self.only_changes = Some(only_changes);
        self
    }

    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
