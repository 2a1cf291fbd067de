//! LedgerDB Client Library
//!
//! A client for LedgerDB, a Git-backed document ledger. Every operation runs
//! the `ledgerdb` engine executable as a subprocess and decodes the JSON it
//! prints; the library itself keeps no document state.
//!
//! # Quick Start
//!
//! ```text
//! let client = LedgerClient::new(ClientConfig::new("/data/ledger"))?;
//!
//! // Write and read a document
//! let put = client.put("users", "u1", json!({"name": "Ann"})).await?;
//! let doc = client.get("users", "u1").await?;
//!
//! // Bring the local index up to date
//! let report = client.index_sync(&IndexOverrides::new()).await?;
//! ```
//!
//! # Modules
//!
//! - `client`: Session facade (main entry point)
//! - `models`: Result records decoded from engine output
//! - `index`: Index configuration and argument building
//! - `watch`: Handle for a running `index watch`
//! - `transport`: Seam between the client and the engine process
//! - `process`: Subprocess transport
//! - `config`: Client configuration

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod process;
pub mod transport;
pub mod watch;

pub use args::{Payload, RevertTarget};
pub use client::LedgerClient;
pub use config::{resolve_binary_path, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use index::{IndexCommand, IndexConfig, IndexMode, IndexOverrides};
pub use models::{GetResult, IndexSyncResult, LogEntry, PutResult};
pub use process::ProcessTransport;
pub use transport::{Transport, WatchStdio};
pub use watch::{IndexWatch, WatchOptions, WatchOutput};
