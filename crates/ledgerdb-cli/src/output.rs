//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use serde::Serialize;

use ledgerdb_client::{GetResult, IndexSyncResult, LogEntry, PutResult};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the result of a write (put, patch, delete, revert)
    pub fn print_put(&self, result: &PutResult) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Commit:  {}", result.commit);
                println!("Tx hash: {}", result.tx_hash);
                println!("Tx id:   {}", result.tx_id);
            }
            OutputFormat::Json => print_json(result)?,
            OutputFormat::Quiet => println!("{}", result.tx_id),
        }
        Ok(())
    }

    /// Print a document
    pub fn print_get(&self, result: &GetResult) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if result.doc.is_null() {
                    println!("(no document)");
                } else {
                    println!("{}", serde_json::to_string_pretty(&result.doc)?);
                }
                if let Some(ref tx_id) = result.tx_id {
                    println!();
                    println!("Tx id:   {}", tx_id);
                }
                if let Some(ref tx_hash) = result.tx_hash {
                    println!("Tx hash: {}", tx_hash);
                }
            }
            OutputFormat::Json => print_json(result)?,
            // Compact document only, for piping
            OutputFormat::Quiet => println!("{}", result.doc),
        }
        Ok(())
    }

    /// Print a document's transaction history
    pub fn print_log(&self, entries: &[LogEntry]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No history found.");
                    return Ok(());
                }
                for entry in entries {
                    println!(
                        "{} | {} | {:<6} | {}",
                        entry.time().format("%Y-%m-%d %H:%M:%S"),
                        short_hash(&entry.tx_hash),
                        entry.op,
                        entry.tx_id
                    );
                }
                println!("\n{} transaction(s)", entries.len());
            }
            OutputFormat::Json => print_json(&entries)?,
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.tx_hash);
                }
            }
        }
        Ok(())
    }

    /// Print one index sync report
    pub fn print_sync(&self, result: &IndexSyncResult) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                let status = if result.has_changes() {
                    "applied"
                } else {
                    "up to date"
                };
                println!("Status:      {}", status);
                if result.reset {
                    println!("Reset:       yes");
                }
                println!("Fetched:     {}", if result.fetched { "yes" } else { "no" });
                println!("Commits:     {}", result.commits);
                println!("Txs applied: {}", result.txs_applied);
                println!(
                    "Documents:   {} upserted, {} deleted",
                    result.docs_upserted, result.docs_deleted
                );
                println!("Collections: {}", result.collections);
                if let Some(ref commit) = result.last_commit {
                    println!("Last commit: {}", commit);
                }
            }
            // One record per line so watch output stays line-delimited
            OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
            OutputFormat::Quiet => println!("{}", result.txs_applied),
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// First 8 characters of a hash, for tabular output
fn short_hash(hash: &str) -> &str {
    match hash.char_indices().nth(8) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}
