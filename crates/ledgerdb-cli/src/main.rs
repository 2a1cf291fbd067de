//! LedgerDB CLI
//!
//! Command-line interface over the LedgerDB client library.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledgerdb_client::{ClientConfig, IndexMode, IndexOverrides, LedgerClient, RevertTarget};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "ledgerdb-cli")]
#[command(about = "LedgerDB - documents and indexes in a Git-backed ledger")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Ledger repository path
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Engine executable
    #[arg(long = "bin", global = true)]
    bin: Option<PathBuf>,

    /// Keep writes local instead of syncing with the remote
    #[arg(long, global = true)]
    no_sync: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and write documents
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },
    /// Maintain the local index
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },
    /// Publish local commits to the remote
    Push,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum DocCommands {
    /// Show a document
    Get {
        collection: String,
        id: String,
    },
    /// Write a whole document
    Put {
        collection: String,
        id: String,
        /// Document body (JSON text, or - to read stdin)
        payload: String,
    },
    /// Apply patch operations to a document
    Patch {
        collection: String,
        id: String,
        /// Patch operations (JSON text, or - to read stdin)
        ops: String,
    },
    /// Delete a document
    #[command(alias = "rm")]
    Delete {
        collection: String,
        id: String,
    },
    /// Show a document's transaction history
    Log {
        collection: String,
        id: String,
    },
    /// Restore a document to an earlier transaction
    Revert {
        collection: String,
        id: String,
        /// Transaction id to restore
        #[arg(long)]
        tx_id: Option<String>,
        /// Transaction hash to restore
        #[arg(long)]
        tx_hash: Option<String>,
    },
}

#[derive(Subcommand)]
enum IndexCommands {
    /// Run one incremental sync pass
    Sync {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Keep the index in sync until interrupted
    Watch {
        #[command(flatten)]
        index: IndexArgs,
        /// Poll interval in milliseconds
        #[arg(long, allow_negative_numbers = true)]
        interval: Option<i64>,
        /// Random extra delay per poll in milliseconds
        #[arg(long, allow_negative_numbers = true)]
        jitter: Option<i64>,
        /// Report every pass, not only passes with changes
        #[arg(long)]
        all_changes: bool,
        /// Read the engine's JSON records and re-emit them
        #[arg(long)]
        json_records: bool,
    },
}

/// Settings shared by `index sync` and `index watch`
#[derive(Args, Debug, Clone, Default)]
struct IndexArgs {
    /// Index database path
    #[arg(long)]
    db: Option<PathBuf>,
    /// Projection mode (state or history)
    #[arg(long)]
    mode: Option<IndexMode>,
    /// Commits applied per batch
    #[arg(long)]
    batch_commits: Option<u32>,
    /// Skip fetching from the remote first
    #[arg(long)]
    no_fetch: bool,
    /// Disable the engine's fast path
    #[arg(long)]
    no_fast: bool,
}

impl IndexArgs {
    fn overrides(&self) -> IndexOverrides {
        let mut overrides = IndexOverrides::new();
        if let Some(ref db) = self.db {
            overrides = overrides.db_path(db);
        }
        if let Some(mode) = self.mode {
            overrides = overrides.mode(mode);
        }
        if let Some(batch) = self.batch_commits {
            overrides = overrides.batch_commits(batch);
        }
        if self.no_fetch {
            overrides = overrides.fetch(false);
        }
        if self.no_fast {
            overrides = overrides.fast(false);
        }
        overrides
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (repo_path, binary_path, auto_sync, index.mode, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ClientConfig::config_file_path);

    // Config set works on the file alone
    if let Commands::Config {
        command: Some(ConfigCommands::Set { key, value }),
    } = &cli.command
    {
        return commands::config::set(key, value, &config_path, &output);
    }

    let config = load_config(&cli, &config_path)?;

    if let Commands::Config { .. } = &cli.command {
        return commands::config::show(&config, &config_path, &output);
    }

    if config.repo_path.as_os_str().is_empty() {
        bail!(
            "No repository configured. Pass --repo, set LEDGERDB_REPO, or run:\n  \
             ledgerdb-cli config set repo_path /path/to/ledger"
        );
    }

    let client = LedgerClient::new(config).context("Failed to create client")?;

    match cli.command {
        Commands::Doc { command } => handle_doc_command(command, &client, &output).await,
        Commands::Index { command } => handle_index_command(command, &client, &output).await,
        Commands::Push => commands::push::push(&client, &output).await,
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

/// Load the config file and layer command-line flags on top
fn load_config(cli: &Cli, config_path: &Path) -> Result<ClientConfig> {
    let mut config =
        ClientConfig::load_from_path(config_path).context("Failed to load configuration")?;

    if let Some(ref repo) = cli.repo {
        config.repo_path = repo.clone();
    }
    if let Some(ref bin) = cli.bin {
        config.binary_path = Some(bin.clone());
    }
    if cli.no_sync {
        config.auto_sync = false;
    }

    Ok(config)
}

/// Log to stderr so stdout stays machine readable
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("ledgerdb_client=debug,ledgerdb_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn handle_doc_command(
    command: DocCommands,
    client: &LedgerClient,
    output: &Output,
) -> Result<()> {
    match command {
        DocCommands::Get { collection, id } => {
            commands::doc::get(client, &collection, &id, output).await
        }
        DocCommands::Put {
            collection,
            id,
            payload,
        } => commands::doc::put(client, &collection, &id, &payload, output).await,
        DocCommands::Patch {
            collection,
            id,
            ops,
        } => commands::doc::patch(client, &collection, &id, &ops, output).await,
        DocCommands::Delete { collection, id } => {
            commands::doc::delete(client, &collection, &id, output).await
        }
        DocCommands::Log { collection, id } => {
            commands::doc::log(client, &collection, &id, output).await
        }
        DocCommands::Revert {
            collection,
            id,
            tx_id,
            tx_hash,
        } => {
            let target = RevertTarget { tx_id, tx_hash };
            commands::doc::revert(client, &collection, &id, target, output).await
        }
    }
}

async fn handle_index_command(
    command: IndexCommands,
    client: &LedgerClient,
    output: &Output,
) -> Result<()> {
    match command {
        IndexCommands::Sync { index } => {
            commands::index::sync(client, index.overrides(), output).await
        }
        IndexCommands::Watch {
            index,
            interval,
            jitter,
            all_changes,
            json_records,
        } => {
            let mut overrides = index.overrides();
            if let Some(interval) = interval {
                overrides = overrides.interval_ms(interval);
            }
            if let Some(jitter) = jitter {
                overrides = overrides.jitter_ms(jitter);
            }
            if all_changes {
                overrides = overrides.only_changes(false);
            }
            commands::index::watch(client, overrides, json_records, output).await
        }
    }
}
