//! Config command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use ledgerdb_client::{resolve_binary_path, ClientConfig, IndexMode};

use crate::output::{Output, OutputFormat};

/// Show the effective configuration
pub fn show(config: &ClientConfig, config_path: &Path, output: &Output) -> Result<()> {
    let binary = config
        .binary_path
        .clone()
        .unwrap_or_else(resolve_binary_path);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "repo_path": config.repo_path,
                    "binary_path": binary,
                    "auto_sync": config.auto_sync,
                    "max_output_bytes": config.max_output_bytes,
                    "env": config.env,
                    "index": config.index,
                    "config_file": config_path,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.repo_path.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  repo_path:        {}", display_or_unset(&config.repo_path));
            println!("  binary_path:      {}", binary.display());
            println!("  auto_sync:        {}", config.auto_sync);
            println!("  max_output_bytes: {}", config.max_output_bytes);
            for (key, value) in &config.env {
                println!("  env.{}: {}", key, value);
            }
            if let Some(ref db) = config.index.db_path {
                println!("  index.db_path:    {}", db.display());
            }
            if let Some(mode) = config.index.mode {
                println!("  index.mode:       {}", mode);
            }
            if let Some(interval) = config.index.interval_ms {
                println!("  index.interval_ms: {}", interval);
            }
            if let Some(batch) = config.index.batch_commits {
                println!("  index.batch_commits: {}", batch);
            }
            println!();
            println!("Config file: {}", config_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value and save it
pub fn set(key: &str, value: &str, config_path: &Path, output: &Output) -> Result<()> {
    let mut config =
        ClientConfig::load_file(config_path).context("Failed to load configuration")?;

    apply(&mut config, key, value)?;

    config
        .save_to_path(config_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn apply(config: &mut ClientConfig, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";

    match key {
        "repo_path" => config.repo_path = PathBuf::from(value),
        "binary_path" => {
            config.binary_path = if unset { None } else { Some(value.into()) };
        }
        "auto_sync" => {
            config.auto_sync = value
                .parse()
                .context("Invalid value for auto_sync. Use 'true' or 'false'.")?;
        }
        "max_output_bytes" => {
            config.max_output_bytes = value
                .parse()
                .context("Invalid value for max_output_bytes. Use a byte count.")?;
        }
        "index.db_path" => {
            config.index.db_path = if unset { None } else { Some(value.into()) };
        }
        "index.mode" => {
            config.index.mode = if unset {
                None
            } else {
                Some(value.parse::<IndexMode>()?)
            };
        }
        "index.interval_ms" => {
            config.index.interval_ms = if unset {
                None
            } else {
                Some(value.parse().context("Invalid value for index.interval_ms")?)
            };
        }
        "index.batch_commits" => {
            config.index.batch_commits = if unset {
                None
            } else {
                Some(value.parse().context("Invalid value for index.batch_commits")?)
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: repo_path, binary_path, auto_sync, max_output_bytes, \
                 index.db_path, index.mode, index.interval_ms, index.batch_commits",
                key
            );
        }
    }

    Ok(())
}

fn display_or_unset(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        "(not set)".to_string()
    } else {
        path.display().to_string()
    }
}
