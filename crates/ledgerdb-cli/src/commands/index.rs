//! Index command handlers

use anyhow::{bail, Context, Result};
use tracing::debug;

use ledgerdb_client::{IndexOverrides, LedgerClient, WatchOptions, WatchStdio};

use crate::output::Output;

/// Run one index sync pass
pub async fn sync(client: &LedgerClient, overrides: IndexOverrides, output: &Output) -> Result<()> {
    let result = client
        .index_sync(&overrides)
        .await
        .context("Index sync failed")?;
    output.print_sync(&result)
}

/// Watch the repository until Ctrl-C or until the engine exits
///
/// With `json_records` the engine's stdout is piped back and every record
/// is re-emitted through `output`; otherwise the engine writes straight to
/// the terminal.
pub async fn watch(
    client: &LedgerClient,
    overrides: IndexOverrides,
    json_records: bool,
    output: &Output,
) -> Result<()> {
    let options = WatchOptions::new()
        .overrides(overrides)
        .json(json_records)
        .stdio(if json_records {
            WatchStdio::Pipe
        } else {
            WatchStdio::Inherit
        });

    let mut watch = client
        .start_index_watch(&options)
        .context("Failed to start index watch")?;

    if !json_records {
        output.message(&format!(
            "Watching {} (Ctrl-C to stop)",
            client.repo_path().display()
        ));
    }

    let exit = if json_records {
        let mut records = watch
            .output()
            .context("Index watch output is not available")?;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break None,
                record = records.next_result() => match record {
                    Ok(Some(result)) => output.print_sync(&result)?,
                    Ok(None) => break Some(watch.wait().await?),
                    Err(e) => {
                        watch.terminate().await?;
                        return Err(e).context("Failed to read index watch output");
                    }
                },
            }
        }
    } else {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => None,
            code = watch.wait() => Some(code?),
        }
    };

    debug!(?exit, "index watch loop finished");
    watch.terminate().await?;

    match exit {
        None | Some(Some(0)) => Ok(()),
        Some(Some(code)) => bail!("Index watch exited with status {}", code),
        Some(None) => bail!("Index watch was terminated by a signal"),
    }
}
