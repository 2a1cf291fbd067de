//! Document command handlers

use std::io::Read;

use anyhow::{Context, Result};

use ledgerdb_client::{LedgerClient, Payload, RevertTarget};

use crate::output::Output;

/// Show the current value of a document
pub async fn get(client: &LedgerClient, collection: &str, id: &str, output: &Output) -> Result<()> {
    let result = client
        .get(collection, id)
        .await
        .with_context(|| format!("Failed to read {}/{}", collection, id))?;
    output.print_get(&result)
}

/// Write a whole document
pub async fn put(
    client: &LedgerClient,
    collection: &str,
    id: &str,
    payload: &str,
    output: &Output,
) -> Result<()> {
    let payload = read_body(payload)?;
    let result = client
        .put(collection, id, payload)
        .await
        .with_context(|| format!("Failed to write {}/{}", collection, id))?;

    output.success(&format!("Wrote {}/{}", collection, id));
    output.print_put(&result)
}

/// Apply patch operations to a document
pub async fn patch(
    client: &LedgerClient,
    collection: &str,
    id: &str,
    ops: &str,
    output: &Output,
) -> Result<()> {
    let ops = read_body(ops)?;
    let result = client
        .patch(collection, id, ops)
        .await
        .with_context(|| format!("Failed to patch {}/{}", collection, id))?;

    output.success(&format!("Patched {}/{}", collection, id));
    output.print_put(&result)
}

/// Tombstone a document
pub async fn delete(
    client: &LedgerClient,
    collection: &str,
    id: &str,
    output: &Output,
) -> Result<()> {
    let result = client
        .delete(collection, id)
        .await
        .with_context(|| format!("Failed to delete {}/{}", collection, id))?;

    output.success(&format!("Deleted {}/{}", collection, id));
    output.print_put(&result)
}

/// Show a document's transaction history
pub async fn log(client: &LedgerClient, collection: &str, id: &str, output: &Output) -> Result<()> {
    let entries = client
        .log(collection, id)
        .await
        .with_context(|| format!("Failed to read history of {}/{}", collection, id))?;
    output.print_log(&entries)
}

/// Restore a document to an earlier transaction
pub async fn revert(
    client: &LedgerClient,
    collection: &str,
    id: &str,
    target: RevertTarget,
    output: &Output,
) -> Result<()> {
    let result = client
        .revert(collection, id, &target)
        .await
        .with_context(|| format!("Failed to revert {}/{}", collection, id))?;

    output.success(&format!("Reverted {}/{}", collection, id));
    output.print_put(&result)
}

/// Resolve a body argument; `-` reads it from stdin
fn read_body(arg: &str) -> Result<Payload> {
    if arg != "-" {
        return Ok(Payload::from(arg));
    }

    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .context("Failed to read body from stdin")?;
    Ok(Payload::Text(body.trim_end().to_string()))
}
