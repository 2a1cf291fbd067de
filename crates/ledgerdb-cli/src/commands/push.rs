//! Push command handler

use anyhow::{Context, Result};

use ledgerdb_client::LedgerClient;

use crate::output::{Output, OutputFormat};

/// Publish pending local commits to the remote
pub async fn push(client: &LedgerClient, output: &Output) -> Result<()> {
    let text = client.push().await.context("Push failed")?;

    match output.format {
        OutputFormat::Human => {
            let text = text.trim_end();
            if text.is_empty() {
                output.success("Push complete");
            } else {
                println!("{}", text);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({"status": "success", "output": text.trim_end()})
            );
        }
        OutputFormat::Quiet => {}
    }

    Ok(())
}
