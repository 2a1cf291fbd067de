//! Argument vector construction
//!
//! Every engine invocation has the shape
//! `--repo <path> [--json] [--sync=false] <subcommand> [args...]`.

use std::path::Path;

use serde_json::Value;

/// A document payload or patch body handed to the engine
///
/// Text is passed through untouched; anything else is encoded as compact
/// JSON. A missing value encodes as `null`, never as an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    /// Encode the payload for the argument vector
    pub fn encode(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Json(value) => value.to_string(),
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<Option<Value>> for Payload {
    fn from(value: Option<Value>) -> Self {
        Payload::Json(value.unwrap_or(Value::Null))
    }
}

/// Which transaction a revert should restore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevertTarget {
    pub tx_id: Option<String>,
    pub tx_hash: Option<String>,
}

impl RevertTarget {
    pub fn tx_id(tx_id: impl Into<String>) -> Self {
        Self {
            tx_id: Some(tx_id.into()),
            tx_hash: None,
        }
    }

    pub fn tx_hash(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_id: None,
            tx_hash: Some(tx_hash.into()),
        }
    }
}

/// Leading flags shared by all invocations
pub fn base_args(repo_path: &Path, json: bool, write: bool, auto_sync: bool) -> Vec<String> {
    let mut args = vec!["--repo".to_string(), repo_path.to_string_lossy().into_owned()];
    if json {
        args.push("--json".to_string());
    }
    if write && !auto_sync {
        args.push("--sync=false".to_string());
    }
    args
}

/// `doc <verb> <collection> <id>`
pub fn doc_args(verb: &str, collection: &str, doc_id: &str) -> Vec<String> {
    vec![
        "doc".to_string(),
        verb.to_string(),
        collection.to_string(),
        doc_id.to_string(),
    ]
}

pub fn put_args(collection: &str, doc_id: &str, payload: &Payload) -> Vec<String> {
    let mut args = doc_args("put", collection, doc_id);
    args.push("--payload".to_string());
    args.push(payload.encode());
    args
}

pub fn patch_args(collection: &str, doc_id: &str, ops: &Payload) -> Vec<String> {
    let mut args = doc_args("patch", collection, doc_id);
    args.push("--ops".to_string());
    args.push(ops.encode());
    args
}

/// Both selectors are forwarded when both are set; the engine decides.
pub fn revert_args(collection: &str, doc_id: &str, target: &RevertTarget) -> Vec<String> {
    let mut args = doc_args("revert", collection, doc_id);
    if let Some(tx_id) = target.tx_id.as_deref().filter(|s| !s.is_empty()) {
        args.push("--tx-id".to_string());
        args.push(tx_id.to_string());
    }
    if let Some(tx_hash) = target.tx_hash.as_deref().filter(|s| !s.is_empty()) {
        args.push("--tx-hash".to_string());
        args.push(tx_hash.to_string());
    }
    args
}
