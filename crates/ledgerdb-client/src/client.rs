//! LedgerDB client session
//!
//! [`LedgerClient`] is the main entry point. Each operation builds an
//! argument vector, runs the engine once through the session's transport and
//! decodes the JSON it prints.
//!
//! ## Usage
//!
//! ```text
//! let client = LedgerClient::new(ClientConfig::new("/data/ledger"))?;
//!
//! let put = client.put("users", "u1", json!({"name": "Ann"})).await?;
//! let doc = client.get("users", "u1").await?;
//!
//! let report = client.index_sync(&IndexOverrides::new()).await?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::args::{self, Payload, RevertTarget};
use crate::config::{resolve_binary_path, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::index::{IndexCommand, IndexConfig, IndexOverrides};
use crate::models::{GetResult, IndexSyncResult, LogEntry, LogOutput, PutResult};
use crate::process::ProcessTransport;
use crate::transport::{Invocation, Transport};
use crate::watch::{IndexWatch, WatchOptions};

/// A session bound to one ledger repository
///
/// Immutable after construction. Concurrent calls are independent: each
/// one runs its own engine process.
#[derive(Clone)]
pub struct LedgerClient {
    repo_path: PathBuf,
    binary_path: PathBuf,
    env: BTreeMap<String, String>,
    auto_sync: bool,
    max_output_bytes: usize,
    index: IndexConfig,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("repo_path", &self.repo_path)
            .field("binary_path", &self.binary_path)
            .field("auto_sync", &self.auto_sync)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl LedgerClient {
    /// Create a session that runs the engine as a subprocess
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::with_transport(config, Arc::new(ProcessTransport::new()))
    }

    /// Create a session over a custom transport
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Self> {
        if config.repo_path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ClientError::Config("repo_path is required".to_string()));
        }

        let binary_path = config.binary_path.unwrap_or_else(resolve_binary_path);
        let index = IndexConfig::for_repo(&config.repo_path).merge(&config.index);

        debug!(
            repo = %config.repo_path.display(),
            binary = %binary_path.display(),
            "ledgerdb client ready"
        );

        Ok(Self {
            repo_path: config.repo_path,
            binary_path,
            env: config.env,
            auto_sync: config.auto_sync,
            max_output_bytes: config.max_output_bytes,
            index,
            transport,
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Session-level index configuration that per-call overrides layer onto
    pub fn index_defaults(&self) -> &IndexConfig {
        &self.index
    }

    /// Path of the local index database
    pub fn index_db_path(&self) -> &Path {
        &self.index.db_path
    }

    // ---- Document operations ----

    /// Read the current value of a document
    pub async fn get(&self, collection: &str, doc_id: &str) -> ClientResult<GetResult> {
        self.exec_json(args::doc_args("get", collection, doc_id), false).await
    }

    /// Write a whole document
    pub async fn put(
        &self,
        collection: &str,
        doc_id: &str,
        payload: impl Into<Payload>,
    ) -> ClientResult<PutResult> {
        let payload = payload.into();
        self.exec_json(args::put_args(collection, doc_id, &payload), true).await
    }

    /// Apply patch operations to a document
    pub async fn patch(
        &self,
        collection: &str,
        doc_id: &str,
        ops: impl Into<Payload>,
    ) -> ClientResult<PutResult> {
        let ops = ops.into();
        self.exec_json(args::patch_args(collection, doc_id, &ops), true).await
    }

    /// Tombstone a document
    pub async fn delete(&self, collection: &str, doc_id: &str) -> ClientResult<PutResult> {
        self.exec_json(args::doc_args("delete", collection, doc_id), true).await
    }

    /// Transaction history of a document, in the order the engine reports it
    pub async fn log(&self, collection: &str, doc_id: &str) -> ClientResult<Vec<LogEntry>> {
        let output: LogOutput = self
            .exec_json(args::doc_args("log", collection, doc_id), false)
            .await?;
        Ok(output.entries.unwrap_or_default())
    }

    /// Restore a document to the state of an earlier transaction
    pub async fn revert(
        &self,
        collection: &str,
        doc_id: &str,
        target: &RevertTarget,
    ) -> ClientResult<PutResult> {
        self.exec_json(args::revert_args(collection, doc_id, target), true).await
    }

    /// Publish pending local commits to the remote; returns the engine's text output
    pub async fn push(&self) -> ClientResult<String> {
        self.exec_plain(vec!["push".to_string()], false).await
    }

    // ---- Index synchronization ----

    /// Resolve the index configuration for one call and build its arguments
    ///
    /// Fails with a configuration error before anything runs when the merged
    /// configuration is invalid for `command`.
    pub fn index_args(
        &self,
        command: IndexCommand,
        overrides: &IndexOverrides,
    ) -> ClientResult<Vec<String>> {
        self.index.merge(overrides).to_args(command)
    }

    /// Run one incremental sync pass of the local index
    pub async fn index_sync(&self, overrides: &IndexOverrides) -> ClientResult<IndexSyncResult> {
        let args = self.index_args(IndexCommand::Sync, overrides)?;
        self.exec_json(args, false).await
    }

    /// Start a continuous watch
    ///
    /// The returned handle owns the engine process; it keeps running until
    /// [`IndexWatch::terminate`] is called or the engine exits.
    pub fn start_index_watch(&self, options: &WatchOptions) -> ClientResult<IndexWatch> {
        let index_args = self.index_args(IndexCommand::Watch, &options.overrides)?;

        let mut full_args = args::base_args(&self.repo_path, options.json, false, self.auto_sync);
        full_args.extend(index_args);

        let invocation = self.invocation(full_args);
        let process = self.transport.spawn_attached(&invocation, options.stdio)?;
        Ok(IndexWatch::new(process, invocation.args))
    }

    // ---- Engine plumbing ----

    fn invocation(&self, args: Vec<String>) -> Invocation {
        Invocation {
            program: self.binary_path.clone(),
            args,
            cwd: self.repo_path.clone(),
            env: self.env.clone(),
            max_output_bytes: self.max_output_bytes,
        }
    }

    async fn exec_json<T: DeserializeOwned>(
        &self,
        args: Vec<String>,
        write: bool,
    ) -> ClientResult<T> {
        let mut full_args = args::base_args(&self.repo_path, true, write, self.auto_sync);
        full_args.extend(args);

        let output = self.transport.run(&self.invocation(full_args)).await?;
        serde_json::from_str(&output.stdout).map_err(|e| ClientError::decode(e, &output.stderr))
    }

    async fn exec_plain(&self, args: Vec<String>, write: bool) -> ClientResult<String> {
        let mut full_args = args::base_args(&self.repo_path, false, write, self.auto_sync);
        full_args.extend(args);

        let output = self.transport.run(&self.invocation(full_args)).await?;
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexMode;
    use crate::transport::fake::{FakeTransport, Reply};
    use crate::transport::{CapturedOutput, WatchStdio};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn client_with(transport: &Arc<FakeTransport>) -> LedgerClient {
        let config = ClientConfig::new("/data/repo").with_binary_path("/opt/ledgerdb");
        LedgerClient::with_transport(config, transport.clone()).unwrap()
    }

    #[test]
    fn test_new_requires_repo_path() {
        for path in ["", "   ", "\t\n"] {
            let err = LedgerClient::with_transport(
                ClientConfig::new(path),
                Arc::new(FakeTransport::new()),
            )
            .unwrap_err();
            assert!(err.is_config(), "path {:?} should be rejected", path);
        }
    }

    #[test]
    fn test_new_resolves_defaults() {
        let client = client_with(&Arc::new(FakeTransport::new()));

        assert_eq!(client.repo_path(), Path::new("/data/repo"));
        assert_eq!(client.binary_path(), Path::new("/opt/ledgerdb"));
        assert_eq!(client.index_db_path(), Path::new("/data/repo/index.db"));
        assert_eq!(client.index_defaults().batch_commits, 200);
    }

    #[test]
    fn test_session_index_overrides_apply_to_defaults() {
        let config = ClientConfig::new("/data/repo")
            .with_binary_path("/opt/ledgerdb")
            .with_index(IndexOverrides::new().db_path("/var/index.db").mode(IndexMode::History));
        let client = LedgerClient::with_transport(config, Arc::new(FakeTransport::new())).unwrap();

        assert_eq!(client.index_db_path(), Path::new("/var/index.db"));
        assert_eq!(client.index_defaults().mode, IndexMode::History);
    }

    #[tokio::test]
    async fn test_get_builds_read_invocation() {
        let transport = Arc::new(
            FakeTransport::new().with_reply(Reply::json(r#"{"doc":{"name":"Ann"},"tx_id":"t1"}"#)),
        );
        let client = client_with(&transport);

        let result = client.get("users", "u1").await.unwrap();
        assert_eq!(result.doc, json!({"name": "Ann"}));
        assert_eq!(result.tx_id.as_deref(), Some("t1"));

        let calls = transport.calls.lock().unwrap();
        let call = &calls[0];
        assert_eq!(call.program, PathBuf::from("/opt/ledgerdb"));
        assert_eq!(call.cwd, PathBuf::from("/data/repo"));
        assert_eq!(call.max_output_bytes, 10 * 1024 * 1024);
        assert_eq!(
            call.args,
            vec!["--repo", "/data/repo", "--json", "doc", "get", "users", "u1"]
        );
    }

    #[tokio::test]
    async fn test_writes_disable_sync_when_auto_sync_off() {
        let transport = Arc::new(
            FakeTransport::new()
                .with_reply(Reply::json(r#"{"commit":"c1","tx_hash":"h1","tx_id":"t1"}"#))
                .with_reply(Reply::json(r#"{"doc":null}"#)),
        );
        let config = ClientConfig::new("/data/repo")
            .with_binary_path("/opt/ledgerdb")
            .with_auto_sync(false);
        let client = LedgerClient::with_transport(config, transport.clone()).unwrap();

        client.delete("users", "u1").await.unwrap();
        assert_eq!(
            transport.last_args(),
            vec!["--repo", "/data/repo", "--json", "--sync=false", "doc", "delete", "users", "u1"]
        );

        // Reads never carry the sync flag
        client.get("users", "u1").await.unwrap();
        assert!(!transport.last_args().contains(&"--sync=false".to_string()));
    }

    #[tokio::test]
    async fn test_env_overlay_is_forwarded() {
        let transport = Arc::new(FakeTransport::new().with_reply(Reply::json(r#"{"doc":1}"#)));
        let config = ClientConfig::new("/data/repo")
            .with_binary_path("/opt/ledgerdb")
            .with_env("GIT_TERMINAL_PROMPT", "0");
        let client = LedgerClient::with_transport(config, transport.clone()).unwrap();

        client.get("c", "d").await.unwrap();
        let calls = transport.calls.lock().unwrap();
        assert_eq!(
            calls[0].env.get("GIT_TERMINAL_PROMPT").map(String::as_str),
            Some("0")
        );
    }

    #[tokio::test]
    async fn test_put_normalizes_payload() {
        let reply = r#"{"commit":"c7","tx_hash":"h1","tx_id":"t1"}"#;
        let transport = Arc::new(
            FakeTransport::new()
                .with_reply(Reply::json(reply))
                .with_reply(Reply::json(reply))
                .with_reply(Reply::json(reply)),
        );
        let client = client_with(&transport);

        let result = client.put("users", "u1", json!({"name": "Ann"})).await.unwrap();
        assert_eq!(
            result,
            PutResult {
                commit: "c7".to_string(),
                tx_hash: "h1".to_string(),
                tx_id: "t1".to_string(),
            }
        );
        assert_eq!(
            transport.last_args(),
            vec![
                "--repo",
                "/data/repo",
                "--json",
                "doc",
                "put",
                "users",
                "u1",
                "--payload",
                r#"{"name":"Ann"}"#,
            ]
        );

        client.put("users", "u1", r#"{"raw":true}"#).await.unwrap();
        assert_eq!(transport.last_args().last().unwrap(), r#"{"raw":true}"#);

        client.put("users", "u1", None::<Value>).await.unwrap();
        assert_eq!(transport.last_args().last().unwrap(), "null");
    }

    #[tokio::test]
    async fn test_patch_uses_ops_flag() {
        let transport = Arc::new(
            FakeTransport::new()
                .with_reply(Reply::json(r#"{"commit":"c2","tx_hash":"h2","tx_id":"t2"}"#)),
        );
        let client = client_with(&transport);

        let ops = json!([{"op": "replace", "path": "/name", "value": "Bo"}]);
        client.patch("users", "u1", ops.clone()).await.unwrap();

        let args = transport.last_args();
        assert_eq!(&args[3..8], &["doc", "patch", "users", "u1", "--ops"]);
        assert_eq!(serde_json::from_str::<Value>(&args[8]).unwrap(), ops);
    }

    #[tokio::test]
    async fn test_log_keeps_engine_order() {
        let transport = Arc::new(FakeTransport::new().with_reply(Reply::json(
            r#"{"entries":[
                {"tx_hash":"h1","tx_id":"t1","timestamp":1,"op":"put"},
                {"tx_hash":"h2","tx_id":"t2","parent_hash":"h1","timestamp":2,"op":"patch"}
            ]}"#,
        )));
        let client = client_with(&transport);

        let entries = client.log("users", "u1").await.unwrap();
        let hashes: Vec<_> = entries.iter().map(|e| e.tx_hash.as_str()).collect();
        assert_eq!(hashes, vec!["h1", "h2"]);
        assert_eq!(entries[1].parent_hash.as_deref(), Some("h1"));
    }

    #[tokio::test]
    async fn test_log_without_entries_is_empty() {
        let transport =
            Arc::new(FakeTransport::new().with_reply(Reply::json(r#"{"entries":null}"#)));
        let client = client_with(&transport);

        assert!(client.log("users", "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revert_args() {
        let transport = Arc::new(
            FakeTransport::new()
                .with_reply(Reply::json(r#"{"commit":"c4","tx_hash":"h4","tx_id":"t4"}"#)),
        );
        let client = client_with(&transport);

        client
            .revert("orders", "o9", &RevertTarget::tx_id("t3"))
            .await
            .unwrap();

        let args = transport.last_args();
        let joined = args.join(" ");
        assert!(joined.contains("doc revert orders o9 --tx-id t3"));
        let selectors = args
            .iter()
            .filter(|a| *a == "--tx-id" || *a == "--tx-hash")
            .count();
        assert_eq!(selectors, 1);
    }

    #[tokio::test]
    async fn test_push_returns_raw_text() {
        let transport = Arc::new(FakeTransport::new().with_reply(Reply::Ok {
            stdout: "Pushed 3 commits\n".to_string(),
            stderr: String::new(),
        }));
        let client = client_with(&transport);

        let out = client.push().await.unwrap();
        assert_eq!(out, "Pushed 3 commits\n");
        assert_eq!(transport.last_args(), vec!["--repo", "/data/repo", "push"]);
    }

    #[tokio::test]
    async fn test_decode_error_embeds_stderr() {
        let transport = Arc::new(FakeTransport::new().with_reply(Reply::Ok {
            stdout: "not json".to_string(),
            stderr: "  index locked  \n".to_string(),
        }));
        let client = client_with(&transport);

        let err = client.get("users", "u1").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
        let msg = err.to_string();
        assert!(msg.starts_with("ledgerdb json parse failed:"));
        assert!(msg.ends_with(": index locked"));
    }

    #[tokio::test]
    async fn test_execution_error_propagates() {
        let transport = Arc::new(FakeTransport::new().with_reply(Reply::Fail {
            code: 1,
            stderr: "document not found\n".to_string(),
        }));
        let client = client_with(&transport);

        let err = client.get("users", "missing").await.unwrap_err();
        assert!(matches!(err, ClientError::Execution { code: Some(1), .. }));
        assert_eq!(err.stderr(), Some("document not found"));
        // Reported once, never retried
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_index_sync_args_and_result() {
        let transport = Arc::new(FakeTransport::new().with_reply(Reply::json(
            r#"{"reset":false,"fetched":true,"commits":0,"txs_applied":0,"docs_upserted":0,"docs_deleted":0,"collections":0}"#,
        )));
        let client = client_with(&transport);

        let result = client
            .index_sync(&IndexOverrides::new().mode(IndexMode::State).batch_commits(50))
            .await
            .unwrap();

        assert_eq!(
            result,
            IndexSyncResult {
                reset: false,
                fetched: true,
                commits: 0,
                txs_applied: 0,
                docs_upserted: 0,
                docs_deleted: 0,
                collections: 0,
                last_commit: None,
            }
        );
        assert_eq!(
            transport.last_args(),
            vec![
                "--repo",
                "/data/repo",
                "--json",
                "index",
                "sync",
                "--db",
                "/data/repo/index.db",
                "--mode",
                "state",
                "--batch-commits",
                "50",
                "--fast",
            ]
        );
        // Overrides never leak into the session defaults
        assert_eq!(client.index_defaults().batch_commits, 200);
    }

    #[tokio::test]
    async fn test_index_sync_ignores_bad_watch_interval() {
        let transport = Arc::new(FakeTransport::new().with_reply(Reply::json(
            r#"{"reset":false,"fetched":true,"commits":0,"txs_applied":0,"docs_upserted":0,"docs_deleted":0,"collections":0}"#,
        )));
        let client = client_with(&transport);

        assert!(client
            .index_sync(&IndexOverrides::new().interval_ms(0))
            .await
            .is_ok());
    }

    #[test]
    fn test_watch_rejects_non_positive_interval_without_spawning() {
        let transport = Arc::new(FakeTransport::new());
        let client = client_with(&transport);

        for interval in [0, -1, -250] {
            let options =
                WatchOptions::new().overrides(IndexOverrides::new().interval_ms(interval));
            let err = client.start_index_watch(&options).unwrap_err();
            assert!(err.is_config());
        }
        assert_eq!(transport.spawn_count(), 0);

        // A bad session default is caught the same way
        let config = ClientConfig::new("/data/repo")
            .with_binary_path("/opt/ledgerdb")
            .with_index(IndexOverrides::new().interval_ms(0));
        let client = LedgerClient::with_transport(config, transport.clone()).unwrap();
        assert!(client.start_index_watch(&WatchOptions::new()).is_err());
        assert_eq!(transport.spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_start_index_watch() {
        let transport = Arc::new(FakeTransport::new());
        let config = ClientConfig::new("/data/repo")
            .with_binary_path("/opt/ledgerdb")
            .with_auto_sync(false);
        let client = LedgerClient::with_transport(config, transport.clone()).unwrap();

        let options = WatchOptions::new()
            .json(true)
            .overrides(IndexOverrides::new().interval_ms(500).jitter_ms(50));
        let mut watch = client.start_index_watch(&options).unwrap();

        assert_eq!(
            watch.args(),
            &[
                "--repo",
                "/data/repo",
                "--json",
                "index",
                "watch",
                "--db",
                "/data/repo/index.db",
                "--mode",
                "state",
                "--interval",
                "500ms",
                "--jitter",
                "50ms",
                "--only-changes",
                "--batch-commits",
                "200",
                "--fast",
            ]
        );
        {
            let spawns = transport.spawns.lock().unwrap();
            assert_eq!(spawns.len(), 1);
            assert_eq!(spawns[0].1, WatchStdio::Inherit);
        }

        // Each call gets a fresh process
        let mut second = client.start_index_watch(&WatchOptions::new()).unwrap();
        assert_eq!(transport.spawn_count(), 2);
        assert!(!second.args().contains(&"--json".to_string()));

        watch.terminate().await.unwrap();
        second.terminate().await.unwrap();
    }

    #[test]
    fn test_index_args_are_deterministic() {
        let client = client_with(&Arc::new(FakeTransport::new()));
        let overrides = IndexOverrides::new().mode(IndexMode::History).jitter_ms(10);

        let first = client.index_args(IndexCommand::Watch, &overrides).unwrap();
        for _ in 0..5 {
            assert_eq!(client.index_args(IndexCommand::Watch, &overrides).unwrap(), first);
        }
    }

    /// Minimal stand-in for the engine that keeps documents, logs and an
    /// index cursor in memory.
    #[derive(Default)]
    struct MemoryEngine {
        state: Mutex<MemoryState>,
    }

    #[derive(Default)]
    struct MemoryState {
        docs: HashMap<(String, String), Value>,
        logs: HashMap<(String, String), Vec<LogEntry>>,
        commits: Vec<String>,
        indexed: usize,
    }

    impl MemoryEngine {
        fn handle(&self, args: &[String]) -> Value {
            let mut state = self.state.lock().unwrap();
            let cmd: Vec<&str> = args
                .iter()
                .map(String::as_str)
                .skip_while(|a| *a != "doc" && *a != "index")
                .collect();

            match cmd.as_slice() {
                ["doc", "put", collection, id, "--payload", payload] => {
                    let key = (collection.to_string(), id.to_string());
                    let seq = state.commits.len() + 1;
                    let tx_hash = format!("h{}", seq);
                    let parent_hash = state
                        .logs
                        .get(&key)
                        .and_then(|l| l.last())
                        .map(|e| e.tx_hash.clone());
                    state.docs.insert(key.clone(), serde_json::from_str(payload).unwrap());
                    state.logs.entry(key).or_default().push(LogEntry {
                        tx_hash: tx_hash.clone(),
                        tx_id: format!("t{}", seq),
                        parent_hash,
                        timestamp: seq as i64,
                        op: "put".to_string(),
                    });
                    state.commits.push(format!("c{}", seq));
                    json!({
                        "commit": format!("c{}", seq),
                        "tx_hash": tx_hash,
                        "tx_id": format!("t{}", seq),
                    })
                }
                ["doc", "get", collection, id] => {
                    let key = (collection.to_string(), id.to_string());
                    json!({"doc": state.docs.get(&key).cloned().unwrap_or(Value::Null)})
                }
                ["doc", "log", collection, id] => {
                    let key = (collection.to_string(), id.to_string());
                    json!({"entries": state.logs.get(&key).cloned().unwrap_or_default()})
                }
                ["index", "sync", ..] => {
                    let pending = state.commits.len() - state.indexed;
                    state.indexed = state.commits.len();
                    let collections = usize::from(pending > 0);
                    json!({
                        "reset": false,
                        "fetched": true,
                        "commits": pending,
                        "txs_applied": pending,
                        "docs_upserted": pending,
                        "docs_deleted": 0,
                        "collections": collections,
                        "last_commit": state.commits.last(),
                    })
                }
                other => panic!("unexpected command: {:?}", other),
            }
        }
    }

    #[async_trait]
    impl Transport for MemoryEngine {
        async fn run(&self, invocation: &Invocation) -> ClientResult<CapturedOutput> {
            Ok(CapturedOutput {
                stdout: self.handle(&invocation.args).to_string(),
                stderr: String::new(),
            })
        }

        fn spawn_attached(
            &self,
            _invocation: &Invocation,
            _stdio: WatchStdio,
        ) -> ClientResult<Box<dyn crate::transport::AttachedProcess>> {
            Err(ClientError::Config("not supported".to_string()))
        }
    }

    fn memory_client() -> LedgerClient {
        LedgerClient::with_transport(
            ClientConfig::new("/data/repo").with_binary_path("ledgerdb"),
            Arc::new(MemoryEngine::default()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let client = memory_client();
        let payload = json!({"name": "Ann", "tags": ["a", "b"], "age": 41, "active": true});

        client.put("users", "u1", payload.clone()).await.unwrap();
        let got = client.get("users", "u1").await.unwrap();

        assert_eq!(got.doc, payload);
    }

    #[tokio::test]
    async fn test_put_shows_up_in_log() {
        let client = memory_client();

        let put = client.put("users", "u1", json!({"name": "Ann"})).await.unwrap();
        let log = client.log("users", "u1").await.unwrap();

        assert!(log.iter().any(|e| e.tx_hash == put.tx_hash));
    }

    #[tokio::test]
    async fn test_sync_twice_is_idempotent() {
        let client = memory_client();
        client.put("users", "u1", json!({"name": "Ann"})).await.unwrap();
        client.put("users", "u2", json!({"name": "Bo"})).await.unwrap();

        let first = client.index_sync(&IndexOverrides::new()).await.unwrap();
        let second = client.index_sync(&IndexOverrides::new()).await.unwrap();

        assert_eq!(first.txs_applied, 2);
        assert!(first.has_changes());
        assert_eq!(second.txs_applied, 0);
        assert_eq!(second.docs_upserted, 0);
        assert_eq!(second.docs_deleted, 0);
        assert!(!second.reset);
        assert!(!second.has_changes());
        assert_eq!(second.last_commit, first.last_commit);
    }
}
