//! Concrete single-node implementations of the collaborator traits in
//! [`crate::collaborators`]. Suitable for a self-hosted deployment without a
//! separate blob store or SQL server, and for integration tests.

use crate::collaborators::{BlobStore, ErrorReporter, JarRecord, MetadataDb, SearchIndex};
use async_trait::async_trait;
use cellar_maven::pom::PomData;
use cellar_util::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::Mutex;

/// Writes artifacts under a root directory on local disk.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write_artifact(&self, key: &str, content: &[u8]) -> Result<(), CoreError> {
        let dest = self.root.join(key);
        cellar_util::fs::atomic_write(&dest, content)
    }

    async fn read_artifact(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Io(e)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Ledger {
    groups: std::collections::BTreeMap<String, HashSet<String>>,
    jars: Vec<JarEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JarEntry {
    group: String,
    artifact: String,
    version: String,
    uploader: String,
}

/// A `MetadataDb` backed by a JSON ledger file guarded by a mutex.
///
/// This is not a SQL engine — there is no query planner or transaction log —
/// but it satisfies the uniqueness and lookup semantics the core relies on
/// for a single-process deployment and for tests.
pub struct JsonLedgerDb {
    path: PathBuf,
    ledger: Mutex<Ledger>,
}

impl JsonLedgerDb {
    pub async fn open(path: PathBuf) -> Result<Self, CoreError> {
        let ledger = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| CoreError::Generic {
                message: format!("corrupt ledger {}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ledger::default(),
            Err(e) => return Err(CoreError::Io(e)),
        };
        Ok(Self {
            path,
            ledger: Mutex::new(ledger),
        })
    }

    async fn persist(&self, ledger: &Ledger) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(ledger).map_err(|e| CoreError::Generic {
            message: format!("failed to serialize ledger: {e}"),
        })?;
        cellar_util::fs::atomic_write(&self.path, content.as_bytes())
    }
}

#[async_trait]
impl MetadataDb for JsonLedgerDb {
    async fn group_activenames(&self, group: &str) -> Result<HashSet<String>, CoreError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.groups.get(group).cloned().unwrap_or_default())
    }

    async fn check_and_add_group(&self, user: &str, group: &str) -> Result<(), CoreError> {
        let mut ledger = self.ledger.lock().await;
        ledger
            .groups
            .entry(group.to_string())
            .or_default()
            .insert(user.to_string());
        let snapshot = ledger.clone();
        drop(ledger);
        self.persist(&snapshot).await
    }

    async fn find_jar(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> Result<Option<JarRecord>, CoreError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .jars
            .iter()
            .find(|j| j.group == group && j.artifact == artifact && j.version == version)
            .map(|j| JarRecord {
                group: j.group.clone(),
                artifact: j.artifact.clone(),
                version: j.version.clone(),
                uploader: j.uploader.clone(),
            }))
    }

    async fn add_jar(&self, user: &str, pom: &PomData) -> Result<(), CoreError> {
        let mut ledger = self.ledger.lock().await;
        ledger.jars.push(JarEntry {
            group: pom.group_id.clone().unwrap_or_default(),
            artifact: pom.artifact_id.clone().unwrap_or_default(),
            version: pom.version.clone().unwrap_or_default(),
            uploader: user.to_string(),
        });
        let snapshot = ledger.clone();
        drop(ledger);
        self.persist(&snapshot).await
    }
}

/// Logs and succeeds; a real search backend is out of scope for this core.
pub struct NullSearchIndex;

#[async_trait]
impl SearchIndex for NullSearchIndex {
    async fn index(&self, pom: &PomData, at: SystemTime) -> Result<(), CoreError> {
        tracing::debug!(
            group = ?pom.group_id,
            artifact = ?pom.artifact_id,
            version = ?pom.version,
            ?at,
            "search index update (no-op backend)"
        );
        Ok(())
    }
}

pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, err: &CoreError, trace_id: &str) {
        tracing::error!(trace_id, tag = err.tag(), "{err}");
    }
}
