//! External collaborator traits (§6): the blob store, relational metadata
//! DB, search index, and error reporter the core writes to but does not
//! own the implementation of.

use async_trait::async_trait;
use cellar_maven::pom::PomData;
use cellar_util::errors::CoreError;
use std::collections::HashSet;
use std::time::SystemTime;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn write_artifact(&self, key: &str, content: &[u8]) -> Result<(), CoreError>;
    async fn read_artifact(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarRecord {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub uploader: String,
}

#[async_trait]
pub trait MetadataDb: Send + Sync {
    async fn group_activenames(&self, group: &str) -> Result<HashSet<String>, CoreError>;
    async fn check_and_add_group(&self, user: &str, group: &str) -> Result<(), CoreError>;
    async fn find_jar(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> Result<Option<JarRecord>, CoreError>;
    async fn add_jar(&self, user: &str, pom: &PomData) -> Result<(), CoreError>;
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn index(&self, pom: &PomData, at: SystemTime) -> Result<(), CoreError>;
}

pub trait ErrorReporter: Send + Sync {
    fn report(&self, err: &CoreError, trace_id: &str);
}
