//! Shared state handed to every handler via [`axum::extract::State`].

use cellar_core::config::RepositoryConfig;
use cellar_deploy::finalize::FinalizeLocks;
use cellar_deploy::{BlobStore, ErrorReporter, MetadataDb, SearchIndex};
use cellar_validate::ShadowCheck;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RepositoryConfig>,
    pub db: Arc<dyn MetadataDb>,
    pub blob: Arc<dyn BlobStore>,
    pub search: Arc<dyn SearchIndex>,
    pub shadow_check: Arc<dyn ShadowCheck>,
    pub error_reporter: Arc<dyn ErrorReporter>,
    pub finalize_locks: Arc<FinalizeLocks>,
}
