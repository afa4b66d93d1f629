//! `cellar serve`: boots the HTTP deploy ingestion server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cellar_core::config::{dirs_path, RepositoryConfig};
use cellar_deploy::finalize::FinalizeLocks;
use cellar_deploy::fakes::{FsBlobStore, JsonLedgerDb, NullSearchIndex, TracingErrorReporter};
use cellar_server::AppState;
use cellar_validate::RealShadowCheck;
use miette::{IntoDiagnostic, Result};

fn default_config_path() -> PathBuf {
    dirs_path().join("config.toml")
}

pub async fn exec(config_path: Option<&Path>, listen_override: Option<&str>, verbose: bool) -> Result<()> {
    let config_path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let config = RepositoryConfig::load(&config_path).into_diagnostic()?;
    let listen_addr = listen_override.unwrap_or(&config.listen_addr).to_string();

    if verbose {
        tracing::debug!(
            config_path = %config_path.display(),
            storage_root = %config.storage_root.display(),
            shadow_allow_list_len = config.central_shadow_allow_list.len(),
            "resolved repository configuration"
        );
    }

    let db = JsonLedgerDb::open(config.storage_root.join("ledger.json"))
        .await
        .into_diagnostic()?;
    let blob = FsBlobStore::new(config.storage_root.join("blobs"));
    let shadow_check = RealShadowCheck {
        probe: cellar_maven::central::CentralProbe::new(),
        allow_list: config.central_shadow_allow_list.clone(),
    };

    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(db),
        blob: Arc::new(blob),
        search: Arc::new(NullSearchIndex),
        shadow_check: Arc::new(shadow_check),
        error_reporter: Arc::new(TracingErrorReporter),
        finalize_locks: Arc::new(FinalizeLocks::new()),
    };

    tracing::info!(listen_addr, "starting cellar deploy ingestion server");
    let router = cellar_server::build_router(state);
    let listener = tokio::net::TcpListener::bind(&listen_addr).await.into_diagnostic()?;
    axum::serve(listener, router).await.into_diagnostic()?;
    Ok(())
}
