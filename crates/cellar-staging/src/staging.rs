use crate::sidecar::SidecarMetadata;
use cellar_util::errors::CoreError;
use std::path::{Path, PathBuf};

const FINALIZED_SENTINEL: &str = ".finalized";

/// A staging directory: a server-local temp directory holding one deploy
/// transaction's files until finalization (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDir(PathBuf);

impl StagingDir {
    pub fn at(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn metadata(&self) -> Result<SidecarMetadata, CoreError> {
        SidecarMetadata::load(&self.0)
    }

    /// §4.2 "write-metadata": merge `fields` onto the existing sidecar.
    pub fn write_metadata(&self, fields: SidecarMetadata) -> Result<(), CoreError> {
        let merged = self.metadata()?.merge(fields);
        merged.write(&self.0)
    }

    pub fn is_finalized(&self) -> bool {
        self.0.join(FINALIZED_SENTINEL).is_file()
    }

    pub fn mark_finalized(&self) -> Result<(), CoreError> {
        cellar_util::fs::atomic_write(&self.0.join(FINALIZED_SENTINEL), b"")
    }
}

/// Scan `session`'s staging directories in MRU order for one whose sidecar
/// matches `query` on every field the query itself specifies (§4.2). On no
/// match, creates a fresh directory under the OS temp root named
/// `upload-<uuid>`.
pub fn find_upload_dir(
    query: &SidecarMetadata,
    session: &crate::session::Session,
) -> Result<StagingDir, CoreError> {
    for path in &session.upload_dirs {
        let dir = StagingDir::at(path.clone());
        if dir.metadata()?.matches(query) {
            return Ok(dir);
        }
    }

    let fresh = std::env::temp_dir().join(format!("upload-{}", uuid::Uuid::new_v4()));
    cellar_util::fs::ensure_dir(&fresh).map_err(CoreError::Io)?;
    Ok(StagingDir::at(fresh))
}
