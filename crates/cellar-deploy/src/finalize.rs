//! Deploy finalizer (§4.6): the one-shot commit of a staging directory to
//! durable storage, the metadata DB, and the search index.

use crate::collaborators::{BlobStore, MetadataDb, SearchIndex};
use cellar_core::coordinate::Coordinate;
use cellar_maven::metadata::{parse_metadata, regenerate_checksums};
use cellar_maven::pom::{parse_pom, PomData};
use cellar_staging::staging::StagingDir;
use cellar_util::errors::CoreError;
use cellar_util::hash::{checksum, checksum_bytes, Algo};
use cellar_validate::{validate_deploy, JarLookup, ShadowCheck};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-staging-directory finalization locks (§9, Open Question 2: "a
/// stricter implementation should serialize finalization per staging
/// directory with a lock"). One entry per directory currently or
/// previously being finalized; entries are never removed, which is
/// acceptable because staging directories themselves are not reclaimed by
/// the core (§5).
#[derive(Default)]
pub struct FinalizeLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FinalizeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, dir: &Path) -> OwnedMutexGuard<()> {
        let mut locks = self.locks.lock().await;
        let entry = locks
            .entry(dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        drop(locks);
        entry.lock_owned().await
    }
}

/// §4.6 trigger condition: finalize when a new `maven-metadata.xml` body
/// differs (by sha1) from whatever is currently on disk, including the
/// case where nothing is on disk yet.
pub fn should_trigger_finalization(
    metadata_path: &Path,
    new_content: &[u8],
) -> Result<bool, CoreError> {
    if !metadata_path.is_file() {
        return Ok(true);
    }
    let old_sha1 = checksum(metadata_path, Algo::Sha1)?;
    let new_sha1 = checksum_bytes(new_content, Algo::Sha1);
    Ok(old_sha1 != new_sha1)
}

struct DbJarLookup<'a> {
    db: &'a dyn MetadataDb,
}

#[async_trait::async_trait]
impl JarLookup for DbJarLookup<'_> {
    async fn find_jar(&self, group: &str, artifact: &str, version: &str) -> Result<bool, CoreError> {
        Ok(self.db.find_jar(group, artifact, version).await?.is_some())
    }
}

fn find_pom(dir: &Path) -> Result<PathBuf, CoreError> {
    fn walk(dir: &Path) -> Result<Option<PathBuf>, CoreError> {
        for entry in std::fs::read_dir(dir).map_err(CoreError::Io)? {
            let entry = entry.map_err(CoreError::Io)?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(found) = walk(&path)? {
                    return Ok(Some(found));
                }
            } else if path.extension().and_then(|e| e.to_str()) == Some("pom") {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
    walk(dir)?.ok_or_else(|| CoreError::MissingPomFile {
        message: format!("no *.pom found under {}", dir.display()),
    })
}

fn collect_regular_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CoreError> {
    for entry in std::fs::read_dir(dir).map_err(CoreError::Io)? {
        let entry = entry.map_err(CoreError::Io)?;
        let path = entry.path();
        if path.is_dir() {
            collect_regular_files(&path, out)?;
        } else {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name != "_metadata.toml" && name != ".finalized" {
                out.push(path);
            }
        }
    }
    Ok(())
}

/// Run the §4.6 finalization steps against `dir`. `group_path` is the
/// slash-joined group used to locate `maven-metadata.xml` on disk;
/// `mtime` is passed in rather than read from the filesystem clock so
/// callers control it explicitly.
pub async fn finalize_deploy(
    dir: &StagingDir,
    account: &str,
    group: &str,
    group_path: &str,
    name: &str,
    db: &dyn MetadataDb,
    blob: &dyn BlobStore,
    search: &dyn SearchIndex,
    shadow_check: &dyn ShadowCheck,
    mtime: SystemTime,
) -> Result<(), CoreError> {
    match finalize_deploy_inner(dir, account, group, group_path, name, db, blob, search, shadow_check, mtime).await
    {
        Ok(()) => Ok(()),
        // §9 Open Question 1: a validation failure must surface with its
        // own tag, not be swallowed into a generic rejection.
        Err(e) if e.is_validation() => Err(e),
        Err(e) => Err(CoreError::DeployForbidden {
            message: e.to_string(),
        }),
    }
}

#[allow(clippy::too_many_arguments)]
async fn finalize_deploy_inner(
    dir: &StagingDir,
    account: &str,
    group: &str,
    group_path: &str,
    name: &str,
    db: &dyn MetadataDb,
    blob: &dyn BlobStore,
    search: &dyn SearchIndex,
    shadow_check: &dyn ShadowCheck,
    mtime: SystemTime,
) -> Result<(), CoreError> {
    // 1. Locate a *.pom under the directory.
    let pom_path = find_pom(dir.path())?;

    // 2. Parse the POM.
    let pom_xml = std::fs::read_to_string(&pom_path).map_err(CoreError::Io)?;
    let pom: PomData = parse_pom(&pom_xml)?;

    // 3. Parse <dir>/<group-path>/<name>/maven-metadata.xml.
    let metadata_path = dir.path().join(group_path).join(name).join("maven-metadata.xml");
    let metadata_xml = std::fs::read_to_string(&metadata_path).map_err(CoreError::Io)?;
    parse_metadata(&metadata_xml)?;

    // 4. Regenerate .md5/.sha1 sidecars for the metadata file (client-sent
    // ones were ignored on write).
    regenerate_checksums(&metadata_path)?;

    // 5. Full validation.
    let version = pom.version.clone().unwrap_or_default();
    let coord = Coordinate::parse(group, name, &version)?;
    let jar_lookup = DbJarLookup { db };
    validate_deploy(dir.path(), &pom, &coord, &jar_lookup, shadow_check).await?;

    // 6. Claim-on-first-use group ownership.
    db.check_and_add_group(account, group).await?;

    // 7. Publish every staged file to the blob store.
    let mut files = Vec::new();
    collect_regular_files(dir.path(), &mut files)?;
    for file in &files {
        let key = cellar_util::fs::subpath(dir.path(), file);
        let content = std::fs::read(file).map_err(CoreError::Io)?;
        blob.write_artifact(&key, &content).await?;
    }

    // 8. Record the jar.
    db.add_jar(account, &pom).await?;

    // 9. Best-effort search indexing.
    if let Err(e) = search.index(&pom, mtime).await {
        tracing::warn!(error = %e, "search indexing failed, continuing");
    }

    // 10. Mark finalized.
    dir.mark_finalized()?;

    Ok(())
}
