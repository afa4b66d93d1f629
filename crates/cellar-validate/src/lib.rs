//! The deploy validator (§4.3): pure functions over a staging directory plus
//! a parsed POM, enforcing the rules that gate finalization.

use async_trait::async_trait;
use cellar_core::coordinate::Coordinate;
use cellar_maven::central::CentralProbe;
use cellar_maven::pom::PomData;
use cellar_util::errors::CoreError;
use cellar_util::hash::{valid_checksum_file, Algo};
use std::path::Path;

/// The subset of the metadata DB the validator needs: whether a jar already
/// exists for a non-snapshot coordinate (§4.3 step 3).
#[async_trait]
pub trait JarLookup: Send + Sync {
    async fn find_jar(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> Result<bool, CoreError>;
}

/// Decides whether Central shadow-checking applies to a coordinate, and
/// performs the probe when it does.
#[async_trait]
pub trait ShadowCheck: Send + Sync {
    fn is_allow_listed(&self, group: &str, artifact: &str) -> bool;
    async fn exists_on_central(&self, group: &str, artifact: &str) -> Result<bool, CoreError>;
}

/// A [`ShadowCheck`] backed by a real [`CentralProbe`] and an explicit
/// allow-list.
pub struct RealShadowCheck {
    pub probe: CentralProbe,
    pub allow_list: std::collections::BTreeSet<(String, String)>,
}

#[async_trait]
impl ShadowCheck for RealShadowCheck {
    fn is_allow_listed(&self, group: &str, artifact: &str) -> bool {
        self.allow_list
            .contains(&(group.to_string(), artifact.to_string()))
    }

    async fn exists_on_central(&self, group: &str, artifact: &str) -> Result<bool, CoreError> {
        self.probe.exists(group, artifact).await
    }
}

/// Run every check in §4.3, in order, failing on the first violation.
pub async fn validate_deploy(
    dir: &Path,
    pom: &PomData,
    coord: &Coordinate,
    jar_lookup: &dyn JarLookup,
    shadow_check: &dyn ShadowCheck,
) -> Result<(), CoreError> {
    // 1. GAV regex — already enforced by `Coordinate::parse` at construction.

    // 2. POM/coordinate agreement.
    if pom.group_id.as_deref() != Some(coord.group.as_str())
        || pom.artifact_id.as_deref() != Some(coord.artifact.as_str())
        || pom.version.as_deref() != Some(coord.version.as_str())
    {
        return Err(CoreError::PomEntryMismatch {
            message: format!(
                "POM declares {:?}:{:?}:{:?}, path says {}:{}:{}",
                pom.group_id, pom.artifact_id, pom.version, coord.group, coord.artifact, coord.version
            ),
        });
    }

    // 3. Non-snapshot re-deploy.
    if !coord.is_snapshot()
        && jar_lookup
            .find_jar(&coord.group, &coord.artifact, &coord.version)
            .await?
    {
        return Err(CoreError::NonSnapshotRedeploy {
            message: format!(
                "{}:{}:{} is already published",
                coord.group, coord.artifact, coord.version
            ),
        });
    }

    // 4. Central-shadow.
    if !shadow_check.is_allow_listed(&coord.group, &coord.artifact)
        && shadow_check
            .exists_on_central(&coord.group, &coord.artifact)
            .await?
    {
        return Err(CoreError::CentralShadow {
            message: format!("{}:{} already exists on Maven Central", coord.group, coord.artifact),
        });
    }

    let files = staged_files(dir)?;

    // 5. Jar presence.
    if pom.effective_packaging() == "jar" && !files.iter().any(|f| has_ext(f, "jar")) {
        return Err(CoreError::MissingJarFile {
            message: format!("packaging=jar but no *.jar staged for {}", coord.artifact),
        });
    }

    // 6. Checksum totality.
    for file in &files {
        if is_sidecar_or_metadata_sum(file) {
            continue;
        }
        let has_md5 = cellar_util::hash::checksum_file_path(file, Algo::Md5).is_file();
        let has_sha1 = cellar_util::hash::checksum_file_path(file, Algo::Sha1).is_file();
        if !has_md5 && !has_sha1 {
            return Err(CoreError::FileMissingChecksum {
                message: file_name(file),
            });
        }
        if (has_md5 && !valid_checksum_file(file, Algo::Md5))
            || (has_sha1 && !valid_checksum_file(file, Algo::Sha1))
        {
            return Err(CoreError::FileInvalidChecksum {
                message: file_name(file),
            });
        }
    }

    // 7. Signature totality.
    let any_signed = files
        .iter()
        .any(|f| has_ext(f, "asc") && !is_maven_metadata(f));
    if any_signed {
        for file in &files {
            if has_ext(file, "asc") || is_sidecar_or_metadata_sum(file) || is_maven_metadata(file) {
                continue;
            }
            let sig = append_ext(file, "asc");
            if !sig.is_file() {
                return Err(CoreError::FileMissingSignature {
                    message: file_name(file),
                });
            }
        }
    }

    Ok(())
}

fn staged_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, CoreError> {
    let mut out = Vec::new();
    collect_files(dir, &mut out)?;
    Ok(out)
}

fn collect_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<(), CoreError> {
    for entry in std::fs::read_dir(dir).map_err(CoreError::Io)? {
        let entry = entry.map_err(CoreError::Io)?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.file_name().and_then(|n| n.to_str()) != Some("_metadata.toml")
            && path.file_name().and_then(|n| n.to_str()) != Some(".finalized")
        {
            out.push(path);
        }
    }
    Ok(())
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

fn is_maven_metadata(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some("maven-metadata.xml")
}

fn is_sidecar_or_metadata_sum(path: &Path) -> bool {
    has_ext(path, "md5") || has_ext(path, "sha1") || has_ext(path, "asc")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn append_ext(path: &Path, ext: &str) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellar_util::hash::{checksum, checksum_file_path};

    struct NoJar;
    #[async_trait]
    impl JarLookup for NoJar {
        async fn find_jar(&self, _g: &str, _a: &str, _v: &str) -> Result<bool, CoreError> {
            Ok(false)
        }
    }

    struct HasJar;
    #[async_trait]
    impl JarLookup for HasJar {
        async fn find_jar(&self, _g: &str, _a: &str, _v: &str) -> Result<bool, CoreError> {
            Ok(true)
        }
    }

    struct NoShadow;
    #[async_trait]
    impl ShadowCheck for NoShadow {
        fn is_allow_listed(&self, _g: &str, _a: &str) -> bool {
            true
        }
        async fn exists_on_central(&self, _g: &str, _a: &str) -> Result<bool, CoreError> {
            Ok(false)
        }
    }

    struct OnCentral;
    #[async_trait]
    impl ShadowCheck for OnCentral {
        fn is_allow_listed(&self, _g: &str, _a: &str) -> bool {
            false
        }
        async fn exists_on_central(&self, _g: &str, _a: &str) -> Result<bool, CoreError> {
            Ok(true)
        }
    }

    fn stage_jar_with_checksums(dir: &Path) {
        let jar = dir.join("lib-1.0.jar");
        std::fs::write(&jar, b"jar-bytes").unwrap();
        let sha1 = checksum(&jar, Algo::Sha1).unwrap();
        std::fs::write(checksum_file_path(&jar, Algo::Sha1), sha1).unwrap();
    }

    fn coord() -> Coordinate {
        Coordinate::parse("com.example", "lib", "1.0").unwrap()
    }

    fn matching_pom() -> PomData {
        PomData {
            group_id: Some("com.example".into()),
            artifact_id: Some("lib".into()),
            version: Some("1.0".into()),
            packaging: Some("jar".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn happy_path_passes() {
        let dir = tempfile::tempdir().unwrap();
        stage_jar_with_checksums(dir.path());
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &NoJar, &NoShadow).await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn pom_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        stage_jar_with_checksums(dir.path());
        let mut pom = matching_pom();
        pom.artifact_id = Some("other".into());
        let result = validate_deploy(dir.path(), &pom, &coord(), &NoJar, &NoShadow).await;
        assert_eq!(result.unwrap_err().tag(), "pom-entry-mismatch");
    }

    #[tokio::test]
    async fn non_snapshot_redeploy_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        stage_jar_with_checksums(dir.path());
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &HasJar, &NoShadow).await;
        assert_eq!(result.unwrap_err().tag(), "non-snapshot-redeploy");
    }

    #[tokio::test]
    async fn snapshot_bypasses_redeploy_check() {
        let dir = tempfile::tempdir().unwrap();
        stage_jar_with_checksums(dir.path());
        let coord = Coordinate::parse("com.example", "lib", "1.0-SNAPSHOT").unwrap();
        let mut pom = matching_pom();
        pom.version = Some("1.0-SNAPSHOT".into());
        let result = validate_deploy(dir.path(), &pom, &coord, &HasJar, &NoShadow).await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn central_shadow_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        stage_jar_with_checksums(dir.path());
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &NoJar, &OnCentral).await;
        assert_eq!(result.unwrap_err().tag(), "central-shadow");
    }

    #[tokio::test]
    async fn missing_jar_for_jar_packaging_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        // No jar staged at all.
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &NoJar, &NoShadow).await;
        assert_eq!(result.unwrap_err().tag(), "missing-jar-file");
    }

    #[tokio::test]
    async fn missing_checksum_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib-1.0.jar"), b"jar-bytes").unwrap();
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &NoJar, &NoShadow).await;
        assert_eq!(result.unwrap_err().tag(), "file-missing-checksum");
    }

    #[tokio::test]
    async fn invalid_checksum_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("lib-1.0.jar");
        std::fs::write(&jar, b"jar-bytes").unwrap();
        std::fs::write(checksum_file_path(&jar, Algo::Sha1), "deadbeef").unwrap();
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &NoJar, &NoShadow).await;
        assert_eq!(result.unwrap_err().tag(), "file-invalid-checksum");
    }

    #[tokio::test]
    async fn partial_signature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        stage_jar_with_checksums(dir.path());
        std::fs::write(dir.path().join("lib-1.0.jar.asc"), b"sig").unwrap();
        let pom_path = dir.path().join("lib-1.0.pom");
        std::fs::write(&pom_path, b"<project/>").unwrap();
        let sha1 = checksum(&pom_path, Algo::Sha1).unwrap();
        std::fs::write(checksum_file_path(&pom_path, Algo::Sha1), sha1).unwrap();
        // pom.asc intentionally missing
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &NoJar, &NoShadow).await;
        assert_eq!(result.unwrap_err().tag(), "file-missing-signature");
    }

    #[tokio::test]
    async fn complete_signature_set_passes() {
        let dir = tempfile::tempdir().unwrap();
        stage_jar_with_checksums(dir.path());
        std::fs::write(dir.path().join("lib-1.0.jar.asc"), b"sig").unwrap();
        let pom_path = dir.path().join("lib-1.0.pom");
        std::fs::write(&pom_path, b"<project/>").unwrap();
        let sha1 = checksum(&pom_path, Algo::Sha1).unwrap();
        std::fs::write(checksum_file_path(&pom_path, Algo::Sha1), sha1).unwrap();
        std::fs::write(dir.path().join("lib-1.0.pom.asc"), b"sig").unwrap();
        let result = validate_deploy(dir.path(), &matching_pom(), &coord(), &NoJar, &NoShadow).await;
        assert!(result.is_ok(), "{result:?}");
    }
}
