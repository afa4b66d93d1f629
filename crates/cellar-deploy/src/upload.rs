//! Session manager + upload handler (§4.4).

use crate::collaborators::{BlobStore, MetadataDb};
use cellar_core::scope::{DeployScope, Identity};
use cellar_staging::session::Session;
use cellar_staging::sidecar::SidecarMetadata;
use cellar_staging::staging::{find_upload_dir, StagingDir};
use cellar_util::errors::CoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;

static SNAPSHOT_FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<artifact>.+)-(?P<base>[^-]+)-(?P<ts>\d{8}\.\d{6})-(?P<build>\d+)\.(?P<ext>.+)$")
        .unwrap()
});

/// Extract the `yyyyMMdd.HHmmss-build` timestamp-version token from a
/// snapshot filename (§9 glossary "Timestamp version"). Returns `None` if
/// `filename` does not match the expanded snapshot grammar.
pub fn extract_timestamp_version(filename: &str) -> Option<String> {
    let caps = SNAPSHOT_FILENAME_RE.captures(filename)?;
    Some(format!("{}-{}", &caps["ts"], &caps["build"]))
}

/// §4.4 "upload-request": authorize the account against `groupname`,
/// resolve (or create) the staging directory, run `continuation` against
/// it, and return the updated session with that directory moved to the
/// front.
pub async fn upload_request<F, Fut>(
    account: &str,
    groupname: &str,
    artifact: Option<&str>,
    version: Option<&str>,
    timestamp_version: Option<&str>,
    session: &Session,
    db: &dyn MetadataDb,
    continuation: F,
) -> Result<(StagingDir, Session), CoreError>
where
    F: FnOnce(StagingDir) -> Fut,
    Fut: Future<Output = Result<(), CoreError>>,
{
    let active = db.group_activenames(groupname).await?;
    if !active.is_empty() && !active.contains(account) {
        return Err(CoreError::DeployForbidden {
            message: format!("{account} is not a member of group {groupname}"),
        });
    }

    let query = SidecarMetadata {
        group: Some(groupname.to_string()),
        group_path: None,
        name: artifact.map(|s| s.to_string()),
        version: version.map(|s| s.to_string()),
        timestamp_version: timestamp_version.map(|s| s.to_string()),
    };
    let dir = find_upload_dir(&query, session)?;
    continuation(dir.clone()).await?;

    let mut new_session = session.clone();
    new_session.touch(dir.path());
    Ok((dir, new_session))
}

/// §4.4 "handle-versioned-upload".
#[allow(clippy::too_many_arguments)]
pub async fn handle_versioned_upload(
    body: &[u8],
    session: &Session,
    group: &str,
    artifact: &str,
    version: &str,
    filename: &str,
    identity: &Identity,
    db: &dyn MetadataDb,
    blob: &dyn BlobStore,
) -> Result<(StagingDir, Session), CoreError> {
    let group_path = group.replace('.', "/");
    let timestamp_version = if version.ends_with("-SNAPSHOT") {
        extract_timestamp_version(filename)
    } else {
        None
    };

    let scope = match identity {
        Identity::Token { scope, .. } => scope.clone(),
        Identity::Cookie { .. } => DeployScope::Unscoped,
    };

    let body_owned = body.to_vec();
    let group_owned = group.to_string();
    let group_path_owned = group_path.clone();
    let artifact_owned = artifact.to_string();
    let version_owned = version.to_string();
    let filename_owned = filename.to_string();
    let timestamp_version_owned = timestamp_version.clone();

    upload_request(
        identity.account(),
        group,
        Some(artifact),
        Some(version),
        timestamp_version.as_deref(),
        session,
        db,
        move |dir| async move {
            if !scope.permits(&group_owned, &artifact_owned) {
                return Err(CoreError::DeployForbidden {
                    message: format!(
                        "token scope does not permit {group_owned}:{artifact_owned}"
                    ),
                });
            }

            if dir.is_finalized() {
                // Re-finalization vs. tail files (§9): stream straight to
                // the blob store instead of re-staging.
                let key = format!(
                    "{group_path_owned}/{artifact_owned}/{version_owned}/{filename_owned}"
                );
                return blob.write_artifact(&key, &body_owned).await;
            }

            dir.write_metadata(SidecarMetadata {
                group: Some(group_owned.clone()),
                group_path: Some(group_path_owned.clone()),
                name: Some(artifact_owned.clone()),
                version: Some(version_owned.clone()),
                timestamp_version: timestamp_version_owned.clone(),
            })?;

            let dest = dir
                .path()
                .join(&group_path_owned)
                .join(&artifact_owned)
                .join(&version_owned)
                .join(&filename_owned);
            cellar_util::fs::atomic_write(&dest, &body_owned).map_err(CoreError::from)
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FsBlobStore, JsonLedgerDb};

    #[test]
    fn extracts_timestamp_version_from_snapshot_filename() {
        let tv = extract_timestamp_version("lib-1.0-20240615.143022-5.jar").unwrap();
        assert_eq!(tv, "20240615.143022-5");
    }

    #[test]
    fn non_snapshot_filename_has_no_timestamp_version() {
        assert!(extract_timestamp_version("lib-1.0.jar").is_none());
    }

    #[tokio::test]
    async fn unknown_group_is_claimable() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonLedgerDb::open(dir.path().join("ledger.json")).await.unwrap();
        let blob = FsBlobStore::new(dir.path().join("blobs"));
        let session = Session::default();
        let identity = Identity::Token {
            account: "alice".into(),
            scope: DeployScope::Unscoped,
        };

        let (staged, new_session) = handle_versioned_upload(
            b"jar-bytes",
            &session,
            "com.example",
            "lib",
            "1.0",
            "lib-1.0.jar",
            &identity,
            &db,
            &blob,
        )
        .await
        .unwrap();

        assert!(staged.path().join("com/example/lib/1.0/lib-1.0.jar").is_file());
        assert_eq!(new_session.upload_dirs[0], staged.path());
    }

    #[tokio::test]
    async fn member_rejected_if_not_in_group() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonLedgerDb::open(dir.path().join("ledger.json")).await.unwrap();
        db.check_and_add_group("bob", "com.example").await.unwrap();
        let blob = FsBlobStore::new(dir.path().join("blobs"));
        let session = Session::default();
        let identity = Identity::Token {
            account: "mallory".into(),
            scope: DeployScope::Unscoped,
        };

        let result = handle_versioned_upload(
            b"jar-bytes",
            &session,
            "com.example",
            "lib",
            "1.0",
            "lib-1.0.jar",
            &identity,
            &db,
            &blob,
        )
        .await;
        assert_eq!(result.unwrap_err().tag(), "deploy-forbidden");
    }

    #[tokio::test]
    async fn wrong_token_scope_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonLedgerDb::open(dir.path().join("ledger.json")).await.unwrap();
        let blob = FsBlobStore::new(dir.path().join("blobs"));
        let session = Session::default();
        let identity = Identity::Token {
            account: "alice".into(),
            scope: DeployScope::Group {
                group: "com.other".into(),
            },
        };

        let result = handle_versioned_upload(
            b"jar-bytes",
            &session,
            "com.example",
            "lib",
            "1.0",
            "lib-1.0.jar",
            &identity,
            &db,
            &blob,
        )
        .await;
        assert_eq!(result.unwrap_err().tag(), "deploy-forbidden");
    }
}
