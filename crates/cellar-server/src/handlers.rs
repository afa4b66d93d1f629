//! PUT/GET request handlers (§4.7).

use crate::error::AppError;
use crate::routes::{parse_put_path, ParsedPut};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use cellar_core::scope::Identity;
use cellar_deploy::finalize::{finalize_deploy, should_trigger_finalization};
use cellar_deploy::{handle_versioned_upload, upload_request};
use cellar_staging::session::Session;
use cellar_staging::sidecar::SidecarMetadata;
use cellar_util::errors::CoreError;
use std::time::SystemTime;

const SESSION_COOKIE: &str = "cellar-session";

pub async fn put_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Option<Identity>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match put_inner(&state, identity, &path, &headers, body).await {
        Ok(response) => response,
        Err(e) => AppError::from_core(e, &state).into_response(),
    }
}

async fn put_inner(
    state: &AppState,
    identity: Option<Identity>,
    path: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, CoreError> {
    let parsed = parse_put_path(path);
    if parsed == ParsedPut::BadRequest {
        return Ok((StatusCode::BAD_REQUEST, "unrecognized deploy path").into_response());
    }
    if let ParsedPut::MetadataSidecar = parsed {
        // Client-sent metadata sums are ignored; the server regenerates
        // them on finalize (§4.6 step 4).
        return Ok(StatusCode::CREATED.into_response());
    }

    let identity = identity.ok_or_else(|| CoreError::DeployForbidden {
        message: "a deploy token is required".into(),
    })?;

    let session = Session::from_cookie(session_cookie(headers).as_deref());

    let new_session = match parsed {
        ParsedPut::VersionedUpload {
            group,
            artifact,
            version,
            filename,
        } => {
            // Path segments are slash-joined (§4.7); the collaborators
            // below deal in the dotted Maven groupId.
            let dotted_group = group.replace('/', ".");
            let (_, new_session) = handle_versioned_upload(
                &body,
                &session,
                &dotted_group,
                &artifact,
                &version,
                &filename,
                &identity,
                state.db.as_ref(),
                state.blob.as_ref(),
            )
            .await?;
            new_session
        }
        ParsedPut::NonVersionedMetadataWrite { group, artifact } => {
            handle_non_versioned_metadata(state, &identity, &group, &artifact, &session, &body).await?
        }
        ParsedPut::MetadataSidecar | ParsedPut::BadRequest => unreachable!(),
    };

    let cookie = new_session.to_cookie()?;
    let mut response = StatusCode::CREATED.into_response();
    if let Ok(value) = header::HeaderValue::from_str(&format!("{SESSION_COOKIE}={cookie}; Path=/")) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

async fn handle_non_versioned_metadata(
    state: &AppState,
    identity: &Identity,
    group_path: &str,
    artifact: &str,
    session: &Session,
    body: &[u8],
) -> Result<Session, CoreError> {
    // `group_path` is slash-joined straight from the URL (§4.7); the
    // collaborators below deal in the dotted Maven groupId.
    let group = group_path.replace('/', ".");
    let group = group.as_str();
    let scope = match identity {
        Identity::Token { scope, .. } => scope.clone(),
        Identity::Cookie { .. } => {
            return Err(CoreError::DeployPasswordRejection {
                message: "a deploy token is required".into(),
            })
        }
    };
    if !scope.permits(group, artifact) {
        return Err(CoreError::DeployForbidden {
            message: format!("token scope does not permit {group}:{artifact}"),
        });
    }

    let body = body.to_vec();
    let group_owned = group.to_string();
    let artifact_owned = artifact.to_string();
    let group_path_owned = group_path.to_string();
    let db = state.db.clone();
    let blob = state.blob.clone();
    let search = state.search.clone();
    let shadow_check = state.shadow_check.clone();
    let locks = state.finalize_locks.clone();

    let (_dir, new_session) = upload_request(
        identity.account(),
        group,
        Some(artifact),
        None,
        None,
        session,
        state.db.as_ref(),
        move |dir| async move {
            let metadata_path = dir
                .path()
                .join(&group_path_owned)
                .join(&artifact_owned)
                .join("maven-metadata.xml");
            let should_finalize = should_trigger_finalization(&metadata_path, &body)?;

            dir.write_metadata(SidecarMetadata {
                group: Some(group_owned.clone()),
                group_path: Some(group_path_owned.clone()),
                name: Some(artifact_owned.clone()),
                version: None,
                timestamp_version: None,
            })?;
            cellar_util::fs::atomic_write(&metadata_path, &body).map_err(CoreError::from)?;

            if should_finalize && !dir.is_finalized() {
                let _guard = locks.acquire(dir.path()).await;
                finalize_deploy(
                    &dir,
                    identity.account(),
                    &group_owned,
                    &group_path_owned,
                    &artifact_owned,
                    db.as_ref(),
                    blob.as_ref(),
                    search.as_ref(),
                    shadow_check.as_ref(),
                    SystemTime::now(),
                )
                .await?;
            }
            Ok(())
        },
    )
    .await?;

    Ok(new_session)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|kv| {
        let (name, value) = kv.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// §4.7 "GET file fallthrough": serve a previously published artifact from
/// the blob store if one exists at this key; otherwise fall through to the
/// router's 404.
pub async fn get_handler(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    match state.blob.read_artifact(&path).await {
        Ok(Some(content)) => content.into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => AppError::from_core(e, &state).into_response(),
    }
}

pub async fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_session_cookie_by_name() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            header::HeaderValue::from_static("other=1; cellar-session=abc123; more=2"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_cookie_header_is_none() {
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }
}
