//! The four middlewares wrapping the routing surface (§4.7).

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD, Engine};
use cellar_core::scope::{DeployScope, Identity};
use cellar_util::errors::CoreError;

/// Reject `..` in the request URI outright (§4.7 "Reject `..`").
pub async fn reject_dotdot(req: Request, next: Next) -> Response {
    if req.uri().path().contains("..") {
        return (StatusCode::BAD_REQUEST, "path traversal rejected").into_response();
    }
    next.run(req).await
}

/// Resolve the caller's identity from the `Authorization` header and
/// reject HTTP Basic credentials (§4.7 "Require token"). Resolution of
/// deploy-token scope itself is out of this core's scope (§1) — here a
/// compact `account|scope` bearer token format stands in for whatever
/// external token service issues and verifies real credentials.
pub async fn require_token(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let identity = match extract_identity(req.headers()) {
        Ok(identity) => identity,
        Err(e) => return AppError::from_core(e, &state).into_response(),
    };

    if let Some(Identity::Cookie { account }) = &identity {
        tracing::warn!(target: "cellar::audit", account, "rejected password auth on deploy surface");
        return AppError::from_core(
            CoreError::DeployPasswordRejection {
                message: "a deploy token is required; HTTP Basic credentials are not accepted".into(),
            },
            &state,
        )
        .into_response();
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}

fn extract_identity(headers: &axum::http::HeaderMap) -> Result<Option<Identity>, CoreError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| CoreError::DeployForbidden {
        message: "malformed Authorization header".into(),
    })?;

    if let Some(basic) = value.strip_prefix("Basic ") {
        let decoded = STANDARD.decode(basic).map_err(|_| CoreError::DeployForbidden {
            message: "malformed Basic credentials".into(),
        })?;
        let decoded = String::from_utf8(decoded).map_err(|_| CoreError::DeployForbidden {
            message: "malformed Basic credentials".into(),
        })?;
        let account = decoded.split(':').next().unwrap_or_default().to_string();
        return Ok(Some(Identity::Cookie { account }));
    }

    if let Some(token) = value.strip_prefix("Bearer ") {
        return Ok(Some(parse_token(token)?));
    }

    Ok(None)
}

fn parse_token(token: &str) -> Result<Identity, CoreError> {
    let mut parts = token.splitn(2, '|');
    let account = parts.next().unwrap_or_default().to_string();
    let scope_str = parts.next().unwrap_or("*");

    let scope = if scope_str == "*" {
        DeployScope::Unscoped
    } else if let Some(group) = scope_str.strip_prefix("group:") {
        DeployScope::Group {
            group: group.to_string(),
        }
    } else if let Some(rest) = scope_str.strip_prefix("group-artifact:") {
        let mut gv = rest.splitn(2, ':');
        let group = gv.next().unwrap_or_default().to_string();
        let artifact = gv.next().unwrap_or_default().to_string();
        DeployScope::GroupArtifact { group, artifact }
    } else {
        return Err(CoreError::DeployForbidden {
            message: format!("unrecognized token scope: {scope_str}"),
        });
    };

    Ok(Identity::Token { account, scope })
}
