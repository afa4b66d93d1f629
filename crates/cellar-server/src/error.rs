//! The exception wrapper (§4.7 "Exception wrapper", §7 error policy).

use crate::state::AppState;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use cellar_util::errors::CoreError;

/// Wraps a [`CoreError`] with the trace id assigned to this request and
/// carries out the §7 reporting policy before it's ever turned into a
/// response: validation errors are audit-logged only; everything else is
/// sent to the error reporter.
pub struct AppError {
    err: CoreError,
    trace_id: String,
}

impl AppError {
    pub fn from_core(err: CoreError, state: &AppState) -> Self {
        let trace_id = uuid::Uuid::new_v4().to_string();

        if err.is_validation() {
            tracing::warn!(target: "cellar::audit", trace_id, tag = err.tag(), "{err}");
        } else {
            state.error_reporter.report(&err, &trace_id);
        }

        Self { err, trace_id }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.err.status()).unwrap_or(StatusCode::FORBIDDEN);
        let reason = status.canonical_reason().unwrap_or("Error");
        let status_message = format!("{reason} - {}", self.err);

        let mut response = (status, self.err.to_string()).into_response();
        if let Ok(value) = HeaderValue::from_str(&status_message) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("status-message"), value);
        }
        response.extensions_mut().insert(self.trace_id);
        response
    }
}
