//! HTTP routing surface for the deploy ingestion core (§4.7).

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::{parse_put_path, ParsedPut};
pub use state::AppState;

use axum::routing::{get, put};
use axum::Router;

/// Build the router: a single wildcard route dispatching PUT and GET by
/// path shape, wrapped in the dotdot-rejection and token-requirement
/// middlewares (§4.7), with a 404 fallback for anything else.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/{*path}",
            put(handlers::put_handler).get(handlers::get_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_token,
        ))
        .layer(axum::middleware::from_fn(middleware::reject_dotdot))
        .fallback(handlers::not_found)
        .with_state(state)
}
