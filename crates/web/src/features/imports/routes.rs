use axum::{middleware, routing::post, Router};

use super::handlers::{import_registrations, import_scores};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/registrations", post(import_registrations))
        .route("/scores", post(import_scores))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
