use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::handlers::{correct_score, get_score, invalidate_score, list_scores, record_score};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(record_score))
        .route("/:id", put(correct_score))
        .route("/:id/invalidate", post(invalidate_score))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_scores))
        .route("/:id", get(get_score))
        .merge(protected)
}
