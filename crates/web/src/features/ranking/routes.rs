use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{rank_event, recompute_all};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/recompute", post(recompute_all))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/events/:id", get(rank_event))
        .merge(protected)
}
