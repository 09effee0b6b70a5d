use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{get_registration, list_registrations, register, set_lane, unregister};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(register))
        .route("/:id", delete(unregister))
        .route("/:id/lane", put(set_lane))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_registrations))
        .route("/:id", get(get_registration))
        .merge(protected)
}
