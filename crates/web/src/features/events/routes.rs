use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    create_event, create_from_template, create_group, default_point_table, delete_event,
    delete_group, get_event, get_point_table, list_events, list_templates,
    update_all_point_tables, update_event, update_group, update_point_table,
};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_event))
        .route("/from-template", post(create_from_template))
        .route("/:id", put(update_event).delete(delete_event))
        .route("/:id/groups", post(create_group))
        .route("/:id/point-table", put(update_point_table))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_events))
        .route("/templates", get(list_templates))
        .route("/:id", get(get_event))
        .route("/:id/point-table", get(get_point_table))
        .merge(protected)
}

pub fn group_routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:id", put(update_group).delete(delete_group))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}

pub fn scoring_rule_routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", put(update_all_point_tables))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(default_point_table))
        .merge(protected)
}
