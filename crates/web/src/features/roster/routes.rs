use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    create_class, create_grade, create_student, delete_class, delete_grade, delete_student,
    get_student, list_classes, list_grades, list_students,
};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

pub fn grade_routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_grade))
        .route("/:id", delete(delete_grade))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new().route("/", get(list_grades)).merge(protected)
}

pub fn class_routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_class))
        .route("/:id", delete(delete_class))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new().route("/", get(list_classes)).merge(protected)
}

pub fn student_routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_student))
        .route("/:id", delete(delete_student))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_students))
        .route("/:id", get(get_student))
        .merge(protected)
}
