use axum::{routing::get, Router};

use super::handlers::{class_totals, grade_medals};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/classes", get(class_totals))
        .route("/grades", get(grade_medals))
}
