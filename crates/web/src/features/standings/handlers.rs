use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::standings::{ClassStanding, ClassTotalsQuery, GradeMedals},
    services::standings,
};

use crate::error::WebError;

#[utoipa::path(
    get,
    path = "/api/standings/classes",
    params(ClassTotalsQuery),
    responses(
        (status = 200, description = "Class leaderboard by total points", body = Vec<ClassStanding>)
    ),
    tag = "standings"
)]
pub async fn class_totals(
    State(db): State<Database>,
    Query(query): Query<ClassTotalsQuery>,
) -> Result<Response, WebError> {
    let standings = standings::class_totals(db.pool(), query.grade_id).await?;

    Ok(Json(standings).into_response())
}

#[utoipa::path(
    get,
    path = "/api/standings/grades",
    responses(
        (status = 200, description = "Medal table by grade", body = Vec<GradeMedals>)
    ),
    tag = "standings"
)]
pub async fn grade_medals(State(db): State<Database>) -> Result<Response, WebError> {
    let medals = standings::grade_medals(db.pool()).await?;

    Ok(Json(medals).into_response())
}
