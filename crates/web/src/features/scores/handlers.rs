use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::PaginatedResponse,
        score::{CorrectScoreRequest, InvalidateScoreRequest, RecordScoreRequest, ScoreDetail, ScoreFilter},
    },
    models::Score,
    services::result_ledger,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::operator;

#[utoipa::path(
    get,
    path = "/api/scores",
    params(ScoreFilter),
    responses(
        (status = 200, description = "Results matching the filter", body = PaginatedResponse<ScoreDetail>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "scores"
)]
pub async fn list_scores(
    State(db): State<Database>,
    Query(filter): Query<ScoreFilter>,
) -> Result<Response, WebError> {
    let pagination = filter.pagination();
    pagination.validate().map_err(WebError::BadRequest)?;

    let (scores, total_items) = result_ledger::list_scores(db.pool(), &filter).await?;

    Ok(Json(PaginatedResponse::new(scores, pagination, total_items)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scores/{id}",
    params(
        ("id" = Uuid, Path, description = "Score id")
    ),
    responses(
        (status = 200, description = "Result found, valid or not", body = Score),
        (status = 404, description = "Score not found")
    ),
    tag = "scores"
)]
pub async fn get_score(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let score = result_ledger::get_score(db.pool(), id).await?;

    Ok(Json(score).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scores",
    request_body = RecordScoreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Result recorded", body = Score),
        (status = 400, description = "Unknown round, or value outside stored precision"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "A valid result already exists; resend with overwrite")
    ),
    tag = "scores"
)]
pub async fn record_score(
    State(db): State<Database>,
    headers: HeaderMap,
    Json(req): Json<RecordScoreRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let operator = operator(&headers)?;
    let score = result_ledger::record(db.pool(), &req, operator.as_deref()).await?;

    Ok((StatusCode::CREATED, Json(score)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/scores/{id}",
    params(
        ("id" = Uuid, Path, description = "Score id")
    ),
    request_body = CorrectScoreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Result corrected", body = Score),
        (status = 400, description = "Reason missing or too long"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Score not found"),
        (status = 409, description = "Result is already invalid")
    ),
    tag = "scores"
)]
pub async fn correct_score(
    State(db): State<Database>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<CorrectScoreRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let operator = operator(&headers)?;
    let score = result_ledger::correct(db.pool(), id, &req, operator.as_deref()).await?;

    Ok(Json(score).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scores/{id}/invalidate",
    params(
        ("id" = Uuid, Path, description = "Score id")
    ),
    request_body = InvalidateScoreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Result invalidated", body = Score),
        (status = 400, description = "Reason missing or too long"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Score not found"),
        (status = 409, description = "Result is already invalid")
    ),
    tag = "scores"
)]
pub async fn invalidate_score(
    State(db): State<Database>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<InvalidateScoreRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let operator = operator(&headers)?;
    let score = result_ledger::invalidate(db.pool(), id, &req, operator.as_deref()).await?;

    Ok(Json(score).into_response())
}
