use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::import::{ImportRegistrationsRequest, ImportReport, ImportScoresRequest},
    services::batch_import,
};

use crate::error::WebError;
use crate::middleware::auth::operator;

#[utoipa::path(
    post,
    path = "/api/imports/registrations",
    request_body = ImportRegistrationsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Per-row outcome of the import", body = ImportReport),
        (status = 401, description = "Unauthorized")
    ),
    tag = "imports"
)]
pub async fn import_registrations(
    State(db): State<Database>,
    headers: HeaderMap,
    Json(req): Json<ImportRegistrationsRequest>,
) -> Result<Response, WebError> {
    let operator = operator(&headers)?;
    let report = batch_import::import_registrations(db.pool(), &req, operator.as_deref()).await?;

    Ok(Json(report).into_response())
}

#[utoipa::path(
    post,
    path = "/api/imports/scores",
    request_body = ImportScoresRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Per-row outcome of the import", body = ImportReport),
        (status = 400, description = "Unknown round"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "imports"
)]
pub async fn import_scores(
    State(db): State<Database>,
    headers: HeaderMap,
    Json(req): Json<ImportScoresRequest>,
) -> Result<Response, WebError> {
    let operator = operator(&headers)?;
    let report = batch_import::import_scores(db.pool(), &req, operator.as_deref()).await?;

    Ok(Json(report).into_response())
}
