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
        registration::{CreateRegistrationRequest, RegistrationDetail, RegistrationFilter, SetLaneRequest},
    },
    models::Registration,
    services::entry_ledger,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::operator;

#[utoipa::path(
    get,
    path = "/api/registrations",
    params(RegistrationFilter),
    responses(
        (status = 200, description = "Registrations matching the filter", body = PaginatedResponse<RegistrationDetail>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "registrations"
)]
pub async fn list_registrations(
    State(db): State<Database>,
    Query(filter): Query<RegistrationFilter>,
) -> Result<Response, WebError> {
    let pagination = filter.pagination();
    pagination.validate().map_err(WebError::BadRequest)?;

    let (registrations, total_items) = entry_ledger::list_registrations(db.pool(), &filter).await?;

    Ok(Json(PaginatedResponse::new(registrations, pagination, total_items)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/registrations/{id}",
    params(
        ("id" = Uuid, Path, description = "Registration id")
    ),
    responses(
        (status = 200, description = "Registration found", body = Registration),
        (status = 404, description = "Registration not found")
    ),
    tag = "registrations"
)]
pub async fn get_registration(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let registration = entry_ledger::get_registration(db.pool(), id).await?;

    Ok(Json(registration).into_response())
}

#[utoipa::path(
    post,
    path = "/api/registrations",
    request_body = CreateRegistrationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Student registered", body = Registration),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student, event or group not found"),
        (status = 409, description = "Duplicate entry, quota reached or group ineligible")
    ),
    tag = "registrations"
)]
pub async fn register(
    State(db): State<Database>,
    headers: HeaderMap,
    Json(req): Json<CreateRegistrationRequest>,
) -> Result<Response, WebError> {
    let operator = operator(&headers)?;
    let registration = entry_ledger::register(db.pool(), &req, operator.as_deref()).await?;

    Ok((StatusCode::CREATED, Json(registration)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/registrations/{id}",
    params(
        ("id" = Uuid, Path, description = "Registration id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Registration removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Results exist for this registration")
    ),
    tag = "registrations"
)]
pub async fn unregister(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    entry_ledger::unregister(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    put,
    path = "/api/registrations/{id}/lane",
    params(
        ("id" = Uuid, Path, description = "Registration id")
    ),
    request_body = SetLaneRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lane assigned", body = Registration),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found")
    ),
    tag = "registrations"
)]
pub async fn set_lane(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetLaneRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let registration = entry_ledger::set_lane(db.pool(), id, req.lane_no).await?;

    Ok(Json(registration).into_response())
}
