use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::event::{
        BulkUpdateResponse, CreateEventRequest, CreateFromTemplateRequest, CreateGroupRequest,
        EventDetailResponse, EventTemplateResponse, PointTableResponse, UpdateEventRequest,
        UpdateGroupRequest, UpdatePointTableRequest,
    },
    models::{Event, EventGroup},
    services::events,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "All events in programme order", body = Vec<Event>)
    ),
    tag = "events"
)]
pub async fn list_events(State(db): State<Database>) -> Result<Response, WebError> {
    let events = events::list_events(db.pool()).await?;

    Ok(Json(events).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/templates",
    responses(
        (status = 200, description = "Built-in event presets", body = Vec<EventTemplateResponse>)
    ),
    tag = "events"
)]
pub async fn list_templates() -> Response {
    Json(events::list_templates()).into_response()
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Event with its groups", body = EventDetailResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let detail = events::get_event_detail(db.pool(), id).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Event name already exists")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(db): State<Database>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let event = events::create_event(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(event)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/from-template",
    request_body = CreateFromTemplateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Event created from preset", body = Event),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown template"),
        (status = 409, description = "Event name already exists")
    ),
    tag = "events"
)]
pub async fn create_from_template(
    State(db): State<Database>,
    Json(req): Json<CreateFromTemplateRequest>,
) -> Result<Response, WebError> {
    let event = events::create_from_template(db.pool(), &req.template).await?;

    Ok((StatusCode::CREATED, Json(event)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event id")
    ),
    request_body = UpdateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event name already exists")
    ),
    tag = "events"
)]
pub async fn update_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let event = events::update_event(db.pool(), id, &req).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Registrations exist for this event")
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    events::delete_event(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/groups",
    params(
        ("id" = Uuid, Path, description = "Event id")
    ),
    request_body = CreateGroupRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Group created", body = EventGroup),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event or grade not found"),
        (status = 409, description = "Group name already exists for this event")
    ),
    tag = "events"
)]
pub async fn create_group(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let group = events::create_group(db.pool(), id, &req).await?;

    Ok((StatusCode::CREATED, Json(group)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/groups/{id}",
    params(
        ("id" = Uuid, Path, description = "Group id")
    ),
    request_body = UpdateGroupRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Group updated", body = EventGroup),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group or grade not found"),
        (status = 409, description = "Group name already exists for this event")
    ),
    tag = "events"
)]
pub async fn update_group(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let group = events::update_group(db.pool(), id, &req).await?;

    Ok(Json(group).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(
        ("id" = Uuid, Path, description = "Group id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Registrations reference this group")
    ),
    tag = "events"
)]
pub async fn delete_group(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    events::delete_group(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/point-table",
    params(
        ("id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Point table of the event", body = PointTableResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "scoring-rules"
)]
pub async fn get_point_table(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let event = events::get_event(db.pool(), id).await?;

    Ok(Json(PointTableResponse {
        point_table: event.point_table.0,
    })
    .into_response())
}

#[utoipa::path(
    put,
    path = "/api/events/{id}/point-table",
    params(
        ("id" = Uuid, Path, description = "Event id")
    ),
    request_body = UpdatePointTableRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Point table replaced; re-rank to apply", body = Event),
        (status = 400, description = "Invalid point table"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "scoring-rules"
)]
pub async fn update_point_table(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePointTableRequest>,
) -> Result<Response, WebError> {
    let event = events::update_point_table(db.pool(), id, &req.point_table).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scoring-rules",
    responses(
        (status = 200, description = "Default point table for new events", body = PointTableResponse)
    ),
    tag = "scoring-rules"
)]
pub async fn default_point_table() -> Response {
    Json(PointTableResponse {
        point_table: events::default_point_table(),
    })
    .into_response()
}

#[utoipa::path(
    put,
    path = "/api/scoring-rules",
    request_body = UpdatePointTableRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Point table applied to every event; re-rank to apply", body = BulkUpdateResponse),
        (status = 400, description = "Invalid point table"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "scoring-rules"
)]
pub async fn update_all_point_tables(
    State(db): State<Database>,
    Json(req): Json<UpdatePointTableRequest>,
) -> Result<Response, WebError> {
    let events_updated = events::update_all_point_tables(db.pool(), &req.point_table).await?;

    Ok(Json(BulkUpdateResponse { events_updated }).into_response())
}
