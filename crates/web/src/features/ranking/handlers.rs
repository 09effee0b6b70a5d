use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::ranking::{EventRanking, RankingQuery, RecomputeResponse},
    error::StorageError,
    models::Round,
    services::ranking_engine::{self, TieBreak},
};
use uuid::Uuid;

use crate::error::WebError;

#[utoipa::path(
    get,
    path = "/api/rankings/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        RankingQuery
    ),
    responses(
        (status = 200, description = "Event ranked; rank and points are stored on each result", body = EventRanking),
        (status = 400, description = "Unknown round"),
        (status = 404, description = "Event not found")
    ),
    tag = "rankings"
)]
pub async fn rank_event(
    State(db): State<Database>,
    State(tie_break): State<TieBreak>,
    Path(id): Path<Uuid>,
    Query(query): Query<RankingQuery>,
) -> Result<Response, WebError> {
    let round: Round = query
        .round
        .as_deref()
        .unwrap_or(Round::Final.as_str())
        .parse()
        .map_err(StorageError::from)?;

    let ranking = ranking_engine::rank(db.pool(), id, round, tie_break).await?;

    Ok(Json(ranking.top(query.limit)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/rankings/recompute",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every event re-ranked", body = RecomputeResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "rankings"
)]
pub async fn recompute_all(
    State(db): State<Database>,
    State(tie_break): State<TieBreak>,
) -> Result<Response, WebError> {
    let events_processed = ranking_engine::recompute_all(db.pool(), tie_break).await?;

    Ok(Json(RecomputeResponse { events_processed }).into_response())
}
