use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::score::{
    CorrectScoreRequest, InvalidateScoreRequest, RecordScoreRequest, ScoreDetail, ScoreFilter,
};
use crate::error::{Rejection, Result, StorageError};
use crate::models::{Round, Score, check_operator, check_reason_length, check_value};
use crate::repository::registration::RegistrationRepository;
use crate::repository::score::ScoreRepository;

/// Reason stamped on a result replaced through an overwrite.
pub const SUPERSEDED_REASON: &str = "superseded by new entry";

/// What `record` does once the existing valid result is known.
#[derive(Debug)]
pub enum RecordPlan {
    Insert,
    Supersede(Score),
}

pub fn plan_record(existing: Option<Score>, overwrite: bool) -> std::result::Result<RecordPlan, Rejection> {
    match existing {
        None => Ok(RecordPlan::Insert),
        Some(existing) if overwrite => Ok(RecordPlan::Supersede(existing)),
        Some(existing) => Err(Rejection::DuplicateResult {
            existing: Box::new(existing),
        }),
    }
}

/// Trimmed reason, or `EmptyReason` when nothing is left.
pub fn require_reason(reason: &str) -> std::result::Result<&str, Rejection> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Rejection::EmptyReason);
    }
    Ok(reason)
}

/// Checks shared by correction and invalidation: the row must still be valid
/// and the operator must say why.
pub fn check_amendable<'r>(score: &Score, reason: &'r str) -> std::result::Result<&'r str, Rejection> {
    if !score.is_valid {
        return Err(Rejection::AlreadyInvalid {
            score_id: score.score_id,
        });
    }
    require_reason(reason)
}

/// Refuses input the score columns would round or truncate.
pub fn check_limits(value: Option<&Decimal>, reason: Option<&str>, operator: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        check_value(value).map_err(StorageError::InvalidInput)?;
    }
    if let Some(reason) = reason {
        check_reason_length(reason.trim()).map_err(StorageError::InvalidInput)?;
    }
    check_operator(operator).map_err(StorageError::InvalidInput)
}

/// Enters a result for one registration and round.
///
/// An existing valid result is either reported back (`overwrite = false`) or
/// invalidated and replaced in the same transaction.
pub async fn record(pool: &PgPool, req: &RecordScoreRequest, operator: Option<&str>) -> Result<Score> {
    check_limits(Some(&req.value), None, operator)?;

    let mut tx = pool.begin().await?;

    RegistrationRepository::new(&mut *tx)
        .lock(req.registration_id)
        .await?;

    let round: Round = req.round.parse()?;

    let mut scores = ScoreRepository::new(&mut *tx);
    let existing = scores.find_valid(req.registration_id, round).await?;

    let plan = plan_record(existing, req.overwrite).inspect_err(|rejection| {
        tracing::warn!(
            registration_id = %req.registration_id,
            round = round.as_str(),
            kind = rejection.kind(),
            "Result entry rejected"
        );
    })?;

    if let RecordPlan::Supersede(previous) = &plan {
        scores
            .invalidate(previous.score_id, SUPERSEDED_REASON, operator)
            .await?;
        tracing::info!(score_id = %previous.score_id, "Previous result superseded");
    }

    let score = scores
        .insert(req.registration_id, round, req.value, operator)
        .await?;

    tx.commit().await?;

    tracing::info!(
        score_id = %score.score_id,
        registration_id = %score.registration_id,
        round = round.as_str(),
        value = %score.value,
        "Result recorded"
    );

    Ok(score)
}

/// Corrects a valid result in place. Rank and points stay as they were until
/// the next ranking pass.
pub async fn correct(
    pool: &PgPool,
    score_id: Uuid,
    req: &CorrectScoreRequest,
    operator: Option<&str>,
) -> Result<Score> {
    check_limits(Some(&req.value), Some(&req.reason), operator)?;

    let mut tx = pool.begin().await?;
    let mut scores = ScoreRepository::new(&mut *tx);

    let current = scores.lock(score_id).await?;
    let reason = check_amendable(&current, &req.reason)?;

    let score = scores.correct(score_id, req.value, reason, operator).await?;

    tx.commit().await?;

    tracing::info!(
        %score_id,
        old_value = %current.value,
        new_value = %score.value,
        reason,
        "Result corrected"
    );

    Ok(score)
}

/// Marks a result invalid. The row is kept with its value and reason.
pub async fn invalidate(
    pool: &PgPool,
    score_id: Uuid,
    req: &InvalidateScoreRequest,
    operator: Option<&str>,
) -> Result<Score> {
    check_limits(None, Some(&req.reason), operator)?;

    let mut tx = pool.begin().await?;
    let mut scores = ScoreRepository::new(&mut *tx);

    let current = scores.lock(score_id).await?;
    let reason = check_amendable(&current, &req.reason)?;

    let score = scores.invalidate(score_id, reason, operator).await?;

    tx.commit().await?;

    tracing::info!(%score_id, reason, "Result invalidated");

    Ok(score)
}

pub async fn get_score(pool: &PgPool, score_id: Uuid) -> Result<Score> {
    let mut conn = pool.acquire().await?;
    ScoreRepository::new(&mut *conn).find_by_id(score_id).await
}

pub async fn list_scores(pool: &PgPool, filter: &ScoreFilter) -> Result<(Vec<ScoreDetail>, i64)> {
    let mut conn = pool.acquire().await?;
    ScoreRepository::new(&mut *conn).list(filter).await
}
