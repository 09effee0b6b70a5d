//! Row-by-row import of registrations and results.
//!
//! Every row goes through the same engine call a single request would use,
//! in its own transaction. A failing row is reported and the batch moves on;
//! only infrastructure errors abort the whole import.

use sqlx::PgPool;

use crate::dto::import::{
    ImportReport, ImportRegistrationsRequest, ImportScoresRequest, RegistrationImportRow, ScoreImportRow,
};
use crate::dto::registration::CreateRegistrationRequest;
use crate::dto::score::RecordScoreRequest;
use crate::error::{Rejection, Resource, Result, StorageError};
use crate::models::Round;
use crate::repository::event::EventRepository;
use crate::repository::registration::RegistrationRepository;
use crate::repository::roster::RosterRepository;
use crate::services::{entry_ledger, result_ledger};

#[derive(Debug, PartialEq, Eq)]
pub enum RowOutcome {
    Succeeded,
    Skipped,
    Failed(String),
}

/// Sorts a row's result into the report. Errors that say something about the
/// row become `Failed`; anything else is handed back to abort the batch.
pub fn classify<T>(result: Result<T>) -> Result<RowOutcome> {
    let error = match result {
        Ok(_) => return Ok(RowOutcome::Succeeded),
        Err(error) => error,
    };

    match &error {
        StorageError::Rejected(Rejection::DuplicateEntry { .. }) => Ok(RowOutcome::Skipped),
        StorageError::NotFound { .. }
        | StorageError::Rejected(_)
        | StorageError::ConstraintViolation(_)
        | StorageError::InvalidInput(_) => Ok(RowOutcome::Failed(error.to_string())),
        _ if error.is_unique_violation()
            || error.is_foreign_key_violation()
            || error.is_data_exception() =>
        {
            Ok(RowOutcome::Failed(error.to_string()))
        }
        _ => Err(error),
    }
}

fn tally(report: &mut ImportReport, row: usize, outcome: RowOutcome) {
    match outcome {
        RowOutcome::Succeeded => report.succeeded += 1,
        RowOutcome::Skipped => report.skipped += 1,
        RowOutcome::Failed(message) => {
            tracing::warn!(row, %message, "Import row failed");
            report.record_failure(row, message);
        }
    }
}

async fn resolve_registration(pool: &PgPool, row: &RegistrationImportRow) -> Result<CreateRegistrationRequest> {
    let mut conn = pool.acquire().await?;

    let student = RosterRepository::new(&mut *conn)
        .find_student_by_no(&row.student_no)
        .await?;

    let mut events = EventRepository::new(&mut *conn);
    let event = events.find_by_name(&row.event_name).await?;

    let group_id = match row.group_name.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => {
            let group = events
                .find_group_by_name(event.event_id, name)
                .await?
                .ok_or_else(|| StorageError::not_found(Resource::Group, name))?;
            Some(group.group_id)
        }
    };

    Ok(CreateRegistrationRequest {
        student_id: student.student_id,
        event_id: event.event_id,
        group_id,
    })
}

async fn resolve_score(pool: &PgPool, row: &ScoreImportRow, round: Round) -> Result<RecordScoreRequest> {
    let mut conn = pool.acquire().await?;

    let student = RosterRepository::new(&mut *conn)
        .find_student_by_no(&row.student_no)
        .await?;
    let event = EventRepository::new(&mut *conn)
        .find_by_name(&row.event_name)
        .await?;

    let registration = RegistrationRepository::new(&mut *conn)
        .find_for_student_event(student.student_id, event.event_id)
        .await?
        .ok_or_else(|| {
            StorageError::not_found(
                Resource::Registration,
                format!("{} / {}", student.student_no, event.name),
            )
        })?;

    Ok(RecordScoreRequest {
        registration_id: registration.registration_id,
        round: round.as_str().to_string(),
        value: row.value,
        overwrite: true,
    })
}

pub async fn import_registrations(
    pool: &PgPool,
    req: &ImportRegistrationsRequest,
    operator: Option<&str>,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (index, row) in req.rows.iter().enumerate() {
        let result = match resolve_registration(pool, row).await {
            Ok(registration) => entry_ledger::register(pool, &registration, operator).await,
            Err(e) => Err(e),
        };
        tally(&mut report, index + 1, classify(result)?);
    }

    tracing::info!(
        succeeded = report.succeeded,
        skipped = report.skipped,
        failed = report.failed,
        "Registration import finished"
    );

    Ok(report)
}

/// Imports results for one round, replacing any existing valid result.
/// An unknown round refuses the whole batch before any row is touched.
pub async fn import_scores(
    pool: &PgPool,
    req: &ImportScoresRequest,
    operator: Option<&str>,
) -> Result<ImportReport> {
    let round: Round = req.round.parse()?;
    let mut report = ImportReport::default();

    for (index, row) in req.rows.iter().enumerate() {
        let result = match resolve_score(pool, row, round).await {
            Ok(score) => result_ledger::record(pool, &score, operator).await,
            Err(e) => Err(e),
        };
        tally(&mut report, index + 1, classify(result)?);
    }

    tracing::info!(
        round = round.as_str(),
        succeeded = report.succeeded,
        failed = report.failed,
        "Result import finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;

    #[test]
    fn test_accepted_row_succeeds() {
        assert_eq!(classify(Ok(())).unwrap(), RowOutcome::Succeeded);
    }

    #[test]
    fn test_duplicate_registration_is_skipped() {
        let existing = fixtures::registration(uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        let result: Result<()> = Err(Rejection::DuplicateEntry {
            existing: Box::new(existing),
        }
        .into());

        assert_eq!(classify(result).unwrap(), RowOutcome::Skipped);
    }

    #[test]
    fn test_rule_rejections_fail_the_row_only() {
        let result: Result<()> = Err(Rejection::ClassQuota { current: 3, limit: 3 }.into());

        match classify(result).unwrap() {
            RowOutcome::Failed(message) => assert!(message.contains("class quota")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_student_fails_the_row_only() {
        let result: Result<()> = Err(StorageError::not_found(Resource::Student, "9999"));

        assert_eq!(
            classify(result).unwrap(),
            RowOutcome::Failed("Student 9999 not found".to_string())
        );
    }

    #[test]
    fn test_infrastructure_error_aborts_batch() {
        let result: Result<()> = Err(StorageError::Database(sqlx::Error::PoolTimedOut));

        assert!(classify(result).is_err());
    }

    #[test]
    fn test_value_overflow_fails_the_row_only() {
        let result: Result<()> = Err(fixtures::database_error("22003"));

        assert!(matches!(classify(result).unwrap(), RowOutcome::Failed(_)));
    }

    #[test]
    fn test_text_too_long_fails_the_row_only() {
        let result: Result<()> = Err(fixtures::database_error("22001"));

        assert!(matches!(classify(result).unwrap(), RowOutcome::Failed(_)));
    }

    #[test]
    fn test_duplicate_key_fails_the_row_only() {
        let result: Result<()> = Err(fixtures::database_error("23505"));

        assert!(matches!(classify(result).unwrap(), RowOutcome::Failed(_)));
    }

    #[test]
    fn test_other_database_errors_abort_batch() {
        let result: Result<()> = Err(fixtures::database_error("40P01"));

        assert!(classify(result).is_err());
    }

    #[test]
    fn test_report_rows_are_one_based() {
        let mut report = ImportReport::default();

        tally(&mut report, 1, RowOutcome::Succeeded);
        tally(&mut report, 2, RowOutcome::Skipped);
        tally(&mut report, 3, RowOutcome::Failed("Event Javelin not found".to_string()));

        assert_eq!((report.succeeded, report.skipped, report.failed), (1, 1, 1));
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.total(), 3);
    }
}
