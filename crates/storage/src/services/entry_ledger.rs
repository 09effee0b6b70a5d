use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::registration::{CreateRegistrationRequest, RegistrationDetail, RegistrationFilter};
use crate::error::{GroupConstraint, Rejection, Resource, Result, StorageError};
use crate::models::{Event, EventGroup, Registration, check_operator};
use crate::repository::event::EventRepository;
use crate::repository::registration::RegistrationRepository;
use crate::repository::roster::{EnrolledStudent, RosterRepository};

/// The group named by a registration request, as found in storage.
#[derive(Debug, Clone, Copy)]
pub enum RequestedGroup<'a> {
    None,
    Missing(Uuid),
    Found(&'a EventGroup),
}

/// Everything the entry rules look at for one registration attempt.
#[derive(Debug)]
pub struct EntryContext<'a> {
    pub student: &'a EnrolledStudent,
    pub event: &'a Event,
    pub existing: Option<&'a Registration>,
    pub class_count: i64,
    pub student_count: i64,
    pub group: RequestedGroup<'a>,
}

/// Applies the entry rules in order; the first failing rule wins.
pub fn check_entry(ctx: &EntryContext<'_>) -> Result<()> {
    if let Some(existing) = ctx.existing {
        return Err(Rejection::DuplicateEntry {
            existing: Box::new(existing.clone()),
        }
        .into());
    }

    let class_limit = i64::from(ctx.event.max_per_class);
    if ctx.class_count >= class_limit {
        return Err(Rejection::ClassQuota {
            current: ctx.class_count,
            limit: class_limit,
        }
        .into());
    }

    let student_limit = i64::from(ctx.event.max_per_student);
    if ctx.student_count >= student_limit {
        return Err(Rejection::StudentQuota {
            current: ctx.student_count,
            limit: student_limit,
        }
        .into());
    }

    match ctx.group {
        RequestedGroup::None => Ok(()),
        RequestedGroup::Missing(group_id) => Err(StorageError::not_found(Resource::Group, group_id)),
        RequestedGroup::Found(group) => check_group(group, ctx.student, ctx.event),
    }
}

fn check_group(group: &EventGroup, student: &EnrolledStudent, event: &Event) -> Result<()> {
    let constraint = if group.event_id != event.event_id {
        Some(GroupConstraint::WrongEvent)
    } else if !group.gender.admits(student.gender) {
        Some(GroupConstraint::Gender)
    } else if !group.admits_grade(student.grade_id) {
        Some(GroupConstraint::Grade)
    } else {
        None
    };

    match constraint {
        Some(constraint) => Err(Rejection::GroupIneligible { constraint }.into()),
        None => Ok(()),
    }
}

/// Admits a student to an event.
///
/// The student and event rows stay locked until commit so concurrent
/// registrations cannot both pass the quota checks.
pub async fn register(
    pool: &PgPool,
    req: &CreateRegistrationRequest,
    operator: Option<&str>,
) -> Result<Registration> {
    check_operator(operator).map_err(StorageError::InvalidInput)?;

    let mut tx = pool.begin().await?;

    let student = RosterRepository::new(&mut *tx)
        .lock_enrolled_student(req.student_id)
        .await?;
    let event = EventRepository::new(&mut *tx).lock(req.event_id).await?;

    let mut registrations = RegistrationRepository::new(&mut *tx);
    let existing = registrations
        .find_for_student_event(student.student_id, event.event_id)
        .await?;
    let class_count = registrations
        .count_for_class_event(student.class_id, event.event_id)
        .await?;
    let student_count = registrations.count_for_student(student.student_id).await?;

    let group = match req.group_id {
        Some(group_id) => match EventRepository::new(&mut *tx).find_group(group_id).await {
            Ok(group) => Some(group),
            Err(StorageError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        },
        None => None,
    };
    let requested_group = match (req.group_id, group.as_ref()) {
        (None, _) => RequestedGroup::None,
        (Some(_), Some(group)) => RequestedGroup::Found(group),
        (Some(group_id), None) => RequestedGroup::Missing(group_id),
    };

    let ctx = EntryContext {
        student: &student,
        event: &event,
        existing: existing.as_ref(),
        class_count,
        student_count,
        group: requested_group,
    };

    if let Err(err) = check_entry(&ctx) {
        tracing::warn!(
            student_id = %req.student_id,
            event_id = %req.event_id,
            error = %err,
            "Registration rejected"
        );
        return Err(err);
    }

    let registration = RegistrationRepository::new(&mut *tx)
        .insert(student.student_id, event.event_id, req.group_id, operator)
        .await?;

    tx.commit().await?;

    tracing::info!(
        registration_id = %registration.registration_id,
        student_no = %student.student_no,
        event = %event.name,
        "Registration created"
    );

    Ok(registration)
}

/// Removes a registration that has no score rows. Never cascades.
pub async fn unregister(pool: &PgPool, registration_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut registrations = RegistrationRepository::new(&mut *tx);

    registrations.lock(registration_id).await?;

    let score_count = registrations.count_scores(registration_id).await?;
    if score_count > 0 {
        tracing::warn!(%registration_id, score_count, "Unregister refused, scores exist");
        return Err(Rejection::ReferenceExists {
            resource: Resource::Score,
            count: score_count,
        }
        .into());
    }

    registrations.delete(registration_id).await?;

    tx.commit().await?;

    tracing::info!(%registration_id, "Registration removed");

    Ok(())
}

pub async fn get_registration(pool: &PgPool, registration_id: Uuid) -> Result<Registration> {
    let mut conn = pool.acquire().await?;
    RegistrationRepository::new(&mut *conn)
        .find_by_id(registration_id)
        .await
}

pub async fn list_registrations(
    pool: &PgPool,
    filter: &RegistrationFilter,
) -> Result<(Vec<RegistrationDetail>, i64)> {
    let mut conn = pool.acquire().await?;
    RegistrationRepository::new(&mut *conn).list(filter).await
}

pub async fn set_lane(pool: &PgPool, registration_id: Uuid, lane_no: i32) -> Result<Registration> {
    let mut conn = pool.acquire().await?;
    RegistrationRepository::new(&mut *conn)
        .set_lane(registration_id, lane_no)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, GroupGender};
    use crate::services::fixtures;

    fn ctx<'a>(
        student: &'a EnrolledStudent,
        event: &'a Event,
        class_count: i64,
        student_count: i64,
    ) -> EntryContext<'a> {
        EntryContext {
            student,
            event,
            existing: None,
            class_count,
            student_count,
            group: RequestedGroup::None,
        }
    }

    fn rejection(result: Result<()>) -> Rejection {
        match result {
            Err(StorageError::Rejected(rejection)) => rejection,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_admits_within_quotas() {
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Male, Uuid::new_v4());

        assert!(check_entry(&ctx(&student, &event, 2, 2)).is_ok());
    }

    #[test]
    fn test_duplicate_entry_returns_existing_record() {
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Male, Uuid::new_v4());
        let existing = fixtures::registration(student.student_id, event.event_id);
        let mut attempt = ctx(&student, &event, 0, 0);
        attempt.existing = Some(&existing);

        match rejection(check_entry(&attempt)) {
            Rejection::DuplicateEntry { existing: found } => {
                assert_eq!(found.registration_id, existing.registration_id);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_wins_over_full_quota() {
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Male, Uuid::new_v4());
        let existing = fixtures::registration(student.student_id, event.event_id);
        let mut attempt = ctx(&student, &event, 3, 3);
        attempt.existing = Some(&existing);

        assert_eq!(rejection(check_entry(&attempt)).kind(), "duplicate_entry");
    }

    #[test]
    fn test_fourth_classmate_hits_class_quota() {
        let event = fixtures::sprint(3, 5);
        let student = fixtures::student(Gender::Female, Uuid::new_v4());

        match rejection(check_entry(&ctx(&student, &event, 3, 0))) {
            Rejection::ClassQuota { current, limit } => {
                assert_eq!(current, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn test_class_quota_checked_before_student_quota() {
        let event = fixtures::sprint(1, 1);
        let student = fixtures::student(Gender::Female, Uuid::new_v4());

        assert_eq!(
            rejection(check_entry(&ctx(&student, &event, 1, 1))).kind(),
            "class_quota"
        );
    }

    #[test]
    fn test_student_quota_counts_all_events() {
        let event = fixtures::sprint(3, 2);
        let student = fixtures::student(Gender::Male, Uuid::new_v4());

        match rejection(check_entry(&ctx(&student, &event, 0, 2))) {
            Rejection::StudentQuota { current, limit } => {
                assert_eq!((current, limit), (2, 2));
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn test_zero_quota_admits_nobody() {
        let event = fixtures::sprint(0, 3);
        let student = fixtures::student(Gender::Male, Uuid::new_v4());

        assert_eq!(
            rejection(check_entry(&ctx(&student, &event, 0, 0))).kind(),
            "class_quota"
        );
    }

    #[test]
    fn test_group_of_another_event_is_rejected() {
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Male, Uuid::new_v4());
        let foreign = fixtures::group(Uuid::new_v4(), GroupGender::Any, vec![]);
        let mut attempt = ctx(&student, &event, 0, 0);
        attempt.group = RequestedGroup::Found(&foreign);

        match rejection(check_entry(&attempt)) {
            Rejection::GroupIneligible { constraint } => {
                assert_eq!(constraint, GroupConstraint::WrongEvent);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn test_group_gender_filter() {
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Female, Uuid::new_v4());
        let boys = fixtures::group(event.event_id, GroupGender::Male, vec![]);
        let mut attempt = ctx(&student, &event, 0, 0);
        attempt.group = RequestedGroup::Found(&boys);

        match rejection(check_entry(&attempt)) {
            Rejection::GroupIneligible { constraint } => {
                assert_eq!(constraint, GroupConstraint::Gender);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn test_group_grade_filter() {
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Male, Uuid::new_v4());
        let juniors = fixtures::group(event.event_id, GroupGender::Male, vec![Uuid::new_v4()]);
        let mut attempt = ctx(&student, &event, 0, 0);
        attempt.group = RequestedGroup::Found(&juniors);

        match rejection(check_entry(&attempt)) {
            Rejection::GroupIneligible { constraint } => {
                assert_eq!(constraint, GroupConstraint::Grade);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn test_matching_group_is_admitted() {
        let grade_id = Uuid::new_v4();
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Female, grade_id);
        let girls = fixtures::group(event.event_id, GroupGender::Female, vec![grade_id]);
        let mut attempt = ctx(&student, &event, 0, 0);
        attempt.group = RequestedGroup::Found(&girls);

        assert!(check_entry(&attempt).is_ok());
    }

    #[test]
    fn test_missing_group_is_not_found() {
        let event = fixtures::sprint(3, 3);
        let student = fixtures::student(Gender::Female, Uuid::new_v4());
        let mut attempt = ctx(&student, &event, 0, 0);
        attempt.group = RequestedGroup::Missing(Uuid::new_v4());

        assert!(matches!(
            check_entry(&attempt),
            Err(StorageError::NotFound {
                resource: Resource::Group,
                ..
            })
        ));
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_unregister_refused_while_a_score_exists(pool: PgPool) {
        let meet = fixtures::seed_sprint(&pool, 2).await;
        let scored = meet.registrations[0].registration_id;
        let unscored = meet.registrations[1].registration_id;
        fixtures::record_final(&pool, scored, "13.20", false)
            .await
            .unwrap();

        match unregister(&pool, scored).await {
            Err(StorageError::Rejected(Rejection::ReferenceExists { resource, count })) => {
                assert_eq!(resource, Resource::Score);
                assert_eq!(count, 1);
            }
            other => panic!("expected reference_exists, got {other:?}"),
        }
        assert!(get_registration(&pool, scored).await.is_ok());

        unregister(&pool, unscored).await.unwrap();
        assert!(matches!(
            get_registration(&pool, unscored).await,
            Err(StorageError::NotFound { .. })
        ));
    }
}
