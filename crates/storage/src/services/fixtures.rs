use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::dto::event::CreateEventRequest;
use crate::dto::registration::CreateRegistrationRequest;
use crate::dto::roster::{CreateClassRequest, CreateGradeRequest, CreateStudentRequest};
use crate::dto::score::RecordScoreRequest;
use crate::error::StorageError;
use crate::models::{
    Comparison, Event, EventGroup, EventType, Gender, GroupGender, PointTable, Registration,
    Round, Score, find_template,
};
use crate::repository::ranking::RankingCandidate;
use crate::repository::roster::EnrolledStudent;
use crate::services::{entry_ledger, events, result_ledger, roster};

pub fn timestamp(seconds: i64) -> NaiveDateTime {
    chrono::DateTime::from_timestamp(1_700_000_000 + seconds, 0)
        .unwrap()
        .naive_utc()
}

pub fn decimal(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn sprint(max_per_class: i32, max_per_student: i32) -> Event {
    Event {
        event_id: Uuid::new_v4(),
        name: "100m".to_string(),
        event_type: EventType::Track,
        comparison: Comparison::Ascending,
        unit: "seconds".to_string(),
        max_per_class,
        max_per_student,
        has_preliminary: false,
        point_table: Json(PointTable::new([(1, 9), (2, 7), (3, 6)])),
        sort_order: 0,
        created_at: timestamp(0),
    }
}

pub fn student(gender: Gender, grade_id: Uuid) -> EnrolledStudent {
    EnrolledStudent {
        student_id: Uuid::new_v4(),
        student_no: "0001".to_string(),
        gender,
        class_id: Uuid::new_v4(),
        grade_id,
    }
}

pub fn group(event_id: Uuid, gender: GroupGender, grade_ids: Vec<Uuid>) -> EventGroup {
    EventGroup {
        group_id: Uuid::new_v4(),
        event_id,
        name: "Group".to_string(),
        gender,
        grade_ids,
        created_at: timestamp(0),
    }
}

pub fn registration(student_id: Uuid, event_id: Uuid) -> Registration {
    Registration {
        registration_id: Uuid::new_v4(),
        student_id,
        event_id,
        group_id: None,
        lane_no: None,
        created_by: None,
        created_at: timestamp(0),
    }
}

pub fn score(value: &str, round: Round) -> Score {
    Score {
        score_id: Uuid::new_v4(),
        registration_id: Uuid::new_v4(),
        round,
        value: decimal(value),
        is_valid: true,
        invalid_reason: None,
        rank: None,
        points: 0,
        update_reason: None,
        created_by: None,
        updated_by: None,
        created_at: timestamp(0),
        updated_at: timestamp(0),
    }
}

pub fn candidate(student_no: &str, value: &str, entered_after: i64) -> RankingCandidate {
    RankingCandidate {
        score_id: Uuid::new_v4(),
        registration_id: Uuid::new_v4(),
        value: decimal(value),
        entered_at: timestamp(entered_after),
        student_id: Uuid::new_v4(),
        student_no: student_no.to_string(),
        student_name: format!("Student {student_no}"),
        class_name: "1A".to_string(),
        grade_name: "Grade 1".to_string(),
    }
}

/// A Postgres-style error carrying only a SQLSTATE code.
#[derive(Debug)]
struct CodedError(&'static str);

impl std::fmt::Display for CodedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "database error {}", self.0)
    }
}

impl std::error::Error for CodedError {}

impl sqlx::error::DatabaseError for CodedError {
    fn message(&self) -> &str {
        "database error"
    }

    fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
        Some(self.0.into())
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> sqlx::error::ErrorKind {
        sqlx::error::ErrorKind::Other
    }
}

pub fn database_error(code: &'static str) -> StorageError {
    StorageError::Database(sqlx::Error::Database(Box::new(CodedError(code))))
}

/// A stored 100m final with `runners` students of one class registered.
pub struct SeededSprint {
    pub event: Event,
    pub registrations: Vec<Registration>,
}

pub async fn seed_sprint(pool: &PgPool, runners: usize) -> SeededSprint {
    let grade = roster::create_grade(
        pool,
        &CreateGradeRequest {
            name: "Grade 1".to_string(),
            sort_order: 1,
        },
    )
    .await
    .unwrap();
    let class = roster::create_class(
        pool,
        &CreateClassRequest {
            grade_id: grade.grade_id,
            name: "1A".to_string(),
        },
    )
    .await
    .unwrap();
    let template = find_template("100m").unwrap();
    let event = events::create_event(pool, &CreateEventRequest::from_template(template))
        .await
        .unwrap();

    let mut registrations = Vec::new();
    for n in 1..=runners {
        let student = roster::create_student(
            pool,
            &CreateStudentRequest {
                class_id: class.class_id,
                student_no: format!("{n:04}"),
                name: format!("Runner {n}"),
                gender: Gender::Male,
            },
        )
        .await
        .unwrap();
        let registration = entry_ledger::register(
            pool,
            &CreateRegistrationRequest {
                student_id: student.student_id,
                event_id: event.event_id,
                group_id: None,
            },
            Some("desk"),
        )
        .await
        .unwrap();
        registrations.push(registration);
    }

    SeededSprint { event, registrations }
}

pub async fn record_final(
    pool: &PgPool,
    registration_id: Uuid,
    value: &str,
    overwrite: bool,
) -> crate::error::Result<Score> {
    result_ledger::record(
        pool,
        &RecordScoreRequest {
            registration_id,
            round: Round::Final.as_str().to_string(),
            value: decimal(value),
            overwrite,
        },
        Some("desk"),
    )
    .await
}
