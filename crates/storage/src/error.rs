use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Registration, Score};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: String },

    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn not_found(resource: Resource, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// SQLSTATE class 22: the row's data did not fit the column (overflow,
    /// string too long, bad format).
    pub fn is_data_exception(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().is_some_and(|code| code.starts_with("22"))
        )
    }

    /// The rejection carried by this error, if it is a business-rule rejection.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            StorageError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Grade,
    Class,
    Student,
    Event,
    Group,
    Registration,
    Score,
    Template,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Grade => "Grade",
            Self::Class => "Class",
            Self::Student => "Student",
            Self::Event => "Event",
            Self::Group => "Group",
            Self::Registration => "Registration",
            Self::Score => "Score",
            Self::Template => "Template",
        };
        f.write_str(name)
    }
}

/// Which group filter refused a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupConstraint {
    WrongEvent,
    Gender,
    Grade,
}

/// Business-rule rejection raised by the competition engine.
///
/// Serialized with a `kind` tag so a presentation layer can render the
/// message itself from the structured fields.
#[derive(Debug, Clone, Error, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("student is already registered for this event")]
    DuplicateEntry { existing: Box<Registration> },

    #[error("class quota reached ({current}/{limit})")]
    ClassQuota { current: i64, limit: i64 },

    #[error("student quota reached ({current}/{limit})")]
    StudentQuota { current: i64, limit: i64 },

    #[error("student is not eligible for this group ({constraint:?})")]
    GroupIneligible { constraint: GroupConstraint },

    #[error("round must be 'preliminary' or 'final', got '{round}'")]
    BadRound { round: String },

    #[error("a valid result already exists for this round")]
    DuplicateResult { existing: Box<Score> },

    #[error("score {score_id} is already invalid")]
    AlreadyInvalid { score_id: Uuid },

    #[error("a reason is required")]
    EmptyReason,

    #[error("{count} dependent {resource} record(s) exist")]
    ReferenceExists { resource: Resource, count: i64 },
}

impl Rejection {
    /// Stable machine-readable code, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateEntry { .. } => "duplicate_entry",
            Self::ClassQuota { .. } => "class_quota",
            Self::StudentQuota { .. } => "student_quota",
            Self::GroupIneligible { .. } => "group_ineligible",
            Self::BadRound { .. } => "bad_round",
            Self::DuplicateResult { .. } => "duplicate_result",
            Self::AlreadyInvalid { .. } => "already_invalid",
            Self::EmptyReason => "empty_reason",
            Self::ReferenceExists { .. } => "reference_exists",
        }
    }

    /// Quota family for quota rejections (`class` or `student`).
    pub fn limit_type(&self) -> Option<&'static str> {
        match self {
            Self::ClassQuota { .. } => Some("class"),
            Self::StudentQuota { .. } => Some("student"),
            _ => None,
        }
    }
}
