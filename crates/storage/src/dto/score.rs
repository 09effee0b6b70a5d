use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::common::{PaginationParams, default_page, default_page_size};
use crate::models::{Round, check_value};

fn default_round() -> String {
    Round::Final.as_str().to_string()
}

fn validate_score_value(value: &Decimal) -> Result<(), ValidationError> {
    check_value(value)
        .map_err(|message| ValidationError::new("score_value").with_message(message.into()))
}

/// Request payload for entering a result.
///
/// `round` is kept as text so an unknown value surfaces as a `bad_round`
/// rejection rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordScoreRequest {
    pub registration_id: Uuid,
    #[serde(default = "default_round")]
    pub round: String,
    #[validate(custom(function = "validate_score_value"))]
    pub value: Decimal,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CorrectScoreRequest {
    #[validate(custom(function = "validate_score_value"))]
    pub value: Decimal,
    #[validate(length(max = 200, message = "Reason must be at most 200 characters"))]
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvalidateScoreRequest {
    #[validate(length(max = 200, message = "Reason must be at most 200 characters"))]
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ScoreFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub event_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub grade_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub round: Option<Round>,
    #[serde(default)]
    pub include_invalid: bool,
}

impl ScoreFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ScoreDetail {
    pub score_id: Uuid,
    pub registration_id: Uuid,
    pub event_name: String,
    pub student_no: String,
    pub student_name: String,
    pub class_name: String,
    pub round: Round,
    pub value: Decimal,
    pub is_valid: bool,
    pub invalid_reason: Option<String>,
    pub rank: Option<i32>,
    pub points: i32,
    pub update_reason: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: chrono::NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_REASON_CHARS;

    #[test]
    fn test_record_request_refuses_over_precise_value() {
        let req: RecordScoreRequest = serde_json::from_str(&format!(
            r#"{{"registration_id": "{}", "value": "12.9555"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        let errors = req.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("value"));
    }

    #[test]
    fn test_invalidate_request_refuses_long_reason() {
        let req = InvalidateScoreRequest {
            reason: "x".repeat(MAX_REASON_CHARS + 1),
        };

        assert!(req.validate().is_err());
        assert!(
            InvalidateScoreRequest {
                reason: "false start".to_string()
            }
            .validate()
            .is_ok()
        );
    }
}
