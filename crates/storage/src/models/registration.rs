use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Admission of one student to one event, optionally within one group.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Registration {
    pub registration_id: Uuid,
    pub student_id: Uuid,
    pub event_id: Uuid,
    pub group_id: Option<Uuid>,
    pub lane_no: Option<i32>,
    pub created_by: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

/// Longest operator name kept in the audit columns.
pub const MAX_OPERATOR_CHARS: usize = 100;

pub fn check_operator(operator: Option<&str>) -> Result<(), String> {
    match operator {
        Some(name) if name.chars().count() > MAX_OPERATOR_CHARS => Err(format!(
            "operator name must be at most {MAX_OPERATOR_CHARS} characters"
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_name_length() {
        assert!(check_operator(None).is_ok());
        assert!(check_operator(Some("referee-2")).is_ok());
        assert!(check_operator(Some(&"r".repeat(MAX_OPERATOR_CHARS + 1))).is_err());
    }
}
