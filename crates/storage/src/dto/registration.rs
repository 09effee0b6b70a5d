use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{PaginationParams, default_page, default_page_size};

/// Request payload for registering a student to an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRegistrationRequest {
    pub student_id: Uuid,
    pub event_id: Uuid,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetLaneRequest {
    #[validate(range(min = 1, max = 999, message = "Lane must be between 1 and 999"))]
    pub lane_no: i32,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RegistrationFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub event_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub grade_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
}

impl RegistrationFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

/// Registration joined with the names an operator needs to read it
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RegistrationDetail {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub event_name: String,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub student_id: Uuid,
    pub student_no: String,
    pub student_name: String,
    pub class_name: String,
    pub grade_name: String,
    pub lane_no: Option<i32>,
    pub created_at: chrono::NaiveDateTime,
}
