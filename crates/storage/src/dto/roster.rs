use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::Gender;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGradeRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateClassRequest {
    pub grade_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStudentRequest {
    pub class_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "Student number must be between 1 and 20 characters"))]
    pub student_no: String,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub gender: Gender,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RosterFilter {
    pub grade_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClassDetail {
    pub class_id: Uuid,
    pub name: String,
    pub grade_id: Uuid,
    pub grade_name: String,
}
