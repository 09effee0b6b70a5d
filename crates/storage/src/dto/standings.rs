use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ClassTotalsQuery {
    pub grade_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClassStanding {
    pub position: usize,
    pub class_id: Uuid,
    pub class_name: String,
    pub grade_id: Uuid,
    pub grade_name: String,
    pub total_points: i64,
    pub gold: i64,
    pub silver: i64,
    pub bronze: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GradeMedals {
    pub position: usize,
    pub grade_id: Uuid,
    pub grade_name: String,
    pub gold: i64,
    pub silver: i64,
    pub bronze: i64,
    pub total: i64,
}
