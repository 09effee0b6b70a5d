use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub grade_id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub class_id: Uuid,
    pub grade_id: Uuid,
    pub name: String,
    pub created_at: chrono::NaiveDateTime,
}
