use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::Round;

#[derive(Debug, Deserialize, IntoParams)]
pub struct RankingQuery {
    /// `preliminary` or `final` (default)
    pub round: Option<String>,
    /// Return only the first `limit` entries; every result is still ranked
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventRanking {
    pub event_id: Uuid,
    pub event_name: String,
    pub unit: String,
    pub round: Round,
    pub entries: Vec<RankingEntry>,
}

impl EventRanking {
    /// Keeps the leading `limit` entries, or all of them when unset.
    pub fn top(mut self, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            self.entries.truncate(limit);
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankingEntry {
    pub rank: i32,
    pub points: i32,
    pub registration_id: Uuid,
    pub student: StudentInfo,
    pub score: ScoreInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentInfo {
    pub student_id: Uuid,
    pub student_no: String,
    pub name: String,
    pub class_name: String,
    pub grade_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreInfo {
    pub score_id: Uuid,
    pub value: Decimal,
    pub round: Round,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecomputeResponse {
    pub events_processed: u64,
}
