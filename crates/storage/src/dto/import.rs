use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Round;

/// One already-parsed registration row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationImportRow {
    pub student_no: String,
    pub event_name: String,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// One already-parsed result row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreImportRow {
    pub student_no: String,
    pub event_name: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportRegistrationsRequest {
    pub rows: Vec<RegistrationImportRow>,
}

fn default_round() -> String {
    Round::Final.as_str().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportScoresRequest {
    #[serde(default = "default_round")]
    pub round: String,
    pub rows: Vec<ScoreImportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RowError {
    /// 1-based position of the row in the submitted batch
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn record_failure(&mut self, row: usize, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(RowError {
            row,
            message: message.into(),
        });
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}
