use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use utoipa::ToSchema;
use uuid::Uuid;

use super::point_table::PointTable;
use super::student::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Track,
    Field,
    Relay,
}

impl EventType {
    /// Comparison rule an event of this type uses unless told otherwise.
    pub fn default_comparison(self) -> Comparison {
        match self {
            Self::Track | Self::Relay => Comparison::Ascending,
            Self::Field => Comparison::Descending,
        }
    }
}

/// How measured values are ordered: `Ascending` means the lowest value wins
/// (timed races), `Descending` means the highest wins (distance, height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "comparison_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "group_gender")]
pub enum GroupGender {
    #[sqlx(rename = "M")]
    #[serde(rename = "M")]
    Male,
    #[sqlx(rename = "F")]
    #[serde(rename = "F")]
    Female,
    #[sqlx(rename = "A")]
    #[serde(rename = "A")]
    Any,
}

impl GroupGender {
    pub fn admits(self, gender: Gender) -> bool {
        match self {
            Self::Any => true,
            Self::Male => gender == Gender::Male,
            Self::Female => gender == Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub name: String,
    pub event_type: EventType,
    pub comparison: Comparison,
    pub unit: String,
    pub max_per_class: i32,
    pub max_per_student: i32,
    pub has_preliminary: bool,
    #[schema(value_type = Object)]
    pub point_table: Json<PointTable>,
    pub sort_order: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Event {
    pub fn points_for(&self, rank: i32) -> i32 {
        self.point_table.points_for(rank)
    }
}

/// Gender/grade-restricted subdivision of an event. An empty `grade_ids`
/// admits every grade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventGroup {
    pub group_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub gender: GroupGender,
    pub grade_ids: Vec<Uuid>,
    pub created_at: chrono::NaiveDateTime,
}

impl EventGroup {
    pub fn admits_grade(&self, grade_id: Uuid) -> bool {
        self.grade_ids.is_empty() || self.grade_ids.contains(&grade_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_group_admits_everyone() {
        assert!(GroupGender::Any.admits(Gender::Male));
        assert!(GroupGender::Any.admits(Gender::Female));
        assert!(GroupGender::Female.admits(Gender::Female));
        assert!(!GroupGender::Female.admits(Gender::Male));
    }

    #[test]
    fn test_empty_grade_set_admits_any_grade() {
        let group = EventGroup {
            group_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Open".to_string(),
            gender: GroupGender::Any,
            grade_ids: vec![],
            created_at: chrono::NaiveDateTime::default(),
        };

        assert!(group.admits_grade(Uuid::new_v4()));
    }

    #[test]
    fn test_field_events_default_to_descending() {
        assert_eq!(EventType::Track.default_comparison(), Comparison::Ascending);
        assert_eq!(EventType::Relay.default_comparison(), Comparison::Ascending);
        assert_eq!(EventType::Field.default_comparison(), Comparison::Descending);
    }
}
