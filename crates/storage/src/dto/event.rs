use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    Comparison, Event, EventGroup, EventTemplate, EventType, GroupGender, PointTable,
};

fn default_max() -> i32 {
    3
}

/// Request payload for creating an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    pub event_type: EventType,

    /// Defaults to the event type's usual rule (track/relay ascending, field descending)
    pub comparison: Option<Comparison>,

    #[validate(length(min = 1, max = 20, message = "Unit must be between 1 and 20 characters"))]
    pub unit: String,

    #[validate(range(min = 0, message = "max_per_class cannot be negative"))]
    #[serde(default = "default_max")]
    pub max_per_class: i32,

    #[validate(range(min = 0, message = "max_per_student cannot be negative"))]
    #[serde(default = "default_max")]
    pub max_per_student: i32,

    #[serde(default)]
    pub has_preliminary: bool,

    /// Defaults to the standard 9-7-6-5-4-3-2-1 table
    #[schema(value_type = Option<Object>)]
    pub point_table: Option<PointTable>,

    #[serde(default)]
    pub sort_order: i32,
}

impl CreateEventRequest {
    pub fn from_template(template: &EventTemplate) -> Self {
        Self {
            name: template.name.to_string(),
            event_type: template.event_type,
            comparison: Some(template.comparison()),
            unit: template.unit.to_string(),
            max_per_class: template.max_per_class,
            max_per_student: default_max(),
            has_preliminary: template.has_preliminary,
            point_table: Some(template.point_table()),
            sort_order: 0,
        }
    }

    pub fn resolved_comparison(&self) -> Comparison {
        self.comparison
            .unwrap_or_else(|| self.event_type.default_comparison())
    }
}

/// Partial event update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,

    pub event_type: Option<EventType>,

    /// When only `event_type` changes, the new type's usual rule applies
    pub comparison: Option<Comparison>,

    #[validate(length(min = 1, max = 20, message = "Unit must be between 1 and 20 characters"))]
    pub unit: Option<String>,

    #[validate(range(min = 0, message = "max_per_class cannot be negative"))]
    pub max_per_class: Option<i32>,

    #[validate(range(min = 0, message = "max_per_student cannot be negative"))]
    pub max_per_student: Option<i32>,

    pub has_preliminary: Option<bool>,

    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFromTemplateRequest {
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,

    #[serde(default = "default_group_gender")]
    pub gender: GroupGender,

    /// Empty admits every grade
    #[serde(default)]
    pub grade_ids: Vec<Uuid>,
}

/// Partial group update; `grade_ids: []` lifts the grade restriction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: Option<String>,

    pub gender: Option<GroupGender>,

    pub grade_ids: Option<Vec<Uuid>>,
}

fn default_group_gender() -> GroupGender {
    GroupGender::Any
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePointTableRequest {
    #[schema(value_type = Object)]
    pub point_table: PointTable,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PointTableResponse {
    #[schema(value_type = Object)]
    pub point_table: PointTable,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkUpdateResponse {
    pub events_updated: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: Event,
    pub groups: Vec<EventGroup>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventTemplateResponse {
    pub name: String,
    pub event_type: EventType,
    pub comparison: Comparison,
    pub unit: String,
    pub max_per_class: i32,
    pub has_preliminary: bool,
}

impl From<&EventTemplate> for EventTemplateResponse {
    fn from(template: &EventTemplate) -> Self {
        Self {
            name: template.name.to_string(),
            event_type: template.event_type,
            comparison: template.comparison(),
            unit: template.unit.to_string(),
            max_per_class: template.max_per_class,
            has_preliminary: template.has_preliminary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::find_template;

    #[test]
    fn test_template_request_carries_template_settings() {
        let template = find_template("100m").unwrap();
        let req = CreateEventRequest::from_template(template);

        assert_eq!(req.name, "100m");
        assert_eq!(req.max_per_class, 3);
        assert!(req.has_preliminary);
        assert_eq!(req.resolved_comparison(), Comparison::Ascending);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_comparison_falls_back_to_event_type() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"name": "Shot put", "event_type": "field", "unit": "meters"}"#,
        )
        .unwrap();

        assert_eq!(req.resolved_comparison(), Comparison::Descending);
        assert_eq!(req.max_per_class, 3);
        assert!(req.point_table.is_none());
    }

    #[test]
    fn test_update_validates_only_supplied_fields() {
        let empty: UpdateEventRequest = serde_json::from_str("{}").unwrap();
        let blank_name = UpdateEventRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        let negative_quota = UpdateEventRequest {
            max_per_student: Some(-1),
            ..Default::default()
        };

        assert!(empty.validate().is_ok());
        assert!(blank_name.validate().is_err());
        assert!(negative_quota.validate().is_err());
    }

    #[test]
    fn test_negative_quota_fails_validation() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"name": "100m", "event_type": "track", "unit": "seconds", "max_per_class": -1}"#,
        )
        .unwrap();

        assert!(req.validate().is_err());
    }
}
