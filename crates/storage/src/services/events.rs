use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::event::{
    CreateEventRequest, CreateGroupRequest, EventDetailResponse, EventTemplateResponse, UpdateEventRequest,
    UpdateGroupRequest,
};
use crate::error::{Rejection, Resource, Result, StorageError};
use crate::models::{Event, EventGroup, PointTable, EVENT_TEMPLATES, find_template};
use crate::repository::event::EventRepository;
use crate::repository::roster::RosterRepository;

/// The table to store for a new event: the one supplied, or the standard one.
pub fn resolve_point_table(requested: Option<&PointTable>) -> Result<PointTable> {
    let table = requested.cloned().unwrap_or_else(PointTable::standard);
    table.validate().map_err(StorageError::InvalidInput)?;
    Ok(table)
}

pub async fn create_event(pool: &PgPool, req: &CreateEventRequest) -> Result<Event> {
    let point_table = resolve_point_table(req.point_table.as_ref())?;

    let mut conn = pool.acquire().await?;
    let event = EventRepository::new(&mut *conn)
        .create(req, &point_table)
        .await?;

    tracing::info!(
        event_id = %event.event_id,
        name = %event.name,
        comparison = ?event.comparison,
        "Event created"
    );

    Ok(event)
}

pub async fn create_from_template(pool: &PgPool, template_name: &str) -> Result<Event> {
    let template = find_template(template_name)
        .ok_or_else(|| StorageError::not_found(Resource::Template, template_name.trim()))?;

    create_event(pool, &CreateEventRequest::from_template(template)).await
}

pub fn list_templates() -> Vec<EventTemplateResponse> {
    EVENT_TEMPLATES.iter().map(EventTemplateResponse::from).collect()
}

pub async fn list_events(pool: &PgPool) -> Result<Vec<Event>> {
    let mut conn = pool.acquire().await?;
    EventRepository::new(&mut *conn).list().await
}

pub async fn get_event(pool: &PgPool, event_id: Uuid) -> Result<Event> {
    let mut conn = pool.acquire().await?;
    EventRepository::new(&mut *conn).find_by_id(event_id).await
}

pub async fn get_event_detail(pool: &PgPool, event_id: Uuid) -> Result<EventDetailResponse> {
    let mut conn = pool.acquire().await?;
    let mut events = EventRepository::new(&mut *conn);

    let event = events.find_by_id(event_id).await?;
    let groups = events.list_groups(event_id).await?;

    Ok(EventDetailResponse { event, groups })
}

/// `current` with the supplied fields of `req` laid over it.
pub fn apply_event_update(current: &Event, req: &UpdateEventRequest) -> Event {
    let mut event = current.clone();

    if let Some(name) = &req.name {
        event.name = name.trim().to_string();
    }
    if let Some(event_type) = req.event_type {
        event.event_type = event_type;
        if event_type != current.event_type {
            event.comparison = event_type.default_comparison();
        }
    }
    if let Some(comparison) = req.comparison {
        event.comparison = comparison;
    }
    if let Some(unit) = &req.unit {
        event.unit = unit.clone();
    }
    if let Some(max_per_class) = req.max_per_class {
        event.max_per_class = max_per_class;
    }
    if let Some(max_per_student) = req.max_per_student {
        event.max_per_student = max_per_student;
    }
    if let Some(has_preliminary) = req.has_preliminary {
        event.has_preliminary = has_preliminary;
    }
    if let Some(sort_order) = req.sort_order {
        event.sort_order = sort_order;
    }

    event
}

/// Changes event settings. Existing registrations are kept even when a quota
/// is lowered below the current count; only new entries see the new limit.
pub async fn update_event(pool: &PgPool, event_id: Uuid, req: &UpdateEventRequest) -> Result<Event> {
    let mut tx = pool.begin().await?;
    let mut events = EventRepository::new(&mut *tx);

    let current = events.lock(event_id).await?;
    let event = events.update(&apply_event_update(&current, req)).await?;

    tx.commit().await?;

    tracing::info!(
        %event_id,
        name = %event.name,
        max_per_class = event.max_per_class,
        max_per_student = event.max_per_student,
        "Event updated"
    );

    Ok(event)
}

/// Deletes an event and its groups. Refused while any registration exists.
pub async fn delete_event(pool: &PgPool, event_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut events = EventRepository::new(&mut *tx);

    let event = events.lock(event_id).await?;

    let count = events.count_registrations(event_id).await?;
    if count > 0 {
        tracing::warn!(%event_id, count, "Event delete refused, registrations exist");
        return Err(Rejection::ReferenceExists {
            resource: Resource::Registration,
            count,
        }
        .into());
    }

    events.delete(event_id).await?;
    tx.commit().await?;

    tracing::info!(%event_id, name = %event.name, "Event deleted");

    Ok(())
}

pub async fn create_group(pool: &PgPool, event_id: Uuid, req: &CreateGroupRequest) -> Result<EventGroup> {
    let mut tx = pool.begin().await?;

    EventRepository::new(&mut *tx).lock(event_id).await?;

    let mut roster = RosterRepository::new(&mut *tx);
    for grade_id in &req.grade_ids {
        roster.find_grade(*grade_id).await?;
    }

    let group = EventRepository::new(&mut *tx)
        .create_group(event_id, req)
        .await?;

    tx.commit().await?;

    tracing::info!(
        group_id = %group.group_id,
        %event_id,
        name = %group.name,
        "Group created"
    );

    Ok(group)
}

pub fn apply_group_update(current: &EventGroup, req: &UpdateGroupRequest) -> EventGroup {
    let mut group = current.clone();

    if let Some(name) = &req.name {
        group.name = name.trim().to_string();
    }
    if let Some(gender) = req.gender {
        group.gender = gender;
    }
    if let Some(grade_ids) = &req.grade_ids {
        group.grade_ids = grade_ids.clone();
    }

    group
}

/// Changes a group's name or its gender/grade filter. Registrations already
/// in the group stay; the filter applies to new entries.
pub async fn update_group(pool: &PgPool, group_id: Uuid, req: &UpdateGroupRequest) -> Result<EventGroup> {
    let mut tx = pool.begin().await?;

    let current = EventRepository::new(&mut *tx).lock_group(group_id).await?;

    if let Some(grade_ids) = &req.grade_ids {
        let mut roster = RosterRepository::new(&mut *tx);
        for grade_id in grade_ids {
            roster.find_grade(*grade_id).await?;
        }
    }

    let group = EventRepository::new(&mut *tx)
        .update_group(&apply_group_update(&current, req))
        .await?;

    tx.commit().await?;

    tracing::info!(%group_id, name = %group.name, gender = ?group.gender, "Group updated");

    Ok(group)
}

/// Deletes a group nobody is registered in.
pub async fn delete_group(pool: &PgPool, group_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut events = EventRepository::new(&mut *tx);

    events.find_group(group_id).await?;

    let count = events.count_group_registrations(group_id).await?;
    if count > 0 {
        return Err(Rejection::ReferenceExists {
            resource: Resource::Registration,
            count,
        }
        .into());
    }

    events.delete_group(group_id).await?;
    tx.commit().await?;

    tracing::info!(%group_id, "Group deleted");

    Ok(())
}

pub fn default_point_table() -> PointTable {
    PointTable::standard()
}

/// Replaces one event's point table. Stored rank/points are untouched until
/// the event is ranked again.
pub async fn update_point_table(pool: &PgPool, event_id: Uuid, point_table: &PointTable) -> Result<Event> {
    point_table.validate().map_err(StorageError::InvalidInput)?;

    let mut conn = pool.acquire().await?;
    let event = EventRepository::new(&mut *conn)
        .update_point_table(event_id, point_table)
        .await?;

    tracing::info!(%event_id, "Point table updated");

    Ok(event)
}

pub async fn update_all_point_tables(pool: &PgPool, point_table: &PointTable) -> Result<u64> {
    point_table.validate().map_err(StorageError::InvalidInput)?;

    let mut tx = pool.begin().await?;
    let updated = EventRepository::new(&mut *tx)
        .update_all_point_tables(point_table)
        .await?;
    tx.commit().await?;

    tracing::info!(events = updated, "Point table applied to all events");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comparison, EventType, GroupGender};
    use crate::services::fixtures;

    #[test]
    fn test_missing_table_falls_back_to_standard() {
        let table = resolve_point_table(None).unwrap();

        assert_eq!(table, PointTable::standard());
    }

    #[test]
    fn test_supplied_table_is_kept() {
        let custom = PointTable::new([(1, 5), (2, 3), (3, 1)]);

        let table = resolve_point_table(Some(&custom)).unwrap();

        assert_eq!(table.points_for(1), 5);
        assert_eq!(table.points_for(4), 0);
    }

    #[test]
    fn test_invalid_table_is_refused() {
        let broken = PointTable::new([(1, -3)]);

        let error = resolve_point_table(Some(&broken)).unwrap_err();

        assert!(matches!(error, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let current = fixtures::sprint(3, 3);
        let req = UpdateEventRequest {
            max_per_class: Some(5),
            has_preliminary: Some(true),
            ..Default::default()
        };

        let updated = apply_event_update(&current, &req);

        assert_eq!(updated.max_per_class, 5);
        assert!(updated.has_preliminary);
        assert_eq!(updated.max_per_student, 3);
        assert_eq!(updated.name, current.name);
        assert_eq!(updated.comparison, Comparison::Ascending);
        assert_eq!(updated.event_id, current.event_id);
    }

    #[test]
    fn test_new_event_type_brings_its_comparison() {
        let current = fixtures::sprint(3, 3);
        let req = UpdateEventRequest {
            event_type: Some(EventType::Field),
            unit: Some("meters".to_string()),
            ..Default::default()
        };

        let updated = apply_event_update(&current, &req);

        assert_eq!(updated.event_type, EventType::Field);
        assert_eq!(updated.comparison, Comparison::Descending);
        assert_eq!(updated.unit, "meters");
    }

    #[test]
    fn test_explicit_comparison_wins_over_event_type() {
        let current = fixtures::sprint(3, 3);
        let req = UpdateEventRequest {
            event_type: Some(EventType::Field),
            comparison: Some(Comparison::Ascending),
            ..Default::default()
        };

        assert_eq!(apply_event_update(&current, &req).comparison, Comparison::Ascending);
    }

    #[test]
    fn test_group_update_can_lift_grade_filter() {
        let current = fixtures::group(Uuid::new_v4(), GroupGender::Male, vec![Uuid::new_v4()]);
        let req = UpdateGroupRequest {
            gender: Some(GroupGender::Any),
            grade_ids: Some(Vec::new()),
            ..Default::default()
        };

        let updated = apply_group_update(&current, &req);

        assert_eq!(updated.gender, GroupGender::Any);
        assert!(updated.grade_ids.is_empty());
        assert_eq!(updated.name, current.name);
    }

    #[test]
    fn test_templates_are_listed_in_catalogue_order() {
        let templates = list_templates();

        assert_eq!(templates.len(), EVENT_TEMPLATES.len());
        assert_eq!(templates[0].name, "100m");
        assert_eq!(templates.last().unwrap().name, "4x100m relay");
    }
}
