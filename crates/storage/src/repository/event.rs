use sqlx::{PgConnection, types::Json};
use uuid::Uuid;

use super::roster::unique_to_conflict;
use crate::dto::event::{CreateEventRequest, CreateGroupRequest};
use crate::error::{Resource, Result, StorageError};
use crate::models::{Event, EventGroup, PointTable};

const EVENT_COLUMNS: &str = "event_id, name, event_type, comparison, unit, max_per_class, \
     max_per_student, has_preliminary, point_table, sort_order, created_at";

const GROUP_COLUMNS: &str = "group_id, event_id, name, gender, grade_ids, created_at";

/// Repository for events and their groups
pub struct EventRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self) -> Result<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY sort_order, name");

        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(events)
    }

    pub async fn find_by_id(&mut self, event_id: Uuid) -> Result<Event> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1");

        sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Event, event_id))
    }

    /// Same as `find_by_id` but holds a row lock until the transaction ends,
    /// serializing registrations for this event.
    pub async fn lock(&mut self, event_id: Uuid) -> Result<Event> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1 FOR UPDATE");

        sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Event, event_id))
    }

    pub async fn find_by_name(&mut self, name: &str) -> Result<Event> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE name = $1");

        sqlx::query_as::<_, Event>(&sql)
            .bind(name.trim())
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Event, name.trim()))
    }

    pub async fn create(&mut self, req: &CreateEventRequest, point_table: &PointTable) -> Result<Event> {
        let sql = format!(
            "INSERT INTO events (name, event_type, comparison, unit, max_per_class, \
             max_per_student, has_preliminary, point_table, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(req.name.trim())
            .bind(req.event_type)
            .bind(req.resolved_comparison())
            .bind(&req.unit)
            .bind(req.max_per_class)
            .bind(req.max_per_student)
            .bind(req.has_preliminary)
            .bind(Json(point_table.clone()))
            .bind(req.sort_order)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| unique_to_conflict(e, "Event name already exists"))
    }

    /// Writes the editable columns of `event` back to its row.
    pub async fn update(&mut self, event: &Event) -> Result<Event> {
        let sql = format!(
            "UPDATE events SET name = $2, event_type = $3, comparison = $4, unit = $5, \
             max_per_class = $6, max_per_student = $7, has_preliminary = $8, sort_order = $9 \
             WHERE event_id = $1 RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(event.event_id)
            .bind(event.name.trim())
            .bind(event.event_type)
            .bind(event.comparison)
            .bind(&event.unit)
            .bind(event.max_per_class)
            .bind(event.max_per_student)
            .bind(event.has_preliminary)
            .bind(event.sort_order)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| unique_to_conflict(e, "Event name already exists"))?
            .ok_or_else(|| StorageError::not_found(Resource::Event, event.event_id))
    }

    pub async fn update_point_table(&mut self, event_id: Uuid, point_table: &PointTable) -> Result<Event> {
        let sql = format!(
            "UPDATE events SET point_table = $2 WHERE event_id = $1 RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .bind(Json(point_table.clone()))
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Event, event_id))
    }

    pub async fn update_all_point_tables(&mut self, point_table: &PointTable) -> Result<u64> {
        let result = sqlx::query("UPDATE events SET point_table = $1")
            .bind(Json(point_table.clone()))
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_registrations(&mut self, event_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    pub async fn delete(&mut self, event_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM event_groups WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *self.conn)
            .await?;

        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(Resource::Event, event_id));
        }

        Ok(())
    }

    pub async fn list_groups(&mut self, event_id: Uuid) -> Result<Vec<EventGroup>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM event_groups WHERE event_id = $1 ORDER BY name");

        let groups = sqlx::query_as::<_, EventGroup>(&sql)
            .bind(event_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(groups)
    }

    pub async fn find_group(&mut self, group_id: Uuid) -> Result<EventGroup> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM event_groups WHERE group_id = $1");

        sqlx::query_as::<_, EventGroup>(&sql)
            .bind(group_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Group, group_id))
    }

    pub async fn lock_group(&mut self, group_id: Uuid) -> Result<EventGroup> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM event_groups WHERE group_id = $1 FOR UPDATE");

        sqlx::query_as::<_, EventGroup>(&sql)
            .bind(group_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Group, group_id))
    }

    pub async fn find_group_by_name(&mut self, event_id: Uuid, name: &str) -> Result<Option<EventGroup>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM event_groups WHERE event_id = $1 AND name = $2");

        let group = sqlx::query_as::<_, EventGroup>(&sql)
            .bind(event_id)
            .bind(name.trim())
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(group)
    }

    pub async fn create_group(&mut self, event_id: Uuid, req: &CreateGroupRequest) -> Result<EventGroup> {
        let sql = format!(
            "INSERT INTO event_groups (event_id, name, gender, grade_ids) \
             VALUES ($1, $2, $3, $4) RETURNING {GROUP_COLUMNS}"
        );

        sqlx::query_as::<_, EventGroup>(&sql)
            .bind(event_id)
            .bind(req.name.trim())
            .bind(req.gender)
            .bind(&req.grade_ids)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| unique_to_conflict(e, "Group name already exists for this event"))
    }

    pub async fn update_group(&mut self, group: &EventGroup) -> Result<EventGroup> {
        let sql = format!(
            "UPDATE event_groups SET name = $2, gender = $3, grade_ids = $4 \
             WHERE group_id = $1 RETURNING {GROUP_COLUMNS}"
        );

        sqlx::query_as::<_, EventGroup>(&sql)
            .bind(group.group_id)
            .bind(group.name.trim())
            .bind(group.gender)
            .bind(&group.grade_ids)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| unique_to_conflict(e, "Group name already exists for this event"))?
            .ok_or_else(|| StorageError::not_found(Resource::Group, group.group_id))
    }

    pub async fn count_group_registrations(&mut self, group_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    pub async fn delete_group(&mut self, group_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM event_groups WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(Resource::Group, group_id));
        }

        Ok(())
    }
}
