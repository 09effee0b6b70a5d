use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::registration::{RegistrationDetail, RegistrationFilter};
use crate::error::{Resource, Result, StorageError};
use crate::models::Registration;

const REGISTRATION_COLUMNS: &str =
    "registration_id, student_id, event_id, group_id, lane_no, created_by, created_at";

pub struct RegistrationRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> RegistrationRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&mut self, registration_id: Uuid) -> Result<Registration> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE registration_id = $1");

        sqlx::query_as::<_, Registration>(&sql)
            .bind(registration_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Registration, registration_id))
    }

    /// Locks the registration so concurrent result entry for it queues up.
    pub async fn lock(&mut self, registration_id: Uuid) -> Result<Registration> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE registration_id = $1 FOR UPDATE"
        );

        sqlx::query_as::<_, Registration>(&sql)
            .bind(registration_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Registration, registration_id))
    }

    pub async fn find_for_student_event(
        &mut self,
        student_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE student_id = $1 AND event_id = $2"
        );

        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(student_id)
            .bind(event_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(registration)
    }

    /// Registrations held by students of `class_id` for `event_id`.
    pub async fn count_for_class_event(&mut self, class_id: Uuid, event_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM registrations r
            INNER JOIN students s ON s.student_id = r.student_id
            WHERE s.class_id = $1 AND r.event_id = $2
            "#,
        )
        .bind(class_id)
        .bind(event_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    pub async fn count_for_student(&mut self, student_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    pub async fn insert(
        &mut self,
        student_id: Uuid,
        event_id: Uuid,
        group_id: Option<Uuid>,
        created_by: Option<&str>,
    ) -> Result<Registration> {
        let sql = format!(
            "INSERT INTO registrations (student_id, event_id, group_id, created_by) \
             VALUES ($1, $2, $3, $4) RETURNING {REGISTRATION_COLUMNS}"
        );

        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(student_id)
            .bind(event_id)
            .bind(group_id)
            .bind(created_by)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(registration)
    }

    /// Score rows of any validity that reference the registration.
    pub async fn count_scores(&mut self, registration_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM scores WHERE registration_id = $1",
        )
        .bind(registration_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    pub async fn delete(&mut self, registration_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM registrations WHERE registration_id = $1")
            .bind(registration_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(Resource::Registration, registration_id));
        }

        Ok(())
    }

    pub async fn set_lane(&mut self, registration_id: Uuid, lane_no: i32) -> Result<Registration> {
        let sql = format!(
            "UPDATE registrations SET lane_no = $2 WHERE registration_id = $1 \
             RETURNING {REGISTRATION_COLUMNS}"
        );

        sqlx::query_as::<_, Registration>(&sql)
            .bind(registration_id)
            .bind(lane_no)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Registration, registration_id))
    }

    pub async fn list(
        &mut self,
        filter: &RegistrationFilter,
    ) -> Result<(Vec<RegistrationDetail>, i64)> {
        let mut count_query = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM registrations r
            INNER JOIN students s ON s.student_id = r.student_id
            INNER JOIN classes c ON c.class_id = s.class_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut count_query, filter);

        let total_items = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await?;

        let mut query = QueryBuilder::new(
            r#"
            SELECT
                r.registration_id,
                e.event_id,
                e.name AS event_name,
                r.group_id,
                eg.name AS group_name,
                s.student_id,
                s.student_no,
                s.name AS student_name,
                c.name AS class_name,
                g.name AS grade_name,
                r.lane_no,
                r.created_at
            FROM registrations r
            INNER JOIN students s ON s.student_id = r.student_id
            INNER JOIN classes c ON c.class_id = s.class_id
            INNER JOIN grades g ON g.grade_id = c.grade_id
            INNER JOIN events e ON e.event_id = r.event_id
            LEFT JOIN event_groups eg ON eg.group_id = r.group_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut query, filter);

        let pagination = filter.pagination();
        query.push(" ORDER BY e.sort_order, e.name, r.lane_no NULLS LAST, s.student_no LIMIT ");
        query.push_bind(pagination.limit() as i64);
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let rows = query
            .build_query_as::<RegistrationDetail>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok((rows, total_items))
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &RegistrationFilter) {
    if let Some(event_id) = filter.event_id {
        query.push(" AND r.event_id = ");
        query.push_bind(event_id);
    }
    if let Some(group_id) = filter.group_id {
        query.push(" AND r.group_id = ");
        query.push_bind(group_id);
    }
    if let Some(class_id) = filter.class_id {
        query.push(" AND s.class_id = ");
        query.push_bind(class_id);
    }
    if let Some(grade_id) = filter.grade_id {
        query.push(" AND c.grade_id = ");
        query.push_bind(grade_id);
    }
    if let Some(student_id) = filter.student_id {
        query.push(" AND r.student_id = ");
        query.push_bind(student_id);
    }
}
