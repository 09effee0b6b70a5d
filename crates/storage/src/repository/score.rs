use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::score::{ScoreDetail, ScoreFilter};
use crate::error::{Resource, Result, StorageError};
use crate::models::{Round, Score};

const SCORE_COLUMNS: &str = "score_id, registration_id, round, value, is_valid, invalid_reason, \
     rank, points, update_reason, created_by, updated_by, created_at, updated_at";

pub struct ScoreRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ScoreRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&mut self, score_id: Uuid) -> Result<Score> {
        let sql = format!("SELECT {SCORE_COLUMNS} FROM scores WHERE score_id = $1");

        sqlx::query_as::<_, Score>(&sql)
            .bind(score_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Score, score_id))
    }

    pub async fn lock(&mut self, score_id: Uuid) -> Result<Score> {
        let sql = format!("SELECT {SCORE_COLUMNS} FROM scores WHERE score_id = $1 FOR UPDATE");

        sqlx::query_as::<_, Score>(&sql)
            .bind(score_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Score, score_id))
    }

    /// The valid score for (registration, round), if any.
    pub async fn find_valid(&mut self, registration_id: Uuid, round: Round) -> Result<Option<Score>> {
        let sql = format!(
            "SELECT {SCORE_COLUMNS} FROM scores \
             WHERE registration_id = $1 AND round = $2 AND is_valid \
             FOR UPDATE"
        );

        let score = sqlx::query_as::<_, Score>(&sql)
            .bind(registration_id)
            .bind(round)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(score)
    }

    pub async fn insert(
        &mut self,
        registration_id: Uuid,
        round: Round,
        value: Decimal,
        created_by: Option<&str>,
    ) -> Result<Score> {
        let sql = format!(
            "INSERT INTO scores (registration_id, round, value, created_by) \
             VALUES ($1, $2, $3, $4) RETURNING {SCORE_COLUMNS}"
        );

        let score = sqlx::query_as::<_, Score>(&sql)
            .bind(registration_id)
            .bind(round)
            .bind(value)
            .bind(created_by)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(score)
    }

    /// Flips the score to invalid. Rank and points are left as last computed.
    pub async fn invalidate(
        &mut self,
        score_id: Uuid,
        reason: &str,
        updated_by: Option<&str>,
    ) -> Result<Score> {
        let sql = format!(
            "UPDATE scores \
             SET is_valid = FALSE, invalid_reason = $2, updated_by = COALESCE($3, updated_by), \
                 updated_at = CURRENT_TIMESTAMP \
             WHERE score_id = $1 RETURNING {SCORE_COLUMNS}"
        );

        sqlx::query_as::<_, Score>(&sql)
            .bind(score_id)
            .bind(reason)
            .bind(updated_by)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Score, score_id))
    }

    /// Overwrites the value in place. Rank and points are left as last computed.
    pub async fn correct(
        &mut self,
        score_id: Uuid,
        value: Decimal,
        reason: &str,
        updated_by: Option<&str>,
    ) -> Result<Score> {
        let sql = format!(
            "UPDATE scores \
             SET value = $2, update_reason = $3, updated_by = $4, updated_at = CURRENT_TIMESTAMP \
             WHERE score_id = $1 RETURNING {SCORE_COLUMNS}"
        );

        sqlx::query_as::<_, Score>(&sql)
            .bind(score_id)
            .bind(value)
            .bind(reason)
            .bind(updated_by)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Score, score_id))
    }

    pub async fn list(&mut self, filter: &ScoreFilter) -> Result<(Vec<ScoreDetail>, i64)> {
        let mut count_query = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM scores sc
            INNER JOIN registrations r ON r.registration_id = sc.registration_id
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
                sc.score_id,
                sc.registration_id,
                e.name AS event_name,
                s.student_no,
                s.name AS student_name,
                c.name AS class_name,
                sc.round,
                sc.value,
                sc.is_valid,
                sc.invalid_reason,
                sc.rank,
                sc.points,
                sc.update_reason,
                sc.created_by,
                sc.updated_by,
                sc.updated_at
            FROM scores sc
            INNER JOIN registrations r ON r.registration_id = sc.registration_id
            INNER JOIN students s ON s.student_id = r.student_id
            INNER JOIN classes c ON c.class_id = s.class_id
            INNER JOIN events e ON e.event_id = r.event_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut query, filter);

        let pagination = filter.pagination();
        query.push(" ORDER BY e.sort_order, e.name, sc.round, sc.rank NULLS LAST, sc.created_at LIMIT ");
        query.push_bind(pagination.limit() as i64);
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let rows = query
            .build_query_as::<ScoreDetail>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok((rows, total_items))
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ScoreFilter) {
    if !filter.include_invalid {
        query.push(" AND sc.is_valid");
    }
    if let Some(event_id) = filter.event_id {
        query.push(" AND r.event_id = ");
        query.push_bind(event_id);
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
    if let Some(round) = filter.round {
        query.push(" AND sc.round = ");
        query.push_bind(round);
    }
}
