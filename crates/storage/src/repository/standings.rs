use sqlx::{FromRow, PgConnection, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;

/// A class row every standings table starts from, including classes that
/// have not scored yet.
#[derive(Debug, Clone, FromRow)]
pub struct ClassSeed {
    pub class_id: Uuid,
    pub class_name: String,
    pub grade_id: Uuid,
    pub grade_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct GradeSeed {
    pub grade_id: Uuid,
    pub grade_name: String,
}

/// Rank/points already written on a valid final-round score.
#[derive(Debug, Clone, FromRow)]
pub struct ScoredResult {
    pub class_id: Uuid,
    pub grade_id: Uuid,
    pub rank: Option<i32>,
    pub points: i32,
}

pub struct StandingsRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> StandingsRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn class_seeds(&mut self, grade_id: Option<Uuid>) -> Result<Vec<ClassSeed>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT c.class_id, c.name AS class_name, g.grade_id, g.name AS grade_name
            FROM classes c
            INNER JOIN grades g ON g.grade_id = c.grade_id
            WHERE 1=1
            "#,
        );

        if let Some(grade_id) = grade_id {
            query.push(" AND g.grade_id = ");
            query.push_bind(grade_id);
        }

        query.push(" ORDER BY g.sort_order, g.name, c.name");

        let rows = query
            .build_query_as::<ClassSeed>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn grade_seeds(&mut self) -> Result<Vec<GradeSeed>> {
        let rows = sqlx::query_as::<_, GradeSeed>(
            "SELECT grade_id, name AS grade_name FROM grades ORDER BY sort_order, name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Valid final-round results, optionally limited to one grade.
    pub async fn final_results(&mut self, grade_id: Option<Uuid>) -> Result<Vec<ScoredResult>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT c.class_id, c.grade_id, sc.rank, sc.points
            FROM scores sc
            INNER JOIN registrations r ON r.registration_id = sc.registration_id
            INNER JOIN students s ON s.student_id = r.student_id
            INNER JOIN classes c ON c.class_id = s.class_id
            WHERE sc.is_valid
              AND sc.round = 'final'
            "#,
        );

        if let Some(grade_id) = grade_id {
            query.push(" AND c.grade_id = ");
            query.push_bind(grade_id);
        }

        let rows = query
            .build_query_as::<ScoredResult>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows)
    }
}
