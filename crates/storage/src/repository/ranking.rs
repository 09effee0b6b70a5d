use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Round;

/// A valid score of one event/round, joined to the student it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct RankingCandidate {
    pub score_id: Uuid,
    pub registration_id: Uuid,
    pub value: Decimal,
    pub entered_at: chrono::NaiveDateTime,
    pub student_id: Uuid,
    pub student_no: String,
    pub student_name: String,
    pub class_name: String,
    pub grade_name: String,
}

pub struct RankingRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> RankingRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Valid scores for (event, round), locked until the ranking pass commits.
    ///
    /// Rows come back in no particular order; ordering is the engine's job.
    pub async fn fetch_candidates(
        &mut self,
        event_id: Uuid,
        round: Round,
    ) -> Result<Vec<RankingCandidate>> {
        let rows = sqlx::query_as::<_, RankingCandidate>(
            r#"
            SELECT
                sc.score_id,
                sc.registration_id,
                sc.value,
                sc.created_at AS entered_at,
                s.student_id,
                s.student_no,
                s.name AS student_name,
                c.name AS class_name,
                g.name AS grade_name
            FROM scores sc
            INNER JOIN registrations r ON r.registration_id = sc.registration_id
            INNER JOIN students s ON s.student_id = r.student_id
            INNER JOIN classes c ON c.class_id = s.class_id
            INNER JOIN grades g ON g.grade_id = c.grade_id
            WHERE r.event_id = $1
              AND sc.round = $2
              AND sc.is_valid
            FOR UPDATE OF sc
            "#,
        )
        .bind(event_id)
        .bind(round)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Writes rank/points for a batch of scores in one statement.
    pub async fn write_ranks(&mut self, ranks: &[(Uuid, i32, i32)]) -> Result<u64> {
        if ranks.is_empty() {
            return Ok(0);
        }

        let score_ids: Vec<Uuid> = ranks.iter().map(|(id, _, _)| *id).collect();
        let rank_values: Vec<i32> = ranks.iter().map(|(_, rank, _)| *rank).collect();
        let points: Vec<i32> = ranks.iter().map(|(_, _, points)| *points).collect();

        let result = sqlx::query(
            r#"
            UPDATE scores
            SET rank = u.rank, points = u.points
            FROM UNNEST($1::uuid[], $2::int4[], $3::int4[]) AS u(score_id, rank, points)
            WHERE scores.score_id = u.score_id
            "#,
        )
        .bind(&score_ids)
        .bind(&rank_values)
        .bind(&points)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Events that a full recompute walks, with their preliminary flag.
    pub async fn list_events_for_recompute(&mut self) -> Result<Vec<(Uuid, bool)>> {
        let rows = sqlx::query_as::<_, (Uuid, bool)>(
            "SELECT event_id, has_preliminary FROM events ORDER BY sort_order, name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }
}
