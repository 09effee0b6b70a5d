use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::ranking::{EventRanking, RankingEntry, ScoreInfo, StudentInfo};
use crate::error::Result;
use crate::models::{Comparison, PointTable, Round};
use crate::repository::event::EventRepository;
use crate::repository::ranking::{RankingCandidate, RankingRepository};

/// Secondary ordering for results with equal values.
///
/// Ranks are never shared: a tie is broken by this policy and, failing that,
/// by score id so the outcome never depends on storage order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Earlier entry ranks first.
    #[default]
    EntryOrder,
    /// Smaller student number ranks first.
    StudentNumber,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry_order" => Ok(Self::EntryOrder),
            "student_number" => Ok(Self::StudentNumber),
            other => Err(format!(
                "unknown tie-break policy '{other}', expected 'entry_order' or 'student_number'"
            )),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryOrder => f.write_str("entry_order"),
            Self::StudentNumber => f.write_str("student_number"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankedResult {
    pub rank: i32,
    pub points: i32,
    pub candidate: RankingCandidate,
}

fn compare(a: &RankingCandidate, b: &RankingCandidate, comparison: Comparison, tie_break: TieBreak) -> Ordering {
    let by_value = match comparison {
        Comparison::Ascending => a.value.cmp(&b.value),
        Comparison::Descending => b.value.cmp(&a.value),
    };

    let by_policy = match tie_break {
        TieBreak::EntryOrder => a.entered_at.cmp(&b.entered_at),
        TieBreak::StudentNumber => a.student_no.cmp(&b.student_no),
    };

    by_value
        .then(by_policy)
        .then_with(|| a.score_id.cmp(&b.score_id))
}

/// Orders candidates by the event's comparison rule and hands out ranks
/// 1..=N with points from `point_table`.
pub fn assign_ranks(
    mut candidates: Vec<RankingCandidate>,
    comparison: Comparison,
    tie_break: TieBreak,
    point_table: &PointTable,
) -> Vec<RankedResult> {
    candidates.sort_by(|a, b| compare(a, b, comparison, tie_break));

    candidates
        .into_iter()
        .zip(1..)
        .map(|(candidate, rank)| RankedResult {
            rank,
            points: point_table.points_for(rank),
            candidate,
        })
        .collect()
}

/// Ranks the valid results of one event/round and writes rank/points back.
pub async fn rank(pool: &PgPool, event_id: Uuid, round: Round, tie_break: TieBreak) -> Result<EventRanking> {
    let mut tx = pool.begin().await?;

    let event = EventRepository::new(&mut *tx).find_by_id(event_id).await?;

    let mut ranking = RankingRepository::new(&mut *tx);
    let candidates = ranking.fetch_candidates(event_id, round).await?;
    let ranked = assign_ranks(candidates, event.comparison, tie_break, &event.point_table);

    let updates: Vec<(Uuid, i32, i32)> = ranked
        .iter()
        .map(|r| (r.candidate.score_id, r.rank, r.points))
        .collect();
    ranking.write_ranks(&updates).await?;

    tx.commit().await?;

    tracing::info!(
        event = %event.name,
        round = round.as_str(),
        ranked = ranked.len(),
        %tie_break,
        "Event ranked"
    );

    let entries = ranked
        .into_iter()
        .map(|r| {
            tracing::debug!(rank = r.rank, points = r.points, value = %r.candidate.value, "Ranked result");
            RankingEntry {
                rank: r.rank,
                points: r.points,
                registration_id: r.candidate.registration_id,
                student: StudentInfo {
                    student_id: r.candidate.student_id,
                    student_no: r.candidate.student_no,
                    name: r.candidate.student_name,
                    class_name: r.candidate.class_name,
                    grade_name: r.candidate.grade_name,
                },
                score: ScoreInfo {
                    score_id: r.candidate.score_id,
                    value: r.candidate.value,
                    round,
                },
            }
        })
        .collect();

    Ok(EventRanking {
        event_id: event.event_id,
        event_name: event.name,
        unit: event.unit,
        round,
        entries,
    })
}

/// Re-ranks every event's final round, plus the preliminary round where the
/// event has one. Returns the number of events processed.
pub async fn recompute_all(pool: &PgPool, tie_break: TieBreak) -> Result<u64> {
    let events = {
        let mut conn = pool.acquire().await?;
        RankingRepository::new(&mut *conn)
            .list_events_for_recompute()
            .await?
    };

    let mut count = 0u64;

    for (event_id, has_preliminary) in events {
        rank(pool, event_id, Round::Final, tie_break).await?;
        if has_preliminary {
            rank(pool, event_id, Round::Preliminary, tie_break).await?;
        }
        count += 1;
    }

    tracing::info!(events = count, "Rankings recomputed");

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::score::CorrectScoreRequest;
    use crate::services::fixtures::{self, candidate};
    use crate::services::result_ledger;
    use rust_decimal_macros::dec;

    fn table() -> PointTable {
        PointTable::new([(1, 9), (2, 7), (3, 6)])
    }

    fn summary(ranked: &[RankedResult]) -> Vec<(i32, String, i32)> {
        ranked
            .iter()
            .map(|r| (r.rank, r.candidate.value.to_string(), r.points))
            .collect()
    }

    #[test]
    fn test_sprint_example_lowest_time_wins() {
        let ranked = assign_ranks(
            vec![
                candidate("0001", "13.20", 0),
                candidate("0002", "12.95", 1),
                candidate("0003", "13.50", 2),
            ],
            Comparison::Ascending,
            TieBreak::EntryOrder,
            &table(),
        );

        assert_eq!(
            summary(&ranked),
            vec![
                (1, "12.95".to_string(), 9),
                (2, "13.20".to_string(), 7),
                (3, "13.50".to_string(), 6),
            ]
        );
    }

    #[test]
    fn test_descending_event_highest_mark_wins() {
        let ranked = assign_ranks(
            vec![
                candidate("0001", "4.10", 0),
                candidate("0002", "4.85", 1),
                candidate("0003", "3.90", 2),
            ],
            Comparison::Descending,
            TieBreak::EntryOrder,
            &table(),
        );

        assert_eq!(ranked[0].candidate.value, dec!(4.85));
        assert_eq!(ranked[2].candidate.value, dec!(3.90));
    }

    #[test]
    fn test_ranks_are_total_and_unique() {
        let candidates: Vec<_> = ["11.0", "10.5", "11.0", "12.1", "10.5", "9.9"]
            .iter()
            .enumerate()
            .map(|(i, v)| candidate(&format!("{i:04}"), v, i as i64))
            .collect();

        let ranked = assign_ranks(candidates, Comparison::Ascending, TieBreak::EntryOrder, &table());

        let ranks: Vec<i32> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].candidate.value <= pair[1].candidate.value));
    }

    #[test]
    fn test_points_follow_table_and_default_to_zero() {
        let candidates: Vec<_> = (0..5)
            .map(|i| candidate(&format!("{i:04}"), &format!("1{i}.0"), i))
            .collect();

        let ranked = assign_ranks(candidates, Comparison::Ascending, TieBreak::EntryOrder, &table());

        let points: Vec<i32> = ranked.iter().map(|r| r.points).collect();
        assert_eq!(points, vec![9, 7, 6, 0, 0]);
    }

    #[test]
    fn test_entry_order_tie_break_prefers_earlier_entry() {
        let ranked = assign_ranks(
            vec![candidate("0009", "12.50", 30), candidate("0001", "12.50", 10)],
            Comparison::Ascending,
            TieBreak::EntryOrder,
            &table(),
        );

        assert_eq!(ranked[0].candidate.student_no, "0001");
        assert_eq!((ranked[0].rank, ranked[1].rank), (1, 2));
    }

    #[test]
    fn test_student_number_tie_break_ignores_entry_time() {
        let ranked = assign_ranks(
            vec![candidate("0002", "5.20", 0), candidate("0001", "5.20", 60)],
            Comparison::Descending,
            TieBreak::StudentNumber,
            &table(),
        );

        assert_eq!(ranked[0].candidate.student_no, "0001");
        assert_eq!(ranked[0].points, 9);
        assert_eq!(ranked[1].points, 7);
    }

    #[test]
    fn test_correction_reorders_only_after_rerank() {
        let mut results = vec![
            candidate("0001", "13.20", 0),
            candidate("0002", "12.95", 1),
            candidate("0003", "13.50", 2),
        ];

        let before = assign_ranks(results.clone(), Comparison::Ascending, TieBreak::EntryOrder, &table());
        assert_eq!(before[0].candidate.student_no, "0002");

        results[1].value = dec!(13.60);

        let after = assign_ranks(results, Comparison::Ascending, TieBreak::EntryOrder, &table());
        assert_eq!(
            summary(&after),
            vec![
                (1, "13.20".to_string(), 9),
                (2, "13.50".to_string(), 7),
                (3, "13.60".to_string(), 6),
            ]
        );
    }

    #[test]
    fn test_new_point_table_applies_on_rerank() {
        let results = vec![candidate("0001", "13.20", 0), candidate("0002", "12.95", 1)];
        let richer = PointTable::new([(1, 10), (2, 8)]);

        let ranked = assign_ranks(results, Comparison::Ascending, TieBreak::EntryOrder, &richer);

        assert_eq!(ranked[0].points, 10);
        assert_eq!(ranked[1].points, 8);
    }

    #[test]
    fn test_empty_round_ranks_nothing() {
        let ranked = assign_ranks(vec![], Comparison::Ascending, TieBreak::EntryOrder, &table());

        assert!(ranked.is_empty());
    }

    #[test]
    fn test_tie_break_parses_from_config() {
        assert_eq!("entry_order".parse::<TieBreak>().unwrap(), TieBreak::EntryOrder);
        assert_eq!("Student_Number".parse::<TieBreak>().unwrap(), TieBreak::StudentNumber);
        assert!("random".parse::<TieBreak>().is_err());
        assert_eq!(TieBreak::default().to_string(), "entry_order");
    }

    async fn stored(pool: &PgPool, score_id: Uuid) -> (Option<i32>, i32) {
        let score = result_ledger::get_score(pool, score_id).await.unwrap();
        (score.rank, score.points)
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_rank_writes_rank_and_points_onto_results(pool: PgPool) {
        let meet = fixtures::seed_sprint(&pool, 3).await;
        let mut scores = Vec::new();
        for (registration, value) in meet.registrations.iter().zip(["13.20", "12.95", "13.50"]) {
            let score = fixtures::record_final(&pool, registration.registration_id, value, false)
                .await
                .unwrap();
            scores.push(score.score_id);
        }

        let ranking = rank(&pool, meet.event.event_id, Round::Final, TieBreak::EntryOrder)
            .await
            .unwrap();

        assert_eq!(ranking.entries.len(), 3);
        assert_eq!(stored(&pool, scores[1]).await, (Some(1), 9));
        assert_eq!(stored(&pool, scores[0]).await, (Some(2), 7));
        assert_eq!(stored(&pool, scores[2]).await, (Some(3), 6));

        result_ledger::correct(
            &pool,
            scores[1],
            &CorrectScoreRequest {
                value: dec!(13.60),
                reason: "re-timed".to_string(),
            },
            Some("desk"),
        )
        .await
        .unwrap();
        assert_eq!(stored(&pool, scores[1]).await, (Some(1), 9));

        recompute_all(&pool, TieBreak::EntryOrder).await.unwrap();

        assert_eq!(stored(&pool, scores[0]).await, (Some(1), 9));
        assert_eq!(stored(&pool, scores[2]).await, (Some(2), 7));
        assert_eq!(stored(&pool, scores[1]).await, (Some(3), 6));
    }
}
