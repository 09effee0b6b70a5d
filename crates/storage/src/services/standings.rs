use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::standings::{ClassStanding, GradeMedals};
use crate::error::Result;
use crate::repository::standings::{ClassSeed, GradeSeed, ScoredResult, StandingsRepository};

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    points: i64,
    gold: i64,
    silver: i64,
    bronze: i64,
}

impl Tally {
    fn add(&mut self, result: &ScoredResult) {
        self.points += i64::from(result.points);
        match result.rank {
            Some(1) => self.gold += 1,
            Some(2) => self.silver += 1,
            Some(3) => self.bronze += 1,
            _ => {}
        }
    }
}

/// Sums points and medal counts per class from already-ranked results.
///
/// Every seeded class appears, scored or not. Ordered by total points,
/// highest first; equal totals keep seed order.
pub fn tally_class_totals(seeds: Vec<ClassSeed>, results: &[ScoredResult]) -> Vec<ClassStanding> {
    let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
    for result in results {
        tallies.entry(result.class_id).or_default().add(result);
    }

    let mut standings: Vec<ClassStanding> = seeds
        .into_iter()
        .map(|seed| {
            let tally = tallies.get(&seed.class_id).copied().unwrap_or_default();
            ClassStanding {
                position: 0,
                class_id: seed.class_id,
                class_name: seed.class_name,
                grade_id: seed.grade_id,
                grade_name: seed.grade_name,
                total_points: tally.points,
                gold: tally.gold,
                silver: tally.silver,
                bronze: tally.bronze,
            }
        })
        .collect();

    standings.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    for (index, standing) in standings.iter_mut().enumerate() {
        standing.position = index + 1;
    }

    standings
}

/// Medal table per grade: gold, then silver, then bronze, highest first.
pub fn tally_grade_medals(seeds: Vec<GradeSeed>, results: &[ScoredResult]) -> Vec<GradeMedals> {
    let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
    for result in results {
        tallies.entry(result.grade_id).or_default().add(result);
    }

    let mut medals: Vec<GradeMedals> = seeds
        .into_iter()
        .map(|seed| {
            let tally = tallies.get(&seed.grade_id).copied().unwrap_or_default();
            GradeMedals {
                position: 0,
                grade_id: seed.grade_id,
                grade_name: seed.grade_name,
                gold: tally.gold,
                silver: tally.silver,
                bronze: tally.bronze,
                total: tally.gold + tally.silver + tally.bronze,
            }
        })
        .collect();

    medals.sort_by(|a, b| {
        b.gold
            .cmp(&a.gold)
            .then(b.silver.cmp(&a.silver))
            .then(b.bronze.cmp(&a.bronze))
    });
    for (index, row) in medals.iter_mut().enumerate() {
        row.position = index + 1;
    }

    medals
}

/// Class leaderboard from the rank/points currently stored on final-round
/// results. Run a recompute first if results were corrected.
pub async fn class_totals(pool: &PgPool, grade_id: Option<Uuid>) -> Result<Vec<ClassStanding>> {
    let mut conn = pool.acquire().await?;
    let mut repo = StandingsRepository::new(&mut *conn);

    let seeds = repo.class_seeds(grade_id).await?;
    let results = repo.final_results(grade_id).await?;

    Ok(tally_class_totals(seeds, &results))
}

pub async fn grade_medals(pool: &PgPool) -> Result<Vec<GradeMedals>> {
    let mut conn = pool.acquire().await?;
    let mut repo = StandingsRepository::new(&mut *conn);

    let seeds = repo.grade_seeds().await?;
    let results = repo.final_results(None).await?;

    Ok(tally_grade_medals(seeds, &results))
}
