use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sparse rank → points mapping. Ranks missing from the table earn zero.
///
/// Serialized as a JSON object keyed by the rank as a string, e.g.
/// `{"1": 9, "2": 7}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointTable(BTreeMap<u32, i32>);

impl PointTable {
    pub fn new(entries: impl IntoIterator<Item = (u32, i32)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Points awarded for finishing at `rank`.
    pub fn points_for(&self, rank: i32) -> i32 {
        u32::try_from(rank)
            .ok()
            .and_then(|rank| self.0.get(&rank).copied())
            .unwrap_or(0)
    }

    /// The table every event starts from: 9-7-6-5-4-3-2-1 for the top eight.
    pub fn standard() -> Self {
        Self::new([(1, 9), (2, 7), (3, 6), (4, 5), (5, 4), (6, 3), (7, 2), (8, 1)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ranks start at 1 and points are never negative.
    pub fn validate(&self) -> Result<(), String> {
        if self.0.contains_key(&0) {
            return Err("point table ranks start at 1".to_string());
        }
        if let Some((rank, points)) = self.iter().find(|(_, points)| *points < 0) {
            return Err(format!("rank {rank} has negative points ({points})"));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.0.iter().map(|(rank, points)| (*rank, *points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_outside_table_earn_nothing() {
        let table = PointTable::new([(1, 9), (2, 7), (3, 6)]);

        assert_eq!(table.points_for(1), 9);
        assert_eq!(table.points_for(3), 6);
        assert_eq!(table.points_for(4), 0);
        assert_eq!(table.points_for(0), 0);
        assert_eq!(table.points_for(-1), 0);
    }

    #[test]
    fn test_json_uses_string_rank_keys() {
        let table: PointTable = serde_json::from_str(r#"{"1": 9, "2": 7}"#).unwrap();

        assert_eq!(table.points_for(2), 7);
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"1":9,"2":7}"#);
    }

    #[test]
    fn test_validate_rejects_rank_zero_and_negative_points() {
        assert!(PointTable::standard().validate().is_ok());
        assert!(PointTable::default().validate().is_ok());
        assert!(PointTable::new([(0, 5)]).validate().is_err());

        let error = PointTable::new([(1, 9), (2, -1)]).validate().unwrap_err();
        assert!(error.contains("rank 2"));
    }

    #[test]
    fn test_standard_table_covers_top_eight() {
        let table = PointTable::standard();

        assert_eq!(table.points_for(1), 9);
        assert_eq!(table.points_for(8), 1);
        assert_eq!(table.points_for(9), 0);
        assert_eq!(table.iter().count(), 8);
    }
}
