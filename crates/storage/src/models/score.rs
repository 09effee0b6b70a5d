use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "round", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Round {
    Preliminary,
    Final,
}

impl Round {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preliminary => "preliminary",
            Self::Final => "final",
        }
    }
}

impl FromStr for Round {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "preliminary" => Ok(Self::Preliminary),
            "final" => Ok(Self::Final),
            other => Err(Rejection::BadRound {
                round: other.to_string(),
            }),
        }
    }
}

/// Decimal places a stored value keeps (`NUMERIC(10, 3)`).
pub const VALUE_SCALE: u32 = 3;

/// Values must stay below this in magnitude (7 integer digits).
pub const VALUE_LIMIT: i64 = 10_000_000;

/// Longest invalidation or correction reason the store accepts.
pub const MAX_REASON_CHARS: usize = 200;

/// Checks a measured value fits the stored precision without rounding.
pub fn check_value(value: &Decimal) -> Result<(), String> {
    if value.normalize().scale() > VALUE_SCALE {
        return Err(format!(
            "value {value} has more than {VALUE_SCALE} decimal places"
        ));
    }
    if value.abs() >= Decimal::from(VALUE_LIMIT) {
        return Err(format!("value {value} is out of range"));
    }
    Ok(())
}

pub fn check_reason_length(reason: &str) -> Result<(), String> {
    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(format!(
            "reason must be at most {MAX_REASON_CHARS} characters"
        ));
    }
    Ok(())
}

/// One measured result for one registration in one round.
///
/// `rank` and `points` are written by the ranking engine and go stale after a
/// correction or invalidation until the next recompute.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub score_id: Uuid,
    pub registration_id: Uuid,
    pub round: Round,
    pub value: Decimal,
    pub is_valid: bool,
    pub invalid_reason: Option<String>,
    pub rank: Option<i32>,
    pub points: i32,
    pub update_reason: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_within_stored_precision_is_accepted() {
        assert!(check_value(&Decimal::from_str("12.950").unwrap()).is_ok());
        assert!(check_value(&Decimal::from_str("9999999.999").unwrap()).is_ok());
        assert!(check_value(&Decimal::from_str("-0.5").unwrap()).is_ok());
    }

    #[test]
    fn test_fourth_decimal_place_is_refused() {
        let error = check_value(&Decimal::from_str("12.9555").unwrap()).unwrap_err();

        assert!(error.contains("12.9555"));
    }

    #[test]
    fn test_value_beyond_seven_digits_is_refused() {
        assert!(check_value(&Decimal::from(VALUE_LIMIT)).is_err());
        assert!(check_value(&Decimal::from(-VALUE_LIMIT)).is_err());
    }

    #[test]
    fn test_reason_length_counts_characters() {
        assert!(check_reason_length(&"é".repeat(MAX_REASON_CHARS)).is_ok());
        assert!(check_reason_length(&"x".repeat(MAX_REASON_CHARS + 1)).is_err());
    }

    #[test]
    fn test_round_parses_known_values() {
        assert_eq!("final".parse::<Round>().unwrap(), Round::Final);
        assert_eq!(" preliminary ".parse::<Round>().unwrap(), Round::Preliminary);
    }

    #[test]
    fn test_unknown_round_is_bad_round() {
        let err = "semifinal".parse::<Round>().unwrap_err();

        match err {
            Rejection::BadRound { round } => assert_eq!(round, "semifinal"),
            other => panic!("unexpected rejection: {other:?}"),
        }
    }
}
