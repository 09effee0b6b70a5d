use anyhow::{Context, Result, anyhow};
use storage::services::ranking_engine::TieBreak;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub tie_break: TieBreak,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            tie_break: parse_tie_break(std::env::var("RANKING_TIE_BREAK").ok().as_deref())?,
        })
    }
}

fn parse_tie_break(value: Option<&str>) -> Result<TieBreak> {
    match value.map(str::trim) {
        None | Some("") => Ok(TieBreak::default()),
        Some(value) => value
            .parse()
            .map_err(|e: String| anyhow!(e))
            .context("Invalid RANKING_TIE_BREAK"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_break_defaults_to_entry_order() {
        assert_eq!(parse_tie_break(None).unwrap(), TieBreak::EntryOrder);
        assert_eq!(parse_tie_break(Some(" ")).unwrap(), TieBreak::EntryOrder);
    }

    #[test]
    fn test_tie_break_reads_policy_name() {
        assert_eq!(
            parse_tie_break(Some("student_number")).unwrap(),
            TieBreak::StudentNumber
        );
        assert!(parse_tie_break(Some("coin_flip")).is_err());
    }
}
