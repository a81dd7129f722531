use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::source::DEFAULT_BASE_URL;

/// File name of the database under the default data directory
pub const DEFAULT_DB_NAME: &str = "mlb-stats.db";
/// Trailing seasons loaded in addition to the anchor season
pub const DEFAULT_YEARS: u32 = 4;
/// Upper bound accepted for `--years`
pub const MAX_YEARS: u32 = 200;
/// The two top-level professional leagues (American, National) queried for stats
pub const DEFAULT_STAT_LEAGUES: [i64; 2] = [103, 104];
pub const DEFAULT_PLAYER_POOL: &str = "All";

/// Settings for one full refresh
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub base_url: String,
    pub db_path: PathBuf,
    pub years: u32,
    pub stat_leagues: Vec<i64>,
    pub player_pool: String,
    /// Date the season window is computed from
    pub today: NaiveDate,
}

impl LoadConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            db_path,
            years: DEFAULT_YEARS,
            stat_leagues: DEFAULT_STAT_LEAGUES.to_vec(),
            player_pool: DEFAULT_PLAYER_POOL.to_string(),
            today: Local::now().date_naive(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Resolve the database path: an explicit path wins, else the platform data directory
pub fn resolve_db_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => Ok(path),
        None => {
            let proj_dirs = ProjectDirs::from("", "", "mlb-stats-to-sqlite")
                .context("Could not determine data directory")?;
            Ok(proj_dirs.data_dir().join(DEFAULT_DB_NAME))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_db_path_wins() {
        let path = PathBuf::from("/tmp/stats.db");
        assert_eq!(resolve_db_path(Some(path.clone())).unwrap(), path);
    }

    #[test]
    fn test_defaults() {
        let config = LoadConfig::new(PathBuf::from("x.db"));
        assert_eq!(config.years, 4);
        assert_eq!(config.stat_leagues, vec![103, 104]);
        assert_eq!(config.player_pool, "All");
        assert_eq!(config.base_url, "http://statsapi.mlb.com");
    }
}
