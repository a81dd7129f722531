use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::client::StatsSource;
use crate::schema::StatGroup;

pub const SPORTS_PATH: &str = "/api/v1/sports";
pub const TEAMS_PATH: &str = "/api/v1/teams";
pub const STATS_PATH: &str = "/api/v1/stats";
pub const STAT_GROUPS_PATH: &str = "/api/v1/statGroups";

/// A response did not have the shape the loader expects
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Response from {path} has no `{key}` list")]
    MissingList { path: String, key: &'static str },

    #[error("Response from {path} is not a list")]
    NotAList { path: String },

    #[error("Malformed sport record: {0}")]
    Sport(#[from] serde_json::Error),
}

/// The parts of a sport record the loader needs to keep iterating
#[derive(Debug, Clone, Deserialize)]
pub struct SportRef {
    pub id: i64,
    pub link: String,
}

/// Fetches the Stats API resources the loader consumes
pub struct Extractor<S> {
    source: S,
}

impl<S: StatsSource> Extractor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// All sports (league levels), or one when `id` is given
    pub fn fetch_sports(&self, id: Option<i64>) -> Result<Vec<Value>> {
        let path = match id {
            Some(id) => format!("{}/{}", SPORTS_PATH, id),
            None => SPORTS_PATH.to_string(),
        };
        self.fetch_list(&path, &[], "sports")
    }

    /// Players on a sport's roster, addressed by the sport's `link`
    pub fn fetch_players(&self, sport_link: &str) -> Result<Vec<Value>> {
        let path = format!("{}/players", sport_link.trim_end_matches('/'));
        self.fetch_list(&path, &[], "people")
    }

    pub fn fetch_teams(&self) -> Result<Vec<Value>> {
        self.fetch_list(TEAMS_PATH, &[], "teams")
    }

    /// Display names of every stat group the API knows about
    pub fn fetch_stat_groups(&self) -> Result<Vec<String>> {
        let body = self.source.get_json(STAT_GROUPS_PATH, &[])?;
        let groups = body.as_array().ok_or_else(|| PayloadError::NotAList {
            path: STAT_GROUPS_PATH.to_string(),
        })?;

        Ok(groups
            .iter()
            .filter_map(|g| g.get("displayName").and_then(|n| n.as_str()))
            .map(str::to_string)
            .collect())
    }

    /// One page of season splits for a (group, season, league) combination
    pub fn fetch_season_stats(
        &self,
        group: StatGroup,
        pool: &str,
        season: i32,
        league_id: i64,
    ) -> Result<Vec<Value>> {
        let query = [
            ("stats", "season".to_string()),
            ("playerPool", pool.to_string()),
            ("group", group.as_str().to_string()),
            ("season", season.to_string()),
            ("leagueId", league_id.to_string()),
        ];
        let body = self.source.get_json(STATS_PATH, &query)?;
        let stats = body
            .get("stats")
            .and_then(|s| s.as_array())
            .ok_or_else(|| PayloadError::MissingList {
                path: STATS_PATH.to_string(),
                key: "stats",
            })?;

        let Some(first) = stats.first() else {
            return Ok(Vec::new());
        };
        Ok(first
            .get("splits")
            .and_then(|s| s.as_array())
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_list(&self, path: &str, query: &[(&str, String)], key: &'static str) -> Result<Vec<Value>> {
        let mut body = self.source.get_json(path, query)?;
        match body.get_mut(key).map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(PayloadError::MissingList {
                path: path.to_string(),
                key,
            }
            .into()),
        }
    }
}

/// Pull `{id, link}` out of raw sport records
pub fn sport_refs(sports: &[Value]) -> Result<Vec<SportRef>, PayloadError> {
    sports
        .iter()
        .map(|s| SportRef::deserialize(s).map_err(PayloadError::from))
        .collect()
}
