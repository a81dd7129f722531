//! One full refresh of the database from the Stats API.
//!
//! Every table is written to a `stage_` copy first. Only when all of them are loaded are the
//! live tables swapped out in a single transaction, so a failed run leaves the previous data
//! readable and untouched.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::LoadConfig;
use crate::schema::{StatGroup, LEAGUE_LEVELS, PLAYERS, TEAMS};
use crate::source::{sport_refs, Extractor, HttpStatsSource, StatsSource};
use crate::transform::{transform_record, transform_records, RecordSet, SqlValue};
use crate::ui::{Phase, Ui};
use crate::writer::SqliteWriter;

/// Last month counted as part of a season; earlier dates anchor on the previous year
const SEASON_END_MONTH: u32 = 10;

/// Seasons to load: `[anchor - years, anchor]`, where the anchor is last year until the
/// current regular season is over (after October), this year otherwise.
pub fn season_window(today: NaiveDate, years: u32) -> Result<RangeInclusive<i32>> {
    let anchor = if today.month() <= SEASON_END_MONTH {
        today.year() - 1
    } else {
        today.year()
    };
    let first = i32::try_from(years)
        .ok()
        .and_then(|years| anchor.checked_sub(years))
        .with_context(|| format!("Season window of {} years before {} is out of range", years, anchor))?;
    Ok(first..=anchor)
}

/// Placeholder team for amateur (e.g. high school) players with no affiliated club
pub fn unknown_team() -> Value {
    json!({
        "id": 1,
        "name": "Unknown HS Team",
        "sport": {"id": 586},
        "teamCode": "UNK",
    })
}

/// What a refresh loaded
#[derive(Debug, Clone)]
pub struct RefreshSummary {
    /// Rows written per table
    pub rows: BTreeMap<String, u64>,
    pub seasons: RangeInclusive<i32>,
    pub groups: Vec<StatGroup>,
    pub elapsed: Duration,
}

impl RefreshSummary {
    pub fn total_rows(&self) -> u64 {
        self.rows.values().sum()
    }

    pub fn rows_in(&self, table: &str) -> u64 {
        self.rows.get(table).copied().unwrap_or(0)
    }
}

/// Refresh the database described by `config` from the live Stats API
pub fn refresh_database(config: &LoadConfig, ui: &mut impl Ui) -> Result<RefreshSummary> {
    let extractor = Extractor::new(HttpStatsSource::new(&config.base_url)?);
    let mut writer = SqliteWriter::open(&config.db_path)?;

    let summary = run_refresh(&extractor, &mut writer, config, ui)?;
    writer.finalize()?;

    Ok(summary)
}

/// Drive the refresh against any source and an open writer
pub fn run_refresh<S: StatsSource>(
    extractor: &Extractor<S>,
    writer: &mut SqliteWriter,
    config: &LoadConfig,
    ui: &mut impl Ui,
) -> Result<RefreshSummary> {
    let start = Instant::now();
    let seasons = season_window(config.today, config.years)?;
    let mut rows = RowTally::default();

    // Staging
    ui.set_phase(Phase::Preparing);
    ui.set_info(format!(
        "{} | seasons {}-{}",
        config.db_path.display(),
        seasons.start(),
        seasons.end()
    ));
    let stale = writer.clear_staging()?;
    if stale > 0 {
        ui.log(format!("Dropped {} staging tables from an interrupted run", stale));
    }
    info!(seasons = ?seasons, "starting refresh");

    // Dimensions: teams, then league levels
    ui.set_phase(Phase::LoadingTeams);
    let teams = extractor.fetch_teams()?;
    let mut team_set = transform_records(&teams, &TEAMS);
    team_set.push(transform_record(&unknown_team(), &TEAMS));
    let count = writer.stage(&team_set)?;
    rows.add(TEAMS.name, count, ui);
    ui.log(format!("{}: {} teams", TEAMS.name, count));

    ui.set_phase(Phase::LoadingLeagues);
    let sports = extractor.fetch_sports(None)?;
    let sports_ref = sport_refs(&sports)?;
    let count = writer.stage(&transform_records(&sports, &LEAGUE_LEVELS))?;
    rows.add(LEAGUE_LEVELS.name, count, ui);
    ui.log(format!("{}: {} league levels", LEAGUE_LEVELS.name, count));

    // Players, one roster per league level
    ui.set_phase(Phase::LoadingPlayers);
    writer.stage(&RecordSet::empty(&PLAYERS))?;
    rows.add(PLAYERS.name, 0, ui);
    for (i, sport) in sports_ref.iter().enumerate() {
        check_cancel(ui)?;
        ui.set_progress(i as u64, sports_ref.len() as u64, format!("sport {}", sport.id));

        let players = extractor.fetch_players(&sport.link)?;
        let mut set = transform_records(&players, &PLAYERS);
        set.stamp("league_id", SqlValue::Integer(sport.id));
        let count = writer.stage(&set)?;
        rows.add(PLAYERS.name, count, ui);
    }
    ui.clear_progress();
    ui.log(format!("{}: {} players", PLAYERS.name, rows.get(PLAYERS.name)));

    // Facts: season x group x league
    ui.set_phase(Phase::LoadingStats);
    let mut groups: Vec<StatGroup> = Vec::new();
    for name in extractor.fetch_stat_groups()? {
        if let Some(group) = StatGroup::from_display_name(&name) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }
    for group in &groups {
        writer.stage(&RecordSet::empty(group.schema()))?;
        rows.add(group.schema().name, 0, ui);
    }

    let total = (seasons.clone().count() * groups.len() * config.stat_leagues.len()) as u64;
    let mut done = 0;
    for season in seasons.clone() {
        for group in &groups {
            for &league in &config.stat_leagues {
                check_cancel(ui)?;
                ui.set_progress(done, total, format!("{} {} league {}", season, group, league));

                let splits =
                    extractor.fetch_season_stats(*group, &config.player_pool, season, league)?;
                let count = writer.stage(&transform_records(&splits, group.schema()))?;
                rows.add(group.schema().name, count, ui);
                done += 1;
            }
        }
    }
    ui.clear_progress();

    // Publish
    ui.set_phase(Phase::Swapping);
    let swapped = writer.swap_staged()?;
    ui.log(format!("Published {} tables", swapped.len()));

    let summary = RefreshSummary {
        rows: rows.0,
        seasons,
        groups,
        elapsed: start.elapsed(),
    };
    info!(
        rows = summary.total_rows(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "refresh complete"
    );
    Ok(summary)
}

#[derive(Default)]
struct RowTally(BTreeMap<String, u64>);

impl RowTally {
    fn add(&mut self, table: &str, count: u64, ui: &mut impl Ui) {
        let total = self.0.entry(table.to_string()).or_insert(0);
        *total += count;
        ui.table_rows(table, *total);
    }

    fn get(&self, table: &str) -> u64 {
        self.0.get(table).copied().unwrap_or(0)
    }
}

fn check_cancel(ui: &mut impl Ui) -> Result<()> {
    if ui.cancel_requested() {
        bail!("Refresh cancelled; live tables were left unchanged");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_before_season_end_anchors_last_year() {
        assert_eq!(season_window(date(2024, 3, 1), 4).unwrap(), 2019..=2023);
        assert_eq!(season_window(date(2024, 10, 31), 4).unwrap(), 2019..=2023);
    }

    #[test]
    fn test_window_after_season_end_anchors_this_year() {
        assert_eq!(season_window(date(2024, 11, 1), 4).unwrap(), 2020..=2024);
        assert_eq!(season_window(date(2024, 12, 31), 0).unwrap(), 2024..=2024);
    }

    #[test]
    fn test_window_rejects_years_that_do_not_fit() {
        assert!(season_window(date(2024, 3, 1), 3_000_000_000).is_err());
        assert!(season_window(date(2024, 3, 1), i32::MAX as u32 + 1).is_err());
    }

    #[test]
    fn test_unknown_team_transforms() {
        let row = transform_record(&unknown_team(), &TEAMS);
        assert_eq!(row.get("id"), &SqlValue::Integer(1));
        assert_eq!(row.get("leaguelevel_id"), &SqlValue::Integer(586));
        assert_eq!(row.get("team_code"), &SqlValue::Text("UNK".into()));
    }
}
