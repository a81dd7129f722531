//! Read-only queries over the live tables.
//!
//! Every user-supplied filter is bound as a parameter; only schema identifiers are
//! interpolated into SQL text.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;

use crate::schema::{StatGroup, LEAGUE_LEVELS};
use crate::transform::SqlValue;

/// Level filter value meaning "every league level"
pub const ALL_LEVELS: &str = "all";

/// Open an existing database for reading.
///
/// The connection is opened read-write without create so it can join the loader's WAL,
/// then locked down with `query_only`.
pub fn open_readonly(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database {:?} (run `load` first?)", db_path))?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    Ok(conn)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueLevel {
    pub id: i64,
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamListing {
    pub id: i64,
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub league: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerListing {
    pub id: i64,
    pub full_name: Option<String>,
    pub last_name: Option<String>,
    pub abbreviation: Option<String>,
    pub team_id: i64,
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    pub id: i64,
    pub full_name: Option<String>,
    pub team: Option<String>,
    pub primary_number: Option<String>,
    pub abbreviation: Option<String>,
    pub league: Option<String>,
    pub position: &'static str,
    pub height: Option<String>,
    pub weight: Option<i64>,
    pub bat_side: Option<String>,
    pub pitch_hand: Option<String>,
    /// `MM/DD/YYYY`
    pub mlb_debut_date: Option<String>,
    /// `MM/DD/YYYY`
    pub birth_date: Option<String>,
}

/// One season split of a player's career table
#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    pub season: Option<i64>,
    pub team_code: Option<String>,
    /// Declared statistic columns, in schema order
    pub values: Vec<(&'static str, SqlValue)>,
}

impl StatLine {
    pub fn value(&self, column: &str) -> &SqlValue {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, v)| v)
            .unwrap_or(&SqlValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCareer {
    pub profile: PlayerProfile,
    pub hitting: Vec<StatLine>,
    pub pitching: Vec<StatLine>,
}

/// Treat `None`, empty and `all` as "no level filter"
fn level_param(level: Option<&str>) -> Option<&str> {
    level.filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case(ALL_LEVELS))
}

/// Display label for a primary position code
pub fn position_label(code: Option<&str>) -> &'static str {
    match code {
        Some("1") => "P",
        Some("2") => "C",
        Some("3") => "1B",
        Some("4") => "2B",
        Some("5") => "3B",
        Some("6") => "SS",
        Some("7") => "LF",
        Some("8") => "CF",
        Some("9") => "RF",
        _ => "UTIL",
    }
}

fn us_date(stored: Option<String>) -> Option<String> {
    stored
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .map(|d| d.format("%m/%d/%Y").to_string())
}

pub fn list_levels(conn: &Connection) -> Result<Vec<LeagueLevel>> {
    let sql = format!(
        "SELECT DISTINCT id, abbreviation, name, link FROM {} ORDER BY id",
        LEAGUE_LEVELS.name
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(LeagueLevel {
                id: row.get(0)?,
                abbreviation: row.get(1)?,
                name: row.get(2)?,
                link: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Teams, optionally restricted to one league level abbreviation
pub fn list_teams(conn: &Connection, level: Option<&str>) -> Result<Vec<TeamListing>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT t.id, t.name, l.abbreviation, l.name
         FROM d_teams t
         INNER JOIN d_leaguelevel l ON l.id = t.leaguelevel_id
         WHERE (?1 IS NULL OR l.abbreviation = ?1)
         ORDER BY t.name",
    )?;
    let rows = stmt
        .query_map(params![level_param(level)], |row| {
            Ok(TeamListing {
                id: row.get(0)?,
                name: row.get(1)?,
                abbreviation: row.get(2)?,
                league: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Players by league level abbreviation and/or current team, ordered by name.
///
/// Players without a current team do not match the team join and are not listed.
pub fn list_players(
    conn: &Connection,
    level: Option<&str>,
    team: Option<i64>,
) -> Result<Vec<PlayerListing>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT p.id, p.full_name, p.last_name, l.abbreviation, t.id, t.name, p.first_name
         FROM d_player p
         INNER JOIN d_leaguelevel l ON l.id = p.league_id
         INNER JOIN d_teams t ON t.id = p.current_team
         WHERE (?1 IS NULL OR l.abbreviation = ?1)
           AND (?2 IS NULL OR t.id = ?2)
         ORDER BY p.last_name ASC, p.first_name ASC",
    )?;
    let team = team.filter(|&t| t != 0);
    let rows = stmt
        .query_map(params![level_param(level), team], |row| {
            Ok(PlayerListing {
                id: row.get(0)?,
                full_name: row.get(1)?,
                last_name: row.get(2)?,
                abbreviation: row.get(3)?,
                team_id: row.get(4)?,
                team: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn profile_from_row(row: &Row) -> rusqlite::Result<PlayerProfile> {
    let position: Option<String> = row.get(6)?;
    Ok(PlayerProfile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        team: row.get(2)?,
        primary_number: row.get(3)?,
        abbreviation: row.get(4)?,
        league: row.get(5)?,
        position: position_label(position.as_deref()),
        height: row.get(7)?,
        weight: row.get(8)?,
        bat_side: row.get(9)?,
        pitch_hand: row.get(10)?,
        mlb_debut_date: us_date(row.get(11)?),
        birth_date: us_date(row.get(12)?),
    })
}

/// One player's profile; the lowest league level id wins when the player is on several rosters
pub fn player_profile(conn: &Connection, id: i64) -> Result<Option<PlayerProfile>> {
    conn.query_row(
        "SELECT p.id, p.full_name, t.name, p.primary_number, l.abbreviation, l.name,
                p.primary_position, p.height, p.weight, p.bat_side, p.pitch_hand,
                p.mlb_debut_date, p.birth_date
         FROM d_player p
         INNER JOIN d_leaguelevel l ON l.id = p.league_id
         LEFT JOIN d_teams t ON t.id = p.current_team
         WHERE p.id = ?1
         ORDER BY p.league_id
         LIMIT 1",
        params![id],
        profile_from_row,
    )
    .optional()
    .with_context(|| format!("Failed to look up player {}", id))
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Season rows for one player and stat group, newest first
pub fn stat_lines(conn: &Connection, group: StatGroup, player_id: i64) -> Result<Vec<StatLine>> {
    let schema = group.schema();
    if !table_exists(conn, schema.name)? {
        return Ok(Vec::new());
    }

    let stats: Vec<&'static str> = schema.stat_columns().map(|c| c.name).collect();
    let select: Vec<String> = stats.iter().map(|c| format!("f.{}", c)).collect();
    let sql = format!(
        "SELECT f.season, UPPER(t.team_code), {}
         FROM {} f
         INNER JOIN d_teams t ON t.id = f.team_id
         WHERE f.player_id = ?1
         ORDER BY f.season DESC",
        select.join(", "),
        schema.name
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            let mut values = Vec::with_capacity(stats.len());
            for (i, name) in stats.iter().enumerate() {
                let value: rusqlite::types::Value = row.get(i + 2)?;
                values.push((*name, SqlValue::from(value)));
            }
            Ok(StatLine {
                season: row.get(0)?,
                team_code: row.get(1)?,
                values,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Profile plus career hitting and pitching rows
pub fn player_career(conn: &Connection, id: i64) -> Result<Option<PlayerCareer>> {
    let Some(profile) = player_profile(conn, id)? else {
        return Ok(None);
    };
    Ok(Some(PlayerCareer {
        profile,
        hitting: stat_lines(conn, StatGroup::Hitting, id)?,
        pitching: stat_lines(conn, StatGroup::Pitching, id)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HITTING, LEAGUE_LEVELS, PLAYERS, TEAMS};
    use crate::transform::transform_records;
    use crate::writer::SqliteWriter;
    use serde_json::json;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, Connection) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("read.db");
        let mut writer = SqliteWriter::open(&path).unwrap();

        let levels = transform_records(
            &[
                json!({"id": 1, "abbreviation": "MLB", "name": "Major League Baseball", "link": "/api/v1/sports/1"}),
                json!({"id": 11, "abbreviation": "AAA", "name": "Triple-A", "link": "/api/v1/sports/11"}),
            ],
            &LEAGUE_LEVELS,
        );
        let teams = transform_records(
            &[
                json!({"id": 147, "name": "New York Yankees", "sport": {"id": 1}, "teamCode": "nya"}),
                json!({"id": 233, "name": "Durham Bulls", "sport": {"id": 11}, "teamCode": "dur"}),
            ],
            &TEAMS,
        );
        let mut players = transform_records(
            &[
                json!({"id": 592450, "fullName": "Aaron Judge", "firstName": "Aaron", "lastName": "Judge",
                       "currentTeam": {"id": 147}, "primaryPosition": {"code": "9"},
                       "birthDate": "1992-04-26", "mlbDebutDate": "2016-08-13", "weight": 282}),
                json!({"id": 1, "fullName": "No Team", "lastName": "Team"}),
            ],
            &PLAYERS,
        );
        players.stamp("league_id", SqlValue::Integer(1));
        let mut minors = transform_records(
            &[json!({"id": 700000, "fullName": "Minor Leaguer", "lastName": "Leaguer", "currentTeam": {"id": 233}})],
            &PLAYERS,
        );
        minors.stamp("league_id", SqlValue::Integer(11));
        let hitting = transform_records(
            &[
                json!({"season": "2022", "stat": {"homeRuns": 62}, "player": {"id": 592450}, "team": {"id": 147}, "sport": {"id": 1}}),
                json!({"season": "2023", "stat": {"homeRuns": 37}, "player": {"id": 592450}, "team": {"id": 147}, "sport": {"id": 1}}),
            ],
            &HITTING,
        );

        for set in [&levels, &teams, &players, &minors, &hitting] {
            writer.stage(set).unwrap();
        }
        writer.swap_staged().unwrap();
        drop(writer);

        (dir, open_readonly(&path).unwrap())
    }

    #[test]
    fn test_position_label() {
        assert_eq!(position_label(Some("1")), "P");
        assert_eq!(position_label(Some("6")), "SS");
        assert_eq!(position_label(Some("Y")), "UTIL");
        assert_eq!(position_label(None), "UTIL");
    }

    #[test]
    fn test_list_levels() {
        let (_dir, conn) = seeded();
        let levels = list_levels(&conn).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].abbreviation.as_deref(), Some("AAA"));
    }

    #[test]
    fn test_list_teams_by_level() {
        let (_dir, conn) = seeded();
        assert_eq!(list_teams(&conn, None).unwrap().len(), 2);
        assert_eq!(list_teams(&conn, Some("all")).unwrap().len(), 2);

        let aaa = list_teams(&conn, Some("AAA")).unwrap();
        assert_eq!(aaa.len(), 1);
        assert_eq!(aaa[0].name.as_deref(), Some("Durham Bulls"));
    }

    #[test]
    fn test_list_players_filters() {
        let (_dir, conn) = seeded();
        let all = list_players(&conn, None, None).unwrap();
        // The player without a current team drops out of the team join
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].last_name.as_deref(), Some("Judge"));

        assert_eq!(list_players(&conn, Some("MLB"), None).unwrap().len(), 1);
        assert_eq!(list_players(&conn, None, Some(233)).unwrap().len(), 1);
        assert_eq!(list_players(&conn, None, Some(0)).unwrap().len(), 2);
        assert!(list_players(&conn, Some("MLB"), Some(233)).unwrap().is_empty());
    }

    #[test]
    fn test_quotes_in_filters_do_not_change_query() {
        let (_dir, conn) = seeded();
        let injected = "MLB' OR '1'='1";
        assert!(list_players(&conn, Some(injected), None).unwrap().is_empty());
        assert!(list_teams(&conn, Some(injected)).unwrap().is_empty());
        assert!(list_teams(&conn, Some("'; DROP TABLE d_teams; --")).unwrap().is_empty());
        assert_eq!(list_teams(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn test_player_career() {
        let (_dir, conn) = seeded();
        let career = player_career(&conn, 592450).unwrap().unwrap();

        assert_eq!(career.profile.position, "RF");
        assert_eq!(career.profile.team.as_deref(), Some("New York Yankees"));
        assert_eq!(career.profile.birth_date.as_deref(), Some("04/26/1992"));
        assert_eq!(career.profile.mlb_debut_date.as_deref(), Some("08/13/2016"));
        assert_eq!(career.profile.weight, Some(282));

        assert_eq!(career.hitting.len(), 2);
        assert_eq!(career.hitting[0].season, Some(2023));
        assert_eq!(career.hitting[1].value("home_runs"), &SqlValue::Integer(62));
        assert_eq!(career.hitting[0].team_code.as_deref(), Some("NYA"));
        // No pitching table was loaded
        assert!(career.pitching.is_empty());
    }

    #[test]
    fn test_profile_without_team() {
        let (_dir, conn) = seeded();
        let profile = player_profile(&conn, 1).unwrap().unwrap();
        assert_eq!(profile.team, None);
        assert_eq!(profile.position, "UTIL");
        assert!(player_profile(&conn, 42).unwrap().is_none());
    }
}
