//! Dimension table schemas. Fact tables live in [`super::stat_groups`].

use super::stat_groups::StatGroup;
use super::types::*;

/// Prefix of tables fully replaced on every load
pub const DIMENSION_PREFIX: &str = "d_";
/// Prefix of per-stat-group fact tables
pub const FACT_PREFIX: &str = "f_";

pub static LEAGUE_LEVELS: TableSchema = TableSchema {
    name: "d_leaguelevel",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("abbreviation", ColumnType::Text),
        Column::new("name", ColumnType::Text),
        Column::new("link", ColumnType::Text),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    load_mode: LoadMode::Replace,
};

pub static TEAMS: TableSchema = TableSchema {
    name: "d_teams",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("name", ColumnType::Text),
        Column::new("leaguelevel_id", ColumnType::Integer).lookup("sport", "id"),
        Column::new("team_code", ColumnType::Text),
    ],
    primary_key: &["id"],
    foreign_keys: &[ForeignKey::new("leaguelevel_id", "d_leaguelevel")],
    load_mode: LoadMode::Replace,
};

/// Players are keyed per league level: one person may appear on several levels' rosters.
pub static PLAYERS: TableSchema = TableSchema {
    name: "d_player",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("full_name", ColumnType::Text),
        Column::new("first_name", ColumnType::Text),
        Column::new("last_name", ColumnType::Text),
        Column::new("primary_number", ColumnType::Text),
        Column::new("birth_date", ColumnType::Date),
        Column::new("height", ColumnType::Text),
        Column::new("weight", ColumnType::Integer),
        Column::new("current_team", ColumnType::Integer).lookup("currentTeam", "id"),
        Column::new("primary_position", ColumnType::Text).lookup("primaryPosition", "code"),
        Column::new("mlb_debut_date", ColumnType::Date),
        Column::new("bat_side", ColumnType::Text).lookup("batSide", "code"),
        Column::new("pitch_hand", ColumnType::Text).lookup("pitchHand", "code"),
        Column::required("league_id", ColumnType::Integer).derived(),
    ],
    primary_key: &["id", "league_id"],
    foreign_keys: &[
        ForeignKey::new("current_team", "d_teams"),
        ForeignKey::new("league_id", "d_leaguelevel"),
    ],
    load_mode: LoadMode::Append,
};

/// Every managed table, dimensions first
pub fn all_tables() -> Vec<&'static TableSchema> {
    let mut tables = vec![&LEAGUE_LEVELS, &TEAMS, &PLAYERS];
    tables.extend(StatGroup::ALL.iter().map(|g| g.schema()));
    tables
}

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    all_tables().into_iter().find(|t| t.name == name)
}

/// Whether a table name belongs to the live dimension/fact set
pub fn is_managed_table(name: &str) -> bool {
    name.starts_with(DIMENSION_PREFIX) || name.starts_with(FACT_PREFIX)
}
