//! Declared fact table schemas, one per stat group.
//!
//! The API returns a group-dependent `stat` object on every season split. Each group we load
//! declares its statistic columns up front; undeclared keys are skipped at transform time.

use std::fmt;
use std::str::FromStr;

use super::types::*;

/// Stat groups that are loaded into fact tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatGroup {
    Hitting,
    Pitching,
}

impl StatGroup {
    pub const ALL: [StatGroup; 2] = [StatGroup::Hitting, StatGroup::Pitching];

    /// Group name as used by the API (`group=` parameter and `displayName`)
    pub fn as_str(self) -> &'static str {
        match self {
            StatGroup::Hitting => "hitting",
            StatGroup::Pitching => "pitching",
        }
    }

    pub fn schema(self) -> &'static TableSchema {
        match self {
            StatGroup::Hitting => &HITTING,
            StatGroup::Pitching => &PITCHING,
        }
    }

    /// Match an API display name; groups without a declared schema yield `None`
    pub fn from_display_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl fmt::Display for StatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hitting" => Ok(StatGroup::Hitting),
            "pitching" => Ok(StatGroup::Pitching),
            other => Err(format!("Unknown stat group: {}", other)),
        }
    }
}

const SPLIT_FOREIGN_KEYS: &[ForeignKey] = &[
    ForeignKey::new("player_id", "d_player"),
    ForeignKey::new("team_id", "d_teams"),
    ForeignKey::new("leaguelevel_id", "d_leaguelevel"),
];

pub static HITTING: TableSchema = TableSchema {
    name: "f_hitting",
    columns: &[
        Column::new("player_id", ColumnType::Integer).lookup("player", "id"),
        Column::new("team_id", ColumnType::Integer).lookup("team", "id"),
        Column::new("leaguelevel_id", ColumnType::Integer).lookup("sport", "id"),
        Column::new("season", ColumnType::Integer),
        Column::new("game_type", ColumnType::Text),
        Column::stat("games_played", ColumnType::Integer),
        Column::stat("ground_outs", ColumnType::Integer),
        Column::stat("air_outs", ColumnType::Integer),
        Column::stat("runs", ColumnType::Integer),
        Column::stat("doubles", ColumnType::Integer),
        Column::stat("triples", ColumnType::Integer),
        Column::stat("home_runs", ColumnType::Integer),
        Column::stat("strike_outs", ColumnType::Integer),
        Column::stat("base_on_balls", ColumnType::Integer),
        Column::stat("intentional_walks", ColumnType::Integer),
        Column::stat("hits", ColumnType::Integer),
        Column::stat("hit_by_pitch", ColumnType::Integer),
        Column::stat("avg", ColumnType::Real),
        Column::stat("at_bats", ColumnType::Integer),
        Column::stat("obp", ColumnType::Real),
        Column::stat("slg", ColumnType::Real),
        Column::stat("ops", ColumnType::Real),
        Column::stat("caught_stealing", ColumnType::Integer),
        Column::stat("stolen_bases", ColumnType::Integer),
        Column::stat("stolen_base_percentage", ColumnType::Real),
        Column::stat("ground_into_double_play", ColumnType::Integer),
        Column::stat("number_of_pitches", ColumnType::Integer),
        Column::stat("plate_appearances", ColumnType::Integer),
        Column::stat("total_bases", ColumnType::Integer),
        Column::stat("rbi", ColumnType::Integer),
        Column::stat("left_on_base", ColumnType::Integer),
        Column::stat("sac_bunts", ColumnType::Integer),
        Column::stat("sac_flies", ColumnType::Integer),
        Column::stat("babip", ColumnType::Real),
        Column::stat("ground_outs_to_airouts", ColumnType::Real),
        Column::stat("catchers_interference", ColumnType::Integer),
        Column::stat("at_bats_per_home_run", ColumnType::Real),
    ],
    primary_key: &[],
    foreign_keys: SPLIT_FOREIGN_KEYS,
    load_mode: LoadMode::Append,
};

pub static PITCHING: TableSchema = TableSchema {
    name: "f_pitching",
    columns: &[
        Column::new("player_id", ColumnType::Integer).lookup("player", "id"),
        Column::new("team_id", ColumnType::Integer).lookup("team", "id"),
        Column::new("leaguelevel_id", ColumnType::Integer).lookup("sport", "id"),
        Column::new("season", ColumnType::Integer),
        Column::new("game_type", ColumnType::Text),
        Column::stat("games_played", ColumnType::Integer),
        Column::stat("games_started", ColumnType::Integer),
        Column::stat("ground_outs", ColumnType::Integer),
        Column::stat("air_outs", ColumnType::Integer),
        Column::stat("runs", ColumnType::Integer),
        Column::stat("doubles", ColumnType::Integer),
        Column::stat("triples", ColumnType::Integer),
        Column::stat("home_runs", ColumnType::Integer),
        Column::stat("strike_outs", ColumnType::Integer),
        Column::stat("base_on_balls", ColumnType::Integer),
        Column::stat("intentional_walks", ColumnType::Integer),
        Column::stat("hits", ColumnType::Integer),
        Column::stat("hit_by_pitch", ColumnType::Integer),
        Column::stat("avg", ColumnType::Real),
        Column::stat("at_bats", ColumnType::Integer),
        Column::stat("obp", ColumnType::Real),
        Column::stat("slg", ColumnType::Real),
        Column::stat("ops", ColumnType::Real),
        Column::stat("caught_stealing", ColumnType::Integer),
        Column::stat("stolen_bases", ColumnType::Integer),
        Column::stat("stolen_base_percentage", ColumnType::Real),
        Column::stat("ground_into_double_play", ColumnType::Integer),
        Column::stat("number_of_pitches", ColumnType::Integer),
        Column::stat("era", ColumnType::Real),
        Column::stat("innings_pitched", ColumnType::Real),
        Column::stat("wins", ColumnType::Integer),
        Column::stat("losses", ColumnType::Integer),
        Column::stat("saves", ColumnType::Integer),
        Column::stat("save_opportunities", ColumnType::Integer),
        Column::stat("holds", ColumnType::Integer),
        Column::stat("blown_saves", ColumnType::Integer),
        Column::stat("earned_runs", ColumnType::Integer),
        Column::stat("whip", ColumnType::Real),
        Column::stat("batters_faced", ColumnType::Integer),
        Column::stat("outs", ColumnType::Integer),
        Column::stat("games_pitched", ColumnType::Integer),
        Column::stat("complete_games", ColumnType::Integer),
        Column::stat("shutouts", ColumnType::Integer),
        Column::stat("strikes", ColumnType::Integer),
        Column::stat("strike_percentage", ColumnType::Real),
        Column::stat("hit_batsmen", ColumnType::Integer),
        Column::stat("balks", ColumnType::Integer),
        Column::stat("wild_pitches", ColumnType::Integer),
        Column::stat("pickoffs", ColumnType::Integer),
        Column::stat("total_bases", ColumnType::Integer),
        Column::stat("ground_outs_to_airouts", ColumnType::Real),
        Column::stat("win_percentage", ColumnType::Real),
        Column::stat("pitches_per_inning", ColumnType::Real),
        Column::stat("games_finished", ColumnType::Integer),
        Column::stat("strikeout_walk_ratio", ColumnType::Real),
        Column::stat("strikeouts_per_9_inn", ColumnType::Real),
        Column::stat("walks_per_9_inn", ColumnType::Real),
        Column::stat("hits_per_9_inn", ColumnType::Real),
        Column::stat("runs_scored_per_9", ColumnType::Real),
        Column::stat("home_runs_per_9", ColumnType::Real),
        Column::stat("inherited_runners", ColumnType::Integer),
        Column::stat("inherited_runners_scored", ColumnType::Integer),
        Column::stat("catchers_interference", ColumnType::Integer),
        Column::stat("sac_bunts", ColumnType::Integer),
        Column::stat("sac_flies", ColumnType::Integer),
    ],
    primary_key: &[],
    foreign_keys: SPLIT_FOREIGN_KEYS,
    load_mode: LoadMode::Append,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_display_name() {
        assert_eq!(StatGroup::from_display_name("hitting"), Some(StatGroup::Hitting));
        assert_eq!(StatGroup::from_display_name("Pitching"), Some(StatGroup::Pitching));
        assert_eq!(StatGroup::from_display_name("fielding"), None);
    }

    #[test]
    fn test_group_tables_are_distinct_shapes() {
        let hitting: HashSet<_> = HITTING.column_names().into_iter().collect();
        let pitching: HashSet<_> = PITCHING.column_names().into_iter().collect();
        assert!(pitching.contains("era"));
        assert!(!hitting.contains("era"));
        assert!(hitting.contains("rbi"));
        assert!(!pitching.contains("rbi"));
    }

    #[test]
    fn test_column_names_unique() {
        for group in StatGroup::ALL {
            let names = group.schema().column_names();
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(names.len(), unique.len(), "duplicate column in {}", group);
        }
    }

    #[test]
    fn test_table_name_follows_group() {
        for group in StatGroup::ALL {
            assert_eq!(group.schema().name, format!("f_{}", group));
        }
    }
}
