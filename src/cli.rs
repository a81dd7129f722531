use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_YEARS, MAX_YEARS};
use crate::source::DEFAULT_BASE_URL;

#[derive(Parser, Debug)]
#[command(name = "mlb-stats-to-sqlite")]
#[command(version, about = "Load MLB Stats API data into a SQLite database")]
pub struct Cli {
    /// SQLite database path (default: platform data directory)
    #[arg(long, global = true, env = "MLB_STATS_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the database from the Stats API
    Load {
        /// Trailing seasons to load before the most recent completed one
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_YEARS,
            value_parser = clap::value_parser!(u32).range(..=MAX_YEARS as i64)
        )]
        years: u32,

        /// Stats API base URL
        #[arg(long, env = "MLB_STATS_API", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Print progress lines instead of the full-screen view
        #[arg(short, long)]
        plain: bool,
    },

    /// List league levels
    Levels,

    /// List teams, optionally for one league level
    Teams {
        /// League level abbreviation (e.g. MLB, AAA), or `all`
        level: Option<String>,
    },

    /// List players, optionally by league level and team
    Players {
        /// League level abbreviation (e.g. MLB, AAA), or `all`
        level: Option<String>,

        /// Current team id
        #[arg(short, long)]
        team: Option<i64>,
    },

    /// Show one player's profile and career hitting/pitching rows
    Player {
        /// Player id
        id: i64,
    },

    /// List stat groups with a declared fact table
    Groups,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_load_defaults() {
        let cli = Cli::try_parse_from(["mlb-stats-to-sqlite", "load", "--plain"]).unwrap();
        match cli.command {
            Commands::Load { years, plain, .. } => {
                assert_eq!(years, 4);
                assert!(plain);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_load_rejects_out_of_range_years() {
        assert!(Cli::try_parse_from(["mlb-stats-to-sqlite", "load", "--years", "3000000000"]).is_err());
        assert!(Cli::try_parse_from(["mlb-stats-to-sqlite", "load", "--years", "201"]).is_err());

        let cli = Cli::try_parse_from(["mlb-stats-to-sqlite", "load", "--years", "200"]).unwrap();
        assert!(matches!(cli.command, Commands::Load { years: 200, .. }));
    }

    #[test]
    fn test_parse_players_filters() {
        let cli = Cli::try_parse_from([
            "mlb-stats-to-sqlite",
            "players",
            "AAA",
            "--team",
            "233",
            "--db",
            "x.db",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Commands::Players { level, team } => {
                assert_eq!(level.as_deref(), Some("AAA"));
                assert_eq!(team, Some(233));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
