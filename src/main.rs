use anyhow::{bail, Result};
use mlb_stats_to_sqlite::{
    cli::{Cli, Commands},
    config::{resolve_db_path, LoadConfig},
    query::{self, PlayerCareer, StatLine},
    refresh::{refresh_database, RefreshSummary},
    schema::StatGroup,
    ui::{PlainUi, UiApp},
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let Cli { db, command } = Cli::parse_args();

    match command {
        Commands::Load {
            years,
            base_url,
            plain,
        } => {
            let config = LoadConfig::new(resolve_db_path(db)?)
                .with_base_url(base_url)
                .with_years(years);
            load(&config, plain)?;
        }

        Commands::Levels => {
            init_tracing("warn");
            let db_path = resolve_db_path(db)?;
            let conn = query::open_readonly(&db_path)?;
            println!("{:<6} {:<8} {}", "Id", "Abbrev", "Name");
            println!("{}", "-".repeat(50));
            for level in query::list_levels(&conn)? {
                println!(
                    "{:<6} {:<8} {}",
                    level.id,
                    level.abbreviation.unwrap_or_default(),
                    level.name.unwrap_or_default()
                );
            }
        }

        Commands::Teams { level } => {
            init_tracing("warn");
            let db_path = resolve_db_path(db)?;
            let conn = query::open_readonly(&db_path)?;
            println!("{:<6} {:<32} {:<8} {}", "Id", "Team", "Level", "League");
            println!("{}", "-".repeat(70));
            for team in query::list_teams(&conn, level.as_deref())? {
                println!(
                    "{:<6} {:<32} {:<8} {}",
                    team.id,
                    team.name.unwrap_or_default(),
                    team.abbreviation.unwrap_or_default(),
                    team.league.unwrap_or_default()
                );
            }
        }

        Commands::Players { level, team } => {
            init_tracing("warn");
            let db_path = resolve_db_path(db)?;
            let conn = query::open_readonly(&db_path)?;
            let players = query::list_players(&conn, level.as_deref(), team)?;
            println!("{:<8} {:<28} {:<8} {}", "Id", "Name", "Level", "Team");
            println!("{}", "-".repeat(70));
            for player in &players {
                println!(
                    "{:<8} {:<28} {:<8} {}",
                    player.id,
                    player.full_name.as_deref().unwrap_or_default(),
                    player.abbreviation.as_deref().unwrap_or_default(),
                    player.team.as_deref().unwrap_or_default()
                );
            }
            println!("\n{} players", players.len());
        }

        Commands::Player { id } => {
            init_tracing("warn");
            let db_path = resolve_db_path(db)?;
            let conn = query::open_readonly(&db_path)?;
            match query::player_career(&conn, id)? {
                Some(career) => print_career(&career),
                None => bail!("No player with id {} in {:?}", id, db_path),
            }
        }

        Commands::Groups => {
            for group in StatGroup::ALL {
                let schema = group.schema();
                let stats: Vec<&str> = schema.stat_columns().map(|c| c.name).collect();
                println!("{} -> {} ({} stats)", group, schema.name, stats.len());
                println!("  {}", stats.join(", "));
            }
        }
    }

    Ok(())
}

fn load(config: &LoadConfig, plain: bool) -> Result<()> {
    if plain {
        init_tracing("mlb_stats_to_sqlite=info");
        let mut ui = PlainUi::new();
        let summary = refresh_database(config, &mut ui)?;
        println!("\n{}", summary_line(&summary, &config.db_path));
        return Ok(());
    }

    // The full-screen view owns stdout; keep diagnostics to warnings
    init_tracing("warn");
    let mut ui = UiApp::new()?;
    match refresh_database(config, &mut ui) {
        Ok(summary) => {
            let line = summary_line(&summary, &config.db_path);
            ui.finish(&line)?;
            println!("{}", line);
            Ok(())
        }
        Err(e) => {
            ui.restore()?;
            Err(e)
        }
    }
}

fn summary_line(summary: &RefreshSummary, db_path: &Path) -> String {
    let tables: Vec<String> = summary
        .rows
        .iter()
        .map(|(table, rows)| format!("{} {}", table, rows))
        .collect();
    format!(
        "Load Complete - {:?} seasons {}-{} ({}) - ExecTime: {:.1}s",
        db_path,
        summary.seasons.start(),
        summary.seasons.end(),
        tables.join(", "),
        summary.elapsed.as_secs_f64()
    )
}

fn print_stat_lines(title: &str, lines: &[StatLine]) {
    if lines.is_empty() {
        return;
    }
    let columns: Vec<&str> = lines[0].values.iter().map(|(name, _)| *name).take(10).collect();

    println!("\n{}", title);
    print!("{:<8} {:<6}", "Season", "Team");
    for column in &columns {
        print!(" {:>10}", column.chars().take(10).collect::<String>());
    }
    println!();
    for line in lines {
        print!(
            "{:<8} {:<6}",
            line.season.map(|s| s.to_string()).unwrap_or_default(),
            line.team_code.as_deref().unwrap_or_default()
        );
        for column in &columns {
            print!(" {:>10}", line.value(column).to_string());
        }
        println!();
    }
}

fn print_career(career: &PlayerCareer) {
    let p = &career.profile;
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    println!("{} #{}  {}", text(&p.full_name), text(&p.primary_number), p.position);
    println!(
        "{} | {} ({})",
        text(&p.team),
        text(&p.league),
        text(&p.abbreviation)
    );
    println!(
        "B/T: {}/{}  Ht/Wt: {} / {}",
        text(&p.bat_side),
        text(&p.pitch_hand),
        text(&p.height),
        p.weight.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!("Born: {}  Debut: {}", text(&p.birth_date), text(&p.mlb_debut_date));

    print_stat_lines("Hitting", &career.hitting);
    print_stat_lines("Pitching", &career.pitching);
}
