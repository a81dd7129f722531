use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use crate::schema::{get_table, is_managed_table, LoadMode};
use crate::transform::RecordSet;

/// Prefix of tables filled during a run and renamed into place at the end
pub const STAGING_PREFIX: &str = "stage_";

pub fn staged_name(table: &str) -> String {
    format!("{}{}", STAGING_PREFIX, table)
}

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Open (or create) the database, leaving existing live tables in place
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;

        // WAL lets readers keep using the live tables while staging tables are written
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Names of all tables in the database
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .with_context(|| format!("Failed to count rows in {}", table))?;
        Ok(count as u64)
    }

    /// Drop staging tables left behind by an earlier, interrupted run
    pub fn clear_staging(&self) -> Result<usize> {
        let staged: Vec<String> = self
            .table_names()?
            .into_iter()
            .filter(|t| t.starts_with(STAGING_PREFIX))
            .collect();

        for table in &staged {
            self.conn
                .execute(&format!("DROP TABLE {}", table), [])
                .with_context(|| format!("Failed to drop staging table {}", table))?;
        }

        Ok(staged.len())
    }

    /// Write a record set into its staging table using the schema's load mode
    pub fn stage(&mut self, set: &RecordSet) -> Result<u64> {
        let table = staged_name(set.schema.name);
        self.write_table(&table, set, set.schema.load_mode)
    }

    /// Write a record set into `table` in one transaction
    pub fn write_table(&mut self, table: &str, set: &RecordSet, mode: LoadMode) -> Result<u64> {
        let schema = set.schema;
        let tx = self.conn.transaction()?;

        match mode {
            LoadMode::Replace => {
                tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
                tx.execute(&generate_create_table(schema, table, false), [])
                    .with_context(|| format!("Failed to create table: {}", table))?;
            }
            LoadMode::Append => {
                tx.execute(&generate_create_table(schema, table, true), [])
                    .with_context(|| format!("Failed to create table: {}", table))?;
            }
        }

        let columns = schema.column_names();
        let insert_sql = generate_insert(schema, table);
        let mut count: u64 = 0;
        {
            let mut stmt = tx.prepare_cached(&insert_sql)?;
            for row in &set.rows {
                for (idx, col_name) in columns.iter().enumerate() {
                    row.get(col_name).bind_to(idx + 1, &mut stmt)?;
                }
                stmt.raw_execute()
                    .with_context(|| format!("Failed to insert into {}", table))?;
                count += 1;
            }
        }

        tx.commit()?;
        info!(table, rows = count, ?mode, "wrote table");
        Ok(count)
    }

    /// Replace every live table with its staged copy in a single transaction.
    ///
    /// Readers see either the previous run's tables or this run's, never a mix.
    pub fn swap_staged(&mut self) -> Result<Vec<String>> {
        let tables = self.table_names()?;
        let live: Vec<&String> = tables.iter().filter(|t| is_managed_table(t)).collect();
        let staged: Vec<&str> = tables
            .iter()
            .filter_map(|t| t.strip_prefix(STAGING_PREFIX))
            .collect();

        let tx = self.conn.transaction()?;
        for table in live {
            tx.execute(&format!("DROP TABLE {}", table), [])
                .with_context(|| format!("Failed to drop live table {}", table))?;
        }
        for table in &staged {
            tx.execute(
                &format!("ALTER TABLE {} RENAME TO {}", staged_name(table), table),
                [],
            )
            .with_context(|| format!("Failed to swap in table {}", table))?;

            if let Some(schema) = get_table(table) {
                for index_sql in generate_indexes(schema, table) {
                    tx.execute(&index_sql, [])
                        .with_context(|| format!("Failed to create index for: {}", table))?;
                }
            }
        }
        tx.commit()?;

        info!(tables = staged.len(), "swapped staged tables into place");
        Ok(staged.into_iter().map(str::to_string).collect())
    }

    /// Finalize the database after a load
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HITTING, LEAGUE_LEVELS, PLAYERS, TEAMS};
    use crate::transform::{transform_records, SqlValue};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn writer() -> (TempDir, SqliteWriter) {
        let dir = TempDir::new().unwrap();
        let writer = SqliteWriter::open(&dir.path().join("test.db")).unwrap();
        (dir, writer)
    }

    fn teams() -> Vec<Value> {
        vec![
            json!({"id": 147, "name": "New York Yankees", "sport": {"id": 1}, "teamCode": "nya"}),
            json!({"id": 139, "name": "Tampa Bay Rays", "sport": {"id": 1}, "teamCode": "tba"}),
            json!({"id": 233, "name": "Durham Bulls", "sport": {"id": 11}, "teamCode": "dur"}),
        ]
    }

    fn splits(ids: &[i64]) -> Vec<Value> {
        ids.iter()
            .map(|id| {
                json!({
                    "season": "2023",
                    "stat": {"hits": 100},
                    "player": {"id": id},
                    "team": {"id": 147},
                    "sport": {"id": 1},
                })
            })
            .collect()
    }

    #[test]
    fn test_replace_twice_keeps_one_copy() {
        let (_dir, mut writer) = writer();
        let set = transform_records(&teams(), &TEAMS);

        writer.write_table("d_teams", &set, LoadMode::Replace).unwrap();
        writer.write_table("d_teams", &set, LoadMode::Replace).unwrap();

        assert_eq!(writer.row_count("d_teams").unwrap(), 3);
    }

    #[test]
    fn test_append_disjoint_batches_sum() {
        let (_dir, mut writer) = writer();
        let first = transform_records(&splits(&[1, 2, 3]), &HITTING);
        let second = transform_records(&splits(&[4, 5]), &HITTING);

        writer.write_table("f_hitting", &first, LoadMode::Append).unwrap();
        writer.write_table("f_hitting", &second, LoadMode::Append).unwrap();

        assert_eq!(writer.row_count("f_hitting").unwrap(), 5);
    }

    #[test]
    fn test_duplicate_dimension_ids_last_write_wins() {
        let (_dir, mut writer) = writer();
        let records = vec![
            json!({"id": 5, "name": "First", "sport": {"id": 1}}),
            json!({"id": 5, "name": "Second", "sport": {"id": 11}}),
        ];
        let set = transform_records(&records, &TEAMS);
        writer.write_table("d_teams", &set, LoadMode::Replace).unwrap();

        let name: String = writer
            .connection()
            .query_row("SELECT name FROM d_teams WHERE id = 5", [], |r| r.get(0))
            .unwrap();
        assert_eq!(writer.row_count("d_teams").unwrap(), 1);
        assert_eq!(name, "Second");
    }

    #[test]
    fn test_swap_replaces_live_tables() {
        let (_dir, mut writer) = writer();
        let old = transform_records(&teams()[..1], &TEAMS);
        writer.write_table("d_teams", &old, LoadMode::Replace).unwrap();
        let orphan = transform_records(&[json!({"id": 1})], &LEAGUE_LEVELS);
        writer.write_table("d_leaguelevel", &orphan, LoadMode::Replace).unwrap();

        let new = transform_records(&teams(), &TEAMS);
        writer.stage(&new).unwrap();
        assert_eq!(writer.row_count("d_teams").unwrap(), 1);

        let swapped = writer.swap_staged().unwrap();
        assert_eq!(swapped, vec!["d_teams"]);
        assert_eq!(writer.row_count("d_teams").unwrap(), 3);

        let tables = writer.table_names().unwrap();
        assert!(!tables.iter().any(|t| t.starts_with(STAGING_PREFIX)));
        assert!(!tables.contains(&"d_leaguelevel".to_string()));
    }

    #[test]
    fn test_swap_twice_recreates_indexes() {
        let (_dir, mut writer) = writer();
        for _ in 0..2 {
            writer.stage(&transform_records(&teams(), &TEAMS)).unwrap();
            writer.swap_staged().unwrap();
        }
        let indexes: i64 = writer
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_d_teams_leaguelevel_id'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 1);
    }

    #[test]
    fn test_stage_skips_records_without_id() {
        let (_dir, mut writer) = writer();
        let mut players = transform_records(&[json!({"id": 1}), json!({"fullName": "No Id"})], &PLAYERS);
        players.stamp("league_id", SqlValue::Integer(1));
        let teams = transform_records(&[json!({"name": "No Id", "sport": {"id": 1}})], &TEAMS);

        assert_eq!(writer.stage(&players).unwrap(), 1);
        assert_eq!(writer.stage(&teams).unwrap(), 0);
        assert_eq!(writer.row_count("stage_d_player").unwrap(), 1);
        assert_eq!(writer.row_count("stage_d_teams").unwrap(), 0);
    }

    #[test]
    fn test_clear_staging() {
        let (_dir, mut writer) = writer();
        writer.stage(&transform_records(&teams(), &TEAMS)).unwrap();
        writer.write_table("d_teams", &transform_records(&teams(), &TEAMS), LoadMode::Replace).unwrap();

        assert_eq!(writer.clear_staging().unwrap(), 1);
        assert_eq!(writer.table_names().unwrap(), vec!["d_teams"]);
    }
}
