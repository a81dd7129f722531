use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema under the given table name
pub fn generate_create_table(schema: &TableSchema, table: &str, if_not_exists: bool) -> String {
    let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
    let mut sql = format!("CREATE TABLE {}{} (\n", guard, table);
    let mut columns = Vec::new();

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        columns.push(format!(
            "    {} {}{}",
            col.name,
            col.col_type.sql_type(),
            null_constraint
        ));
    }

    if !schema.primary_key.is_empty() {
        columns.push(format!("    PRIMARY KEY ({})", schema.primary_key.join(", ")));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for reference columns
pub fn generate_indexes(schema: &TableSchema, table: &str) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                table, fk.column, table, fk.column
            )
        })
        .collect()
}

/// Generate the positional INSERT for a schema.
///
/// Tables with a primary key resolve duplicate keys last-write-wins.
pub fn generate_insert(schema: &TableSchema, table: &str) -> String {
    let verb = if schema.primary_key.is_empty() {
        "INSERT"
    } else {
        "INSERT OR REPLACE"
    };
    let columns = schema.column_names();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "{} INTO {} ({}) VALUES ({})",
        verb,
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HITTING, PLAYERS, TEAMS};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&PLAYERS, "d_player", false);
        assert!(sql.starts_with("CREATE TABLE d_player ("));
        assert!(sql.contains("id INTEGER NOT NULL"));
        assert!(sql.contains("birth_date TEXT"));
        assert!(sql.contains("PRIMARY KEY (id, league_id)"));

        let sql = generate_create_table(&HITTING, "stage_f_hitting", true);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS stage_f_hitting"));
        assert!(sql.contains("avg REAL"));
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&TEAMS, "d_teams");
        assert_eq!(
            indexes,
            vec!["CREATE INDEX IF NOT EXISTS idx_d_teams_leaguelevel_id ON d_teams(leaguelevel_id)"]
        );
    }

    #[test]
    fn test_generate_insert() {
        let sql = generate_insert(&TEAMS, "d_teams");
        assert_eq!(
            sql,
            "INSERT OR REPLACE INTO d_teams (id, name, leaguelevel_id, team_code) VALUES (?1, ?2, ?3, ?4)"
        );
        assert!(generate_insert(&HITTING, "f_hitting").starts_with("INSERT INTO f_hitting"));
    }
}
