/// Column data type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Calendar date stored as `YYYY-MM-DD` text
    Date,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text | ColumnType::Date => "TEXT",
        }
    }
}

/// Where a column's value comes from in a source record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnSource {
    /// Top-level field: `record[field]`
    Field(&'static str),
    /// Single-key lookup object: `record[field][key]`, e.g. `{"code": "P"}`
    Lookup(&'static str, &'static str),
    /// camelCase field of the split's nested `stat` object
    Stat,
    /// Not read from the record; stamped by the caller after transformation
    Derived,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// Override the source (default: camelCase field of the same name)
    pub source: Option<ColumnSource>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            source: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            source: None,
        }
    }

    /// Statistic read from the `stat` object of a season split
    pub const fn stat(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            source: Some(ColumnSource::Stat),
            ..Self::new(name, col_type)
        }
    }

    /// Set the JSON field name (for when it differs from camelCase of column name)
    pub const fn json(self, field: &'static str) -> Self {
        Self {
            source: Some(ColumnSource::Field(field)),
            ..self
        }
    }

    /// Read `key` out of the lookup object stored under `field`
    pub const fn lookup(self, field: &'static str, key: &'static str) -> Self {
        Self {
            source: Some(ColumnSource::Lookup(field, key)),
            ..self
        }
    }

    pub const fn derived(self) -> Self {
        Self {
            source: Some(ColumnSource::Derived),
            ..self
        }
    }
}

/// Index on a column referencing another table's `id`.
///
/// References are documentation plus an index; SQLite does not enforce them here because
/// the source feed does not guarantee referential integrity.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
        }
    }
}

/// How a table is written on each load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Drop and recreate the table, then insert
    Replace,
    /// Create the table if missing, then insert
    Append,
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Primary key columns; duplicate keys are last-write-wins
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    pub load_mode: LoadMode,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Statistic columns, i.e. those read from a split's `stat` object
    pub fn stat_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.source == Some(ColumnSource::Stat))
    }
}
