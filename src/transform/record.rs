use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::schema::{ColumnSource, ColumnType, TableSchema};

/// Key of the per-split statistics object in season stats responses
pub const STAT_OBJECT: &str = "stat";

/// A transformed row ready for insertion
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub values: HashMap<String, SqlValue>,
}

impl Row {
    pub fn get(&self, column: &str) -> &SqlValue {
        self.values.get(column).unwrap_or(&SqlValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<rusqlite::types::Value> for SqlValue {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value as V;
        match value {
            V::Null | V::Blob(_) => SqlValue::Null,
            V::Integer(i) => SqlValue::Integer(i),
            V::Real(f) => SqlValue::Real(f),
            V::Text(s) => SqlValue::Text(s),
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "-"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{:.3}", r),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Rows shaped to a table schema: every row carries every declared column
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub schema: &'static TableSchema,
    pub rows: Vec<Row>,
}

impl RecordSet {
    pub fn empty(schema: &'static TableSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column across all rows
    pub fn column(&self, name: &str) -> Vec<&SqlValue> {
        self.rows.iter().map(|r| r.get(name)).collect()
    }

    /// Set a derived column to the same value on every row
    pub fn stamp(&mut self, column: &str, value: SqlValue) {
        for row in &mut self.rows {
            row.values.insert(column.to_string(), value.clone());
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }
}

/// Transform a list of raw API records into rows for the given schema.
///
/// Records missing a required source column (e.g. an `id`) are skipped with a warning.
pub fn transform_records(records: &[Value], schema: &'static TableSchema) -> RecordSet {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let row = transform_record(record, schema);
        match missing_key(&row, schema) {
            Some(column) => warn!(table = schema.name, column, "skipping record without a key value"),
            None => rows.push(row),
        }
    }
    RecordSet { schema, rows }
}

/// First required column read from the record that came out NULL.
/// Derived columns are stamped after transformation and are not checked here.
fn missing_key(row: &Row, schema: &TableSchema) -> Option<&'static str> {
    schema
        .columns
        .iter()
        .filter(|c| !c.nullable && c.source != Some(ColumnSource::Derived))
        .find(|c| row.get(c.name).is_null())
        .map(|c| c.name)
}

/// Transform one record; missing or malformed fields become NULL
pub fn transform_record(json: &Value, schema: &TableSchema) -> Row {
    let mut values = HashMap::with_capacity(schema.columns.len());

    for col in schema.columns {
        let raw = match col.source {
            None => json.get(to_camel_case(col.name)),
            Some(ColumnSource::Field(field)) => json.get(field),
            Some(ColumnSource::Lookup(field, key)) => json.get(field).and_then(|v| v.get(key)),
            Some(ColumnSource::Stat) => json
                .get(STAT_OBJECT)
                .and_then(|stat| stat.get(to_camel_case(col.name))),
            Some(ColumnSource::Derived) => None,
        };
        values.insert(col.name.to_string(), extract_value(raw, col.col_type));
    }

    report_undeclared_stats(json, schema);

    Row { values }
}

/// Stat keys the API sent that the group's schema does not declare
fn report_undeclared_stats(json: &Value, schema: &TableSchema) {
    let Some(stat) = json.get(STAT_OBJECT).and_then(|v| v.as_object()) else {
        return;
    };
    let declared: Vec<String> = schema.stat_columns().map(|c| to_camel_case(c.name)).collect();
    if declared.is_empty() {
        return;
    }
    for key in stat.keys().filter(|k| !declared.contains(k)) {
        debug!(table = schema.name, field = %key, "skipping undeclared stat field");
    }
}

fn extract_value(val: Option<&Value>, col_type: ColumnType) -> SqlValue {
    match val {
        None | Some(Value::Null) => SqlValue::Null,
        Some(v) => match col_type {
            ColumnType::Integer => as_integer(v).map(SqlValue::Integer).unwrap_or(SqlValue::Null),
            ColumnType::Real => as_real(v).map(SqlValue::Real).unwrap_or(SqlValue::Null),
            ColumnType::Text => match v {
                Value::String(s) => SqlValue::Text(s.clone()),
                Value::Number(n) => SqlValue::Text(n.to_string()),
                Value::Bool(b) => SqlValue::Text(b.to_string()),
                _ => SqlValue::Null,
            },
            ColumnType::Date => v
                .as_str()
                .and_then(parse_date)
                .map(|d| SqlValue::Text(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(SqlValue::Null),
        },
    }
}

/// Integers arrive as numbers or numeric strings (`"2023"`)
fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Rates arrive as strings (`".286"`, `"3.45"`); placeholders like `".---"` yield `None`
fn as_real(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Best-effort calendar date parse; time of day is discarded
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

/// Convert snake_case to camelCase
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
