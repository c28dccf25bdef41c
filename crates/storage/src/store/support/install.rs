#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::schema::{ResolvedIds, Schema};
use rusqlite::Connection;
use rusqlite::types::Value;

pub(in crate::store) fn install_schema(conn: &Connection, schema: &Schema) -> Result<(), TreeError> {
    conn.execute_batch(&schema_sql(schema)).step(Step::Install)
}

fn schema_sql(schema: &Schema) -> String {
    let id_decl = match schema.ids {
        ResolvedIds::AutoIncrement => "INTEGER PRIMARY KEY AUTOINCREMENT",
        ResolvedIds::Sequence(_) => "INTEGER PRIMARY KEY",
    };

    let mut columns = vec![
        format!("{} {id_decl}", schema.id),
        format!("{} INTEGER NOT NULL", schema.left),
        format!("{} INTEGER NOT NULL", schema.right),
        format!("{} INTEGER", schema.parent),
    ];
    if let Some(partition) = &schema.partition {
        let decl = match partition.value {
            Value::Integer(_) => "INTEGER NOT NULL",
            _ => "TEXT NOT NULL",
        };
        columns.push(format!("{} {decl}", partition.column));
    }
    for field in &schema.payload {
        match &field.sql_type {
            Some(decl) => columns.push(format!("{} {decl}", field.column)),
            None => columns.push(field.column.clone()),
        }
    }

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);\n",
        schema.table,
        columns.join(",\n  ")
    );

    // Markers are not UNIQUE: bulk shifts pass through transient collisions.
    let prefix = match &schema.partition {
        Some(partition) => format!("{}, ", partition.column),
        None => String::new(),
    };
    for (suffix, column) in [
        ("left", &schema.left),
        ("right", &schema.right),
        ("parent", &schema.parent),
    ] {
        sql.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS \"{}_{suffix}_idx\" ON {}({prefix}{column});\n",
            schema.table_name, schema.table
        ));
    }

    if let ResolvedIds::Sequence(seq_table) = &schema.ids {
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {seq_table} (\n  name TEXT PRIMARY KEY,\n  value INTEGER NOT NULL\n);\n"
        ));
    }

    sql
}
