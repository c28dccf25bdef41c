#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::schema::{ResolvedIds, Schema};
use rusqlite::{Connection, OptionalExtension, params};

/// Draws the next id from the configured sequence table, or `None` when the table's own
/// auto-increment assigns ids on insert.
pub(in crate::store) fn next_id_tx(
    conn: &Connection,
    schema: &Schema,
) -> Result<Option<i64>, TreeError> {
    let ResolvedIds::Sequence(seq_table) = &schema.ids else {
        return Ok(None);
    };

    let current: Option<i64> = conn
        .query_row(
            &format!("SELECT value FROM {seq_table} WHERE name = ?1"),
            params![schema.table_name],
            |row| row.get(0),
        )
        .optional()
        .step(Step::AllocateId)?;
    // First use: continue after ids already present in the table.
    let current = match current {
        Some(value) => value,
        None => conn
            .query_row(
                &format!("SELECT COALESCE(MAX({}), 0) FROM {}", schema.id, schema.table),
                [],
                |row| row.get(0),
            )
            .step(Step::AllocateId)?,
    };
    let next = current + 1;
    conn.execute(
        &format!(
            "INSERT INTO {seq_table}(name, value) VALUES (?1, ?2) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value"
        ),
        params![schema.table_name, next],
    )
    .step(Step::AllocateId)?;
    Ok(Some(next))
}
