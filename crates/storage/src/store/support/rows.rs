#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::schema::Schema;
use super::super::types::{Node, Payload};
use super::sql::Sql;
use arbor_core::ids::NodeId;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

const PAYLOAD_OFFSET: usize = 4;

/// `SELECT <mapped columns> FROM <table> WHERE <partition> AND ` ready for a condition.
pub(in crate::store) fn select_nodes(schema: &Schema) -> Sql {
    let mut sql = Sql::new(&format!(
        "SELECT {} FROM {} WHERE ",
        schema.select_list, schema.table
    ));
    sql.scope(schema);
    sql
}

pub(in crate::store) fn node_from_row(row: &Row<'_>, schema: &Schema) -> rusqlite::Result<Node> {
    let mut payload = Payload::new();
    for (index, field) in schema.payload.iter().enumerate() {
        let value: Value = row.get(PAYLOAD_OFFSET + index)?;
        payload.insert(field.name.clone(), value);
    }
    Ok(Node {
        id: NodeId::new(row.get(0)?),
        left: row.get(1)?,
        right: row.get(2)?,
        parent_id: row.get::<_, Option<i64>>(3)?.map(NodeId::new),
        payload,
    })
}

pub(in crate::store) fn query_nodes(
    conn: &Connection,
    schema: &Schema,
    sql: &Sql,
) -> rusqlite::Result<Vec<Node>> {
    let mut stmt = sql.prepare(conn)?;
    let mut rows = stmt.query(sql.params())?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(node_from_row(row, schema)?);
    }
    Ok(out)
}

pub(in crate::store) fn query_node(
    conn: &Connection,
    schema: &Schema,
    sql: &Sql,
) -> rusqlite::Result<Option<Node>> {
    let mut stmt = sql.prepare(conn)?;
    let mut rows = stmt.query(sql.params())?;
    match rows.next()? {
        Some(row) => Ok(Some(node_from_row(row, schema)?)),
        None => Ok(None),
    }
}

pub(in crate::store) fn find_node(
    conn: &Connection,
    schema: &Schema,
    id: NodeId,
) -> rusqlite::Result<Option<Node>> {
    let mut sql = select_nodes(schema);
    sql.push(&schema.id).push(" = ").bind(id.get());
    query_node(conn, schema, &sql)
}

/// Fetches a node that must exist, tagging backend failures with `step`.
pub(in crate::store) fn element_tx(
    conn: &Connection,
    schema: &Schema,
    id: NodeId,
    step: Step,
) -> Result<Node, TreeError> {
    find_node(conn, schema, id)
        .step(step)?
        .ok_or(TreeError::NotFound(id))
}

pub(in crate::store) fn count_nodes(conn: &Connection, schema: &Schema) -> rusqlite::Result<i64> {
    let mut sql = Sql::new(&format!("SELECT COUNT(1) FROM {} WHERE ", schema.table));
    sql.scope(schema).push("1 = 1");
    let mut stmt = sql.prepare(conn)?;
    stmt.query_row(sql.params(), |row| row.get(0))
}
