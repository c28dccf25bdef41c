#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::schema::Schema;
use super::sql::Sql;
use arbor_core::interval::Bounds;
use rusqlite::Connection;
use tracing::debug;

/// Make-room primitive: opens a gap of `width` markers right after `prev_visited`.
///
/// Lefts and rights are shifted by two independent statements; they touch disjoint columns.
pub(in crate::store) fn make_room_tx(
    conn: &Connection,
    schema: &Schema,
    prev_visited: i64,
    width: i64,
) -> Result<(), TreeError> {
    let mut lefts = Sql::new(&format!(
        "UPDATE {table} SET {l} = {l} + ",
        table = schema.table,
        l = schema.left
    ));
    lefts
        .bind(width)
        .push(" WHERE ")
        .scope(schema)
        .push(&schema.left)
        .push(" > ")
        .bind(prev_visited);
    let shifted_lefts = lefts.execute(conn).step(Step::MakeRoom)?;

    let mut rights = Sql::new(&format!(
        "UPDATE {table} SET {r} = {r} + ",
        table = schema.table,
        r = schema.right
    ));
    rights
        .bind(width)
        .push(" WHERE ")
        .scope(schema)
        .push(&schema.right)
        .push(" > ")
        .bind(prev_visited);
    let shifted_rights = rights.execute(conn).step(Step::MakeRoom)?;

    debug!(
        prev_visited,
        width, shifted_lefts, shifted_rights, "made room"
    );
    Ok(())
}

/// Collapse primitive: closes the gap left by the now-empty range `removed`.
pub(in crate::store) fn collapse_tx(
    conn: &Connection,
    schema: &Schema,
    removed: Bounds,
) -> Result<(), TreeError> {
    let delta = removed.span();

    let mut following = Sql::new(&format!(
        "UPDATE {table} SET {l} = {l} - ",
        table = schema.table,
        l = schema.left
    ));
    following
        .bind(delta)
        .push(&format!(", {r} = {r} - ", r = schema.right))
        .bind(delta)
        .push(" WHERE ")
        .scope(schema)
        .push(&schema.left)
        .push(" > ")
        .bind(removed.left);
    let shifted = following.execute(conn).step(Step::Collapse)?;

    let mut ancestors = Sql::new(&format!(
        "UPDATE {table} SET {r} = {r} - ",
        table = schema.table,
        r = schema.right
    ));
    ancestors
        .bind(delta)
        .push(" WHERE ")
        .scope(schema)
        .push(&schema.left)
        .push(" < ")
        .bind(removed.left)
        .push(" AND ")
        .push(&schema.right)
        .push(" > ")
        .bind(removed.right);
    let shrunk = ancestors.execute(conn).step(Step::Collapse)?;

    debug!(%removed, delta, shifted, shrunk, "collapsed gap");
    Ok(())
}

/// Shifts every node inside `subtree` (bounds included) by `offset`.
pub(in crate::store) fn offset_subtree_tx(
    conn: &Connection,
    schema: &Schema,
    subtree: Bounds,
    offset: i64,
) -> Result<usize, TreeError> {
    let mut sql = Sql::new(&format!(
        "UPDATE {table} SET {l} = {l} + ",
        table = schema.table,
        l = schema.left
    ));
    sql.bind(offset)
        .push(&format!(", {r} = {r} + ", r = schema.right))
        .bind(offset)
        .push(" WHERE ")
        .scope(schema)
        .push(&schema.left)
        .push(" >= ")
        .bind(subtree.left)
        .push(" AND ")
        .push(&schema.right)
        .push(" <= ")
        .bind(subtree.right);
    let shifted = sql.execute(conn).step(Step::Offset)?;
    debug!(%subtree, offset, shifted, "relocated subtree");
    Ok(shifted)
}
