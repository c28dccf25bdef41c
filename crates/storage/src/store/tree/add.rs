#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::support::*;
use super::super::types::{Payload, Placement};
use super::super::TreeTx;
use super::payload_columns;
use arbor_core::ids::NodeId;
use arbor_core::interval::{Anchor, Bounds};
use rusqlite::types::Value;
use tracing::debug;

impl TreeTx<'_> {
    /// Inserts a leaf at `placement` and returns its id.
    pub fn add(&self, payload: Payload, placement: Placement) -> Result<NodeId, TreeError> {
        let conn = &*self.tx;
        let schema = self.schema;
        let fields = payload_columns(schema, &payload)?;

        let (parent_id, prev_visited) = match placement {
            Placement::Root => {
                if count_nodes(conn, schema).step(Step::Resolve)? > 0 {
                    return Err(TreeError::InvalidInput("tree already has a root"));
                }
                (None, 0)
            }
            Placement::FirstChildOf(parent_id) => {
                let parent = element_tx(conn, schema, parent_id, Step::Resolve)?;
                (Some(parent.id), Anchor::Parent(parent.bounds()).prev_visited())
            }
            Placement::After(prev_id) => {
                let prev = element_tx(conn, schema, prev_id, Step::Resolve)?;
                let Some(parent_id) = prev.parent_id else {
                    return Err(TreeError::InvalidInput("the root cannot have siblings"));
                };
                (Some(parent_id), Anchor::Sibling(prev.bounds()).prev_visited())
            }
        };

        if parent_id.is_some() {
            make_room_tx(conn, schema, prev_visited, 2)?;
        }

        let explicit_id = next_id_tx(conn, schema)?;
        let bounds = Bounds::leaf_after(prev_visited);

        let mut row: Vec<(&str, Value)> = Vec::with_capacity(fields.len() + 5);
        if let Some(id) = explicit_id {
            row.push((schema.id.as_str(), Value::Integer(id)));
        }
        row.push((schema.left.as_str(), Value::Integer(bounds.left)));
        row.push((schema.right.as_str(), Value::Integer(bounds.right)));
        row.push((schema.parent.as_str(), parent_id.map(NodeId::get).into()));
        if let Some(partition) = &schema.partition {
            row.push((partition.column.as_str(), partition.value.clone()));
        }
        for (field, value) in fields {
            row.push((field.column.as_str(), value.clone()));
        }

        let names: Vec<&str> = row.iter().map(|(name, _)| *name).collect();
        let mut sql = Sql::new(&format!(
            "INSERT INTO {} ({}) VALUES (",
            schema.table,
            names.join(", ")
        ));
        for (index, (_, value)) in row.into_iter().enumerate() {
            if index > 0 {
                sql.push(", ");
            }
            sql.bind(value);
        }
        sql.push(")");
        sql.execute(conn).step(Step::Insert)?;

        let id = NodeId::new(explicit_id.unwrap_or_else(|| conn.last_insert_rowid()));
        debug!(%id, %bounds, parent = ?parent_id, "node added");
        Ok(id)
    }

    /// Subtree duplication is not offered; fails without touching the tree.
    pub fn copy(&self, _id: NodeId, _placement: Placement) -> Result<NodeId, TreeError> {
        Err(TreeError::Unsupported("copy"))
    }
}
