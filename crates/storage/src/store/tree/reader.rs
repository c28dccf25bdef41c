#![forbid(unsafe_code)]

use super::super::error::TreeError;
use super::super::schema::Schema;
use super::super::support::*;
use super::super::types::{BoundaryNeighbor, NeighborKind, Node, Side};
use arbor_core::ids::NodeId;
use arbor_core::verify::{Violation, verify_nesting};
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Read-only navigation over a tree. Every answer is derived from the markers stored in
/// the table; nothing is cached.
///
/// Implemented by [`crate::SqliteTree`] (reads outside a transaction) and
/// [`crate::TreeTx`] (reads that see the transaction's own uncommitted writes).
pub trait TreeReader {
    fn connection(&self) -> &Connection;

    fn schema(&self) -> &Schema;

    /// The node with `left = 1`.
    fn root(&self) -> Result<Node, TreeError> {
        let schema = self.schema();
        let mut sql = select_nodes(schema);
        sql.push(&schema.left).push(" = 1");
        query_node(self.connection(), schema, &sql)?.ok_or(TreeError::EmptyTree)
    }

    fn element(&self, id: NodeId) -> Result<Node, TreeError> {
        find_node(self.connection(), self.schema(), id)?.ok_or(TreeError::NotFound(id))
    }

    fn first_child(&self, id: NodeId) -> Result<Option<Node>, TreeError> {
        let node = self.element(id)?;
        let schema = self.schema();
        let mut sql = select_nodes(schema);
        sql.push(&schema.left).push(" = ").bind(node.left + 1);
        Ok(query_node(self.connection(), schema, &sql)?)
    }

    /// Direct parent, or `None` for the root.
    fn parent(&self, id: NodeId) -> Result<Option<Node>, TreeError> {
        let node = self.element(id)?;
        match node.parent_id {
            Some(parent_id) => Ok(find_node(self.connection(), self.schema(), parent_id)?),
            None => Ok(None),
        }
    }

    /// Ancestor chain from the root down to the node itself.
    fn path(&self, id: NodeId) -> Result<Vec<Node>, TreeError> {
        let node = self.element(id)?;
        let schema = self.schema();
        let mut sql = select_nodes(schema);
        sql.push(&schema.left)
            .push(" <= ")
            .bind(node.left)
            .push(" AND ")
            .push(&schema.right)
            .push(" >= ")
            .bind(node.right)
            .push(&format!(" ORDER BY {}", schema.left));
        Ok(query_nodes(self.connection(), schema, &sql)?)
    }

    /// Children of `ids`, then their children, up to `levels` generations.
    ///
    /// Rows come level by level, each level sorted by the schema's order field. Stops early
    /// once a level is empty.
    fn children(&self, ids: &[NodeId], levels: usize) -> Result<Vec<Node>, TreeError> {
        let schema = self.schema();
        let mut out = Vec::new();
        let mut frontier: Vec<i64> = ids
            .iter()
            .map(|id| id.get())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        for _ in 0..levels {
            if frontier.is_empty() {
                break;
            }
            let mut sql = select_nodes(schema);
            sql.push(&schema.parent).push(" IN (");
            for (index, id) in frontier.iter().enumerate() {
                if index > 0 {
                    sql.push(", ");
                }
                sql.bind(*id);
            }
            sql.push(&format!(") ORDER BY {}, {}", schema.order, schema.left));

            let level = query_nodes(self.connection(), schema, &sql)?;
            frontier = level.iter().map(|node| node.id.get()).collect();
            out.extend(level);
        }
        Ok(out)
    }

    fn next_sibling(&self, id: NodeId) -> Result<Option<Node>, TreeError> {
        let node = self.element(id)?;
        let schema = self.schema();
        let mut sql = select_nodes(schema);
        sql.push(&schema.left)
            .push(" = ")
            .bind(node.right + 1)
            .push(" AND ")
            .push(&schema.parent)
            .push(" IS ")
            .bind(node.parent_id.map(NodeId::get));
        Ok(query_node(self.connection(), schema, &sql)?)
    }

    fn previous_sibling(&self, id: NodeId) -> Result<Option<Node>, TreeError> {
        let node = self.element(id)?;
        let schema = self.schema();
        let mut sql = select_nodes(schema);
        sql.push(&schema.right)
            .push(" = ")
            .bind(node.left - 1)
            .push(" AND ")
            .push(&schema.parent)
            .push(" IS ")
            .bind(node.parent_id.map(NodeId::get));
        Ok(query_node(self.connection(), schema, &sql)?)
    }

    /// The row whose marker touches the node's left or right boundary, classified as a
    /// sibling or as the enclosing parent (when the node is a first or last child).
    fn boundary_neighbor(
        &self,
        id: NodeId,
        side: Side,
    ) -> Result<Option<BoundaryNeighbor>, TreeError> {
        let node = self.element(id)?;
        let schema = self.schema();
        let (sibling_column, parent_column, marker) = match side {
            Side::Left => (&schema.right, &schema.left, node.left - 1),
            Side::Right => (&schema.left, &schema.right, node.right + 1),
        };
        let mut sql = select_nodes(schema);
        sql.push("(")
            .push(sibling_column)
            .push(" = ")
            .bind(marker)
            .push(" OR ")
            .push(parent_column)
            .push(" = ")
            .bind(marker)
            .push(")");
        let Some(neighbor) = query_node(self.connection(), schema, &sql)? else {
            return Ok(None);
        };
        let is_sibling = match side {
            Side::Left => neighbor.right == marker,
            Side::Right => neighbor.left == marker,
        };
        let kind = if is_sibling {
            NeighborKind::Sibling
        } else {
            NeighborKind::Parent
        };
        Ok(Some(BoundaryNeighbor {
            node: neighbor,
            kind,
        }))
    }

    /// True iff `child_id` lies strictly inside `id`'s interval.
    fn is_child_of(&self, id: NodeId, child_id: NodeId) -> Result<bool, TreeError> {
        let parent = self.element(id)?;
        let child = self.element(child_id)?;
        Ok(parent.bounds().contains(child.bounds()))
    }

    fn has_children(&self, id: NodeId) -> Result<bool, TreeError> {
        Ok(!self.element(id)?.bounds().is_leaf())
    }

    /// The node followed by all of its descendants, in pre-order.
    fn subtree(&self, id: NodeId) -> Result<Vec<Node>, TreeError> {
        let node = self.element(id)?;
        let schema = self.schema();
        let mut sql = select_nodes(schema);
        sql.push(&schema.left)
            .push(" BETWEEN ")
            .bind(node.left)
            .push(" AND ")
            .bind(node.right)
            .push(&format!(" ORDER BY {}", schema.left));
        Ok(query_nodes(self.connection(), schema, &sql)?)
    }

    /// Every node of the tree in pre-order.
    fn nodes(&self) -> Result<Vec<Node>, TreeError> {
        let schema = self.schema();
        let mut sql = select_nodes(schema);
        sql.push(&format!("1 = 1 ORDER BY {}", schema.left));
        Ok(query_nodes(self.connection(), schema, &sql)?)
    }

    fn len(&self) -> Result<usize, TreeError> {
        let count = count_nodes(self.connection(), self.schema())?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn is_empty(&self) -> Result<bool, TreeError> {
        Ok(self.len()? == 0)
    }

    /// Checks the nesting invariants over the stored rows; an empty result means consistent.
    fn verify(&self) -> Result<Vec<Violation>, TreeError> {
        let shapes: Vec<_> = self.nodes()?.iter().map(Node::shape).collect();
        Ok(verify_nesting(&shapes))
    }

    fn depth(&self) -> Result<usize, TreeError> {
        Err(TreeError::Unsupported("depth"))
    }
}
