#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::support::*;
use super::super::types::{MoveOutcome, Placement};
use super::super::TreeTx;
use arbor_core::ids::NodeId;
use arbor_core::interval::{Anchor, relocation_offset};
use tracing::debug;

impl TreeTx<'_> {
    /// Relocates the subtree rooted at `id`, keeping its internal shape and every payload.
    ///
    /// Targeting the node itself is a successful no-op; targeting one of its descendants is
    /// rejected as a cycle.
    pub fn move_node(&self, id: NodeId, placement: Placement) -> Result<MoveOutcome, TreeError> {
        let conn = &*self.tx;
        let schema = self.schema;

        let (target, as_sibling) = match placement {
            Placement::Root => return Err(TreeError::InvalidMove("no parent id given")),
            Placement::FirstChildOf(target) => (target, false),
            Placement::After(target) => (target, true),
        };
        if target == id {
            debug!(%id, "move target is the node itself");
            return Ok(MoveOutcome::AlreadyInPlace);
        }

        let anchor_node = element_tx(conn, schema, target, Step::Resolve)?;
        let node = element_tx(conn, schema, id, Step::Resolve)?;
        if node.bounds().contains(anchor_node.bounds()) {
            debug!(%id, %target, "move rejected: target is a descendant");
            return Err(TreeError::InvalidMove(
                "can not move an element under one of its children",
            ));
        }

        let (new_parent, anchor) = if as_sibling {
            let Some(parent) = anchor_node.parent_id else {
                return Err(TreeError::InvalidMove("the root cannot have siblings"));
            };
            (parent, Anchor::Sibling(anchor_node.bounds()))
        } else {
            (anchor_node.id, Anchor::Parent(anchor_node.bounds()))
        };

        // With self and descendant targets excluded, `prev_visited` lies outside
        // [node.left, node.right - 1]: make-room shifts the subtree as one block or not at
        // all, so its re-fetched interval still covers exactly the subtree.
        make_room_tx(conn, schema, anchor.prev_visited(), node.bounds().span())?;

        let mut reparent = Sql::new(&format!("UPDATE {} SET ", schema.table));
        reparent
            .push(&schema.parent)
            .push(" = ")
            .bind(new_parent.get())
            .push(" WHERE ")
            .scope(schema)
            .push(&schema.id)
            .push(" = ")
            .bind(id.get());
        reparent.execute(conn).step(Step::Reparent)?;

        let anchor_now = element_tx(conn, schema, target, Step::Resolve)?;
        let calc_with = if as_sibling {
            Anchor::Sibling(anchor_now.bounds())
        } else {
            Anchor::Parent(anchor_now.bounds())
        }
        .prev_visited();
        let current = element_tx(conn, schema, id, Step::Resolve)?.bounds();
        let offset = relocation_offset(calc_with, current);

        offset_subtree_tx(conn, schema, current, offset)?;
        collapse_tx(conn, schema, current)?;

        debug!(
            %id,
            %new_parent,
            nodes = current.size(),
            to = %current.shifted(offset),
            "node moved"
        );
        Ok(MoveOutcome::Moved)
    }
}
