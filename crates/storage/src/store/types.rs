#![forbid(unsafe_code)]

use super::error::TreeError;
use arbor_core::ids::NodeId;
use arbor_core::interval::Bounds;
use arbor_core::verify::NodeShape;
use rusqlite::types::Value;
use std::collections::BTreeMap;

/// Payload fields keyed by their schema name. Opaque to the tree algorithm.
pub type Payload = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub left: i64,
    pub right: i64,
    pub parent_id: Option<NodeId>,
    pub payload: Payload,
}

impl Node {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.left, self.right)
    }

    pub fn shape(&self) -> NodeShape {
        NodeShape {
            id: self.id,
            bounds: self.bounds(),
            parent_id: self.parent_id,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Text payload value, if the field holds text.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.payload.get(field) {
            Some(Value::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Where `add` puts a new node and where `move` puts an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The very first node of an empty tree.
    Root,
    /// First child of the given node.
    FirstChildOf(NodeId),
    /// Next sibling of the given node, under the same parent.
    After(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The target position is the node itself; nothing was written.
    AlreadyInPlace,
}

/// Per-id results of a batched move.
#[derive(Debug, Default)]
pub struct MoveReport {
    pub results: Vec<(NodeId, Result<MoveOutcome, TreeError>)>,
}

impl MoveReport {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, result)| result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (NodeId, &TreeError)> {
        self.results
            .iter()
            .filter_map(|(id, result)| result.as_ref().err().map(|err| (*id, err)))
    }

    pub fn moved(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.results
            .iter()
            .filter(|(_, result)| matches!(result, Ok(MoveOutcome::Moved)))
            .map(|(id, _)| *id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighborKind {
    Sibling,
    Parent,
}

/// Row whose marker is directly adjacent to a node's own boundary marker.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryNeighbor {
    pub node: Node,
    pub kind: NeighborKind,
}
