#![forbid(unsafe_code)]

//! Structural invariant checker for a nested-set tree snapshot.

use crate::ids::NodeId;
use crate::interval::Bounds;

/// The structural part of one row: identity, markers and the recorded parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeShape {
    pub id: NodeId,
    pub bounds: Bounds,
    pub parent_id: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    EmptyInterval {
        id: NodeId,
        bounds: Bounds,
    },
    PartialOverlap {
        outer: NodeId,
        inner: NodeId,
    },
    WrongParent {
        id: NodeId,
        recorded: Option<NodeId>,
        enclosing: Option<NodeId>,
    },
    SpanMismatch {
        id: NodeId,
        span: i64,
        size: i64,
    },
    RootCount(usize),
    RootNotFirst {
        id: NodeId,
        left: i64,
    },
    MarkersNotContiguous {
        expected: i64,
        found: i64,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInterval { id, bounds } => {
                write!(f, "node {id} has left >= right {bounds}")
            }
            Self::PartialOverlap { outer, inner } => {
                write!(f, "node {inner} partially overlaps node {outer}")
            }
            Self::WrongParent {
                id,
                recorded,
                enclosing,
            } => write!(
                f,
                "node {id} records parent {} but is enclosed by {}",
                fmt_parent(*recorded),
                fmt_parent(*enclosing)
            ),
            Self::SpanMismatch { id, span, size } => write!(
                f,
                "node {id} spans {span} markers but its subtree holds {size} nodes"
            ),
            Self::RootCount(count) => write!(f, "expected exactly one root, found {count}"),
            Self::RootNotFirst { id, left } => {
                write!(f, "root {id} starts at marker {left} instead of 1")
            }
            Self::MarkersNotContiguous { expected, found } => {
                write!(f, "markers not contiguous (expected={expected}, found={found})")
            }
        }
    }
}

fn fmt_parent(parent: Option<NodeId>) -> String {
    match parent {
        Some(id) => id.to_string(),
        None => "none".to_string(),
    }
}

/// Checks every nesting invariant over one tree partition and returns all violations found.
///
/// An empty slice is a valid (empty) tree.
pub fn verify_nesting(nodes: &[NodeShape]) -> Vec<Violation> {
    let mut out = Vec::new();
    if nodes.is_empty() {
        return out;
    }

    let mut sorted: Vec<&NodeShape> = nodes.iter().collect();
    sorted.sort_by_key(|node| (node.bounds.left, node.bounds.right));

    for node in &sorted {
        if node.bounds.left >= node.bounds.right {
            out.push(Violation::EmptyInterval {
                id: node.id,
                bounds: node.bounds,
            });
        }
    }

    let mut open: Vec<&NodeShape> = Vec::new();
    for node in &sorted {
        while open
            .last()
            .is_some_and(|top| top.bounds.right < node.bounds.left)
        {
            open.pop();
        }
        let enclosing = open.last().copied();
        if let Some(outer) = enclosing
            && !outer.bounds.contains(node.bounds)
        {
            out.push(Violation::PartialOverlap {
                outer: outer.id,
                inner: node.id,
            });
        }
        let expected = enclosing.map(|outer| outer.id);
        if node.parent_id != expected {
            out.push(Violation::WrongParent {
                id: node.id,
                recorded: node.parent_id,
                enclosing: expected,
            });
        }
        open.push(node);
    }

    let lefts: Vec<i64> = sorted.iter().map(|node| node.bounds.left).collect();
    for node in &sorted {
        let Bounds { left, right } = node.bounds;
        let first_inside = lefts.partition_point(|value| *value <= left);
        let past_inside = lefts.partition_point(|value| *value < right);
        let size = past_inside.saturating_sub(first_inside) as i64 + 1;
        if node.bounds.span() != size * 2 {
            out.push(Violation::SpanMismatch {
                id: node.id,
                span: node.bounds.span(),
                size,
            });
        }
    }

    let roots: Vec<&&NodeShape> = sorted
        .iter()
        .filter(|node| node.parent_id.is_none())
        .collect();
    if roots.len() != 1 {
        out.push(Violation::RootCount(roots.len()));
    }
    for root in roots {
        if root.bounds.left != 1 {
            out.push(Violation::RootNotFirst {
                id: root.id,
                left: root.bounds.left,
            });
        }
    }

    let mut markers: Vec<i64> = sorted
        .iter()
        .flat_map(|node| [node.bounds.left, node.bounds.right])
        .collect();
    markers.sort_unstable();
    for (index, found) in markers.into_iter().enumerate() {
        let expected = index as i64 + 1;
        if found != expected {
            out.push(Violation::MarkersNotContiguous { expected, found });
            break;
        }
    }

    out
}
