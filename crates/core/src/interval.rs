#![forbid(unsafe_code)]

//! Nested-set interval arithmetic.
//!
//! A node owns the closed marker range `[left, right]`; its descendants are exactly the
//! nodes whose range lies strictly inside it.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub left: i64,
    pub right: i64,
}

impl Bounds {
    pub const fn new(left: i64, right: i64) -> Self {
        Self { left, right }
    }

    /// Bounds of a freshly inserted leaf placed right after marker `prev_visited`.
    pub const fn leaf_after(prev_visited: i64) -> Self {
        Self {
            left: prev_visited + 1,
            right: prev_visited + 2,
        }
    }

    /// `right - left + 1`: twice the number of nodes in the subtree.
    pub const fn span(self) -> i64 {
        self.right - self.left + 1
    }

    /// Number of nodes in the subtree rooted here, the node itself included.
    pub const fn size(self) -> i64 {
        self.span() / 2
    }

    pub const fn is_leaf(self) -> bool {
        self.right - self.left == 1
    }

    /// Strict containment: `other` is a proper descendant of `self`.
    pub const fn contains(self, other: Bounds) -> bool {
        self.left < other.left && self.right > other.right
    }

    pub const fn shifted(self, offset: i64) -> Self {
        Self {
            left: self.left + offset,
            right: self.right + offset,
        }
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}

/// Where a new (or relocated) subtree is anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Becomes the first child of the anchor node.
    Parent(Bounds),
    /// Directly follows the anchor node among its siblings.
    Sibling(Bounds),
}

impl Anchor {
    /// The last marker that stays in place; everything after it shifts to make room.
    pub const fn prev_visited(self) -> i64 {
        match self {
            Self::Parent(bounds) => bounds.left,
            Self::Sibling(bounds) => bounds.right,
        }
    }
}

/// Offset that carries a subtree currently at `moved` so it starts right after `prev_visited`.
pub const fn relocation_offset(prev_visited: i64, moved: Bounds) -> i64 {
    prev_visited + 1 - moved.left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_and_size_follow_the_two_markers_per_node_rule() {
        let leaf = Bounds::leaf_after(3);
        assert_eq!(leaf, Bounds::new(4, 5));
        assert_eq!(leaf.span(), 2);
        assert_eq!(leaf.size(), 1);
        assert!(leaf.is_leaf());

        let subtree = Bounds::new(1, 8);
        assert_eq!(subtree.size(), 4);
        assert!(!subtree.is_leaf());
    }

    #[test]
    fn containment_is_strict() {
        let outer = Bounds::new(1, 10);
        let inner = Bounds::new(2, 5);
        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
        assert!(!outer.contains(outer));
        assert!(!Bounds::new(2, 3).contains(Bounds::new(4, 5)));
    }

    #[test]
    fn anchor_prev_visited_and_offset() {
        let anchor = Bounds::new(4, 9);
        assert_eq!(Anchor::Parent(anchor).prev_visited(), 4);
        assert_eq!(Anchor::Sibling(anchor).prev_visited(), 9);
        assert_eq!(relocation_offset(4, Bounds::new(2, 3)), 3);
        assert_eq!(relocation_offset(1, Bounds::new(12, 15)), -10);
        assert_eq!(Bounds::new(2, 3).shifted(3), Bounds::new(5, 6));
    }
}
