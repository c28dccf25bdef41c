#![forbid(unsafe_code)]

use arbor_storage::{
    NeighborKind, Node, NodeId, Payload, Placement, Side, SqliteTree, TreeConfig, TreeError,
    TreeReader, TreeSchema,
};
use rusqlite::types::Value;

fn named(name: &str) -> Payload {
    Payload::from([("name".to_string(), Value::Text(name.to_string()))])
}

fn ids(nodes: &[Node]) -> Vec<NodeId> {
    nodes.iter().map(|node| node.id).collect()
}

struct Fixture {
    tree: SqliteTree,
    r: NodeId,
    a: NodeId,
    a1: NodeId,
    a2: NodeId,
    b: NodeId,
    c: NodeId,
    c1: NodeId,
}

/// R
/// ├── A
/// │   ├── A1
/// │   └── A2
/// ├── B
/// └── C
///     └── C1
fn fixture() -> Fixture {
    let schema = TreeSchema::new("nodes").field("name", "TEXT");
    let mut tree = SqliteTree::open_in_memory(TreeConfig::new(schema)).expect("open tree");
    tree.ensure_table().expect("install table");

    let r = tree.add(named("R"), Placement::Root).expect("R");
    let a = tree.add(named("A"), Placement::FirstChildOf(r)).expect("A");
    let b = tree.add(named("B"), Placement::After(a)).expect("B");
    let c = tree.add(named("C"), Placement::After(b)).expect("C");
    let a1 = tree.add(named("A1"), Placement::FirstChildOf(a)).expect("A1");
    let a2 = tree.add(named("A2"), Placement::After(a1)).expect("A2");
    let c1 = tree.add(named("C1"), Placement::FirstChildOf(c)).expect("C1");

    Fixture {
        tree,
        r,
        a,
        a1,
        a2,
        b,
        c,
        c1,
    }
}

#[test]
fn markers_follow_preorder_numbering() {
    let f = fixture();
    let expected = [
        (f.r, 1, 14),
        (f.a, 2, 7),
        (f.a1, 3, 4),
        (f.a2, 5, 6),
        (f.b, 8, 9),
        (f.c, 10, 13),
        (f.c1, 11, 12),
    ];
    for (id, left, right) in expected {
        let node = f.tree.element(id).expect("element");
        assert_eq!((node.left, node.right), (left, right), "node {id}");
    }
    assert!(f.tree.verify().expect("verify").is_empty());
}

#[test]
fn root_element_parent_and_first_child() {
    let f = fixture();
    assert_eq!(f.tree.root().expect("root").id, f.r);
    assert_eq!(f.tree.element(f.b).expect("b").text("name"), Some("B"));
    assert!(matches!(
        f.tree.element(NodeId::new(999)),
        Err(TreeError::NotFound(id)) if id.get() == 999
    ));

    assert_eq!(f.tree.first_child(f.r).expect("first").map(|n| n.id), Some(f.a));
    assert_eq!(f.tree.first_child(f.b).expect("first"), None);
    assert_eq!(f.tree.parent(f.a1).expect("parent").map(|n| n.id), Some(f.a));
    assert_eq!(f.tree.parent(f.r).expect("parent"), None);
}

#[test]
fn path_runs_from_root_to_node() {
    let f = fixture();
    assert_eq!(ids(&f.tree.path(f.a2).expect("path")), vec![f.r, f.a, f.a2]);
    assert_eq!(ids(&f.tree.path(f.r).expect("path")), vec![f.r]);
}

#[test]
fn children_by_level() {
    let f = fixture();
    assert_eq!(
        ids(&f.tree.children(&[f.r], 1).expect("children")),
        vec![f.a, f.b, f.c]
    );
    assert_eq!(
        ids(&f.tree.children(&[f.r], 2).expect("children")),
        vec![f.a, f.b, f.c, f.a1, f.a2, f.c1]
    );
    assert_eq!(
        ids(&f.tree.children(&[f.r], 10).expect("children")),
        vec![f.a, f.b, f.c, f.a1, f.a2, f.c1]
    );
    assert_eq!(
        ids(&f.tree.children(&[f.c, f.a, f.a], 1).expect("children")),
        vec![f.a1, f.a2, f.c1]
    );
    assert!(f.tree.children(&[f.b], 3).expect("children").is_empty());
    assert!(f.tree.children(&[], 3).expect("children").is_empty());
    assert!(f.tree.children(&[f.r], 0).expect("children").is_empty());
}

#[test]
fn siblings_require_same_parent() {
    let f = fixture();
    assert_eq!(f.tree.next_sibling(f.a).expect("next").map(|n| n.id), Some(f.b));
    assert_eq!(f.tree.next_sibling(f.c).expect("next"), None);
    assert_eq!(f.tree.next_sibling(f.a2).expect("next"), None);
    assert_eq!(f.tree.next_sibling(f.r).expect("next"), None);
    assert_eq!(
        f.tree.previous_sibling(f.b).expect("previous").map(|n| n.id),
        Some(f.a)
    );
    assert_eq!(f.tree.previous_sibling(f.a).expect("previous"), None);
    assert_eq!(f.tree.previous_sibling(f.c1).expect("previous"), None);
}

#[test]
fn boundary_neighbor_classifies_siblings_and_parents() {
    let f = fixture();

    let left_of_a = f
        .tree
        .boundary_neighbor(f.a, Side::Left)
        .expect("neighbor")
        .expect("some neighbor");
    assert_eq!((left_of_a.node.id, left_of_a.kind), (f.r, NeighborKind::Parent));

    let left_of_b = f
        .tree
        .boundary_neighbor(f.b, Side::Left)
        .expect("neighbor")
        .expect("some neighbor");
    assert_eq!((left_of_b.node.id, left_of_b.kind), (f.a, NeighborKind::Sibling));

    let right_of_b = f
        .tree
        .boundary_neighbor(f.b, Side::Right)
        .expect("neighbor")
        .expect("some neighbor");
    assert_eq!((right_of_b.node.id, right_of_b.kind), (f.c, NeighborKind::Sibling));

    let right_of_a2 = f
        .tree
        .boundary_neighbor(f.a2, Side::Right)
        .expect("neighbor")
        .expect("some neighbor");
    assert_eq!((right_of_a2.node.id, right_of_a2.kind), (f.a, NeighborKind::Parent));

    assert_eq!(f.tree.boundary_neighbor(f.r, Side::Left).expect("neighbor"), None);
    assert_eq!(f.tree.boundary_neighbor(f.r, Side::Right).expect("neighbor"), None);
}

#[test]
fn containment_and_children_flags() {
    let f = fixture();
    assert!(f.tree.is_child_of(f.r, f.a2).expect("contains"));
    assert!(f.tree.is_child_of(f.a, f.a1).expect("contains"));
    assert!(!f.tree.is_child_of(f.a, f.c1).expect("contains"));
    assert!(!f.tree.is_child_of(f.a2, f.a).expect("contains"));
    assert!(!f.tree.is_child_of(f.a, f.a).expect("contains"));
    assert!(matches!(
        f.tree.is_child_of(f.a, NodeId::new(999)),
        Err(TreeError::NotFound(_))
    ));

    assert!(f.tree.has_children(f.a).expect("has_children"));
    assert!(!f.tree.has_children(f.b).expect("has_children"));
}

#[test]
fn subtree_and_len() {
    let f = fixture();
    assert_eq!(ids(&f.tree.subtree(f.a).expect("subtree")), vec![f.a, f.a1, f.a2]);
    assert_eq!(ids(&f.tree.subtree(f.b).expect("subtree")), vec![f.b]);
    assert_eq!(f.tree.len().expect("len"), 7);
    assert_eq!(
        ids(&f.tree.nodes().expect("nodes")),
        vec![f.r, f.a, f.a1, f.a2, f.b, f.c, f.c1]
    );
}

#[test]
fn depth_and_copy_are_explicitly_unsupported() {
    let mut f = fixture();
    assert!(matches!(
        f.tree.depth(),
        Err(TreeError::Unsupported("depth"))
    ));
    assert!(matches!(
        f.tree.copy(f.a, Placement::FirstChildOf(f.b)),
        Err(TreeError::Unsupported("copy"))
    ));
    assert_eq!(f.tree.len().expect("len"), 7);

    let tx = f.tree.transaction().expect("begin");
    assert!(matches!(tx.depth(), Err(TreeError::Unsupported("depth"))));
    assert!(matches!(
        tx.copy(f.a, Placement::FirstChildOf(f.b)),
        Err(TreeError::Unsupported("copy"))
    ));
    tx.commit().expect("commit");
    assert_eq!(f.tree.len().expect("len"), 7);
}

#[test]
fn root_of_empty_tree_is_an_error() {
    let schema = TreeSchema::new("nodes");
    let tree = SqliteTree::open_in_memory(TreeConfig::new(schema)).expect("open tree");
    tree.ensure_table().expect("install table");
    assert!(matches!(tree.root(), Err(TreeError::EmptyTree)));
    assert!(tree.verify().expect("verify").is_empty());
}

#[test]
fn children_follow_configured_order_field() {
    let schema = TreeSchema::new("nodes")
        .field("name", "TEXT")
        .order_by("name");
    let mut tree = SqliteTree::open_in_memory(TreeConfig::new(schema)).expect("open tree");
    tree.ensure_table().expect("install table");

    let root = tree.add(named("root"), Placement::Root).expect("root");
    let charlie = tree
        .add(named("charlie"), Placement::FirstChildOf(root))
        .expect("charlie");
    let alpha = tree.add(named("alpha"), Placement::After(charlie)).expect("alpha");
    let bravo = tree.add(named("bravo"), Placement::After(alpha)).expect("bravo");

    assert_eq!(
        ids(&tree.children(&[root], 1).expect("children")),
        vec![alpha, bravo, charlie]
    );
}
