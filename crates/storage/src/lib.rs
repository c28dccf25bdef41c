#![forbid(unsafe_code)]

//! Nested-set trees stored in SQLite tables.
//!
//! Each node is a row carrying two order markers, `left` and `right`. A node's descendants
//! are exactly the rows whose markers fall inside its own interval, so ancestry, subtree and
//! path queries are single range scans, while structural edits renumber markers in bulk
//! inside one transaction.

mod store;

pub use arbor_core::ids::NodeId;
pub use arbor_core::interval::Bounds;
pub use arbor_core::verify::Violation;
pub use store::*;
