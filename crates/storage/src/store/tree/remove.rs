#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::support::*;
use super::super::TreeTx;
use arbor_core::ids::NodeId;
use tracing::debug;

impl TreeTx<'_> {
    /// Deletes the node together with its whole subtree and closes the gap.
    /// Returns the number of rows deleted.
    pub fn remove(&self, id: NodeId) -> Result<usize, TreeError> {
        let conn = &*self.tx;
        let schema = self.schema;
        let node = element_tx(conn, schema, id, Step::Resolve)?;
        let bounds = node.bounds();

        let mut sql = Sql::new(&format!("DELETE FROM {} WHERE ", schema.table));
        sql.scope(schema)
            .push(&schema.left)
            .push(" BETWEEN ")
            .bind(bounds.left)
            .push(" AND ")
            .bind(bounds.right);
        let deleted = sql.execute(conn).step(Step::DeleteSubtree)?;

        collapse_tx(conn, schema, bounds)?;
        debug!(%id, %bounds, deleted, "subtree removed");
        Ok(deleted)
    }
}
