#![forbid(unsafe_code)]

use super::super::error::{Step, StepExt, TreeError};
use super::super::support::*;
use super::super::types::Payload;
use super::super::TreeTx;
use super::payload_columns;
use arbor_core::ids::NodeId;
use tracing::debug;

impl TreeTx<'_> {
    /// Rewrites payload fields in place. Markers and parent are never touched.
    pub fn update(&self, id: NodeId, payload: Payload) -> Result<(), TreeError> {
        if payload.is_empty() {
            return Err(TreeError::InvalidInput("no fields to update"));
        }
        let conn = &*self.tx;
        let schema = self.schema;
        let fields = payload_columns(schema, &payload)?;

        let mut sql = Sql::new(&format!("UPDATE {} SET ", schema.table));
        for (index, (field, value)) in fields.into_iter().enumerate() {
            if index > 0 {
                sql.push(", ");
            }
            sql.push(&field.column).push(" = ").bind(value.clone());
        }
        sql.push(" WHERE ")
            .scope(schema)
            .push(&schema.id)
            .push(" = ")
            .bind(id.get());
        let changed = sql.execute(conn).step(Step::UpdatePayload)?;
        if changed == 0 {
            return Err(TreeError::NotFound(id));
        }
        debug!(%id, fields = payload.len(), "payload updated");
        Ok(())
    }
}
