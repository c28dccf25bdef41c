#![forbid(unsafe_code)]

mod config;
mod error;
mod schema;
mod support;
mod tree;
mod types;

pub use config::TreeConfig;
pub use error::{Step, TreeError};
pub use schema::*;
pub use tree::TreeReader;
pub use types::*;

use arbor_core::ids::NodeId;
use error::StepExt;
use rusqlite::{Connection, InterruptHandle, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Handle over one nested-set tree stored in a SQLite table.
///
/// Every structural mutation runs in its own `BEGIN IMMEDIATE` transaction, so a failing
/// statement never leaves a partial renumbering behind.
#[derive(Debug)]
pub struct SqliteTree {
    conn: Connection,
    schema: Schema,
}

impl SqliteTree {
    pub fn open(db_path: impl AsRef<Path>, config: TreeConfig) -> Result<Self, TreeError> {
        let db_path = db_path.as_ref();
        if let Some(dir) = db_path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(db_path).step(Step::Begin)?;
        Self::from_connection(conn, config)
    }

    pub fn open_in_memory(config: TreeConfig) -> Result<Self, TreeError> {
        let conn = Connection::open_in_memory().step(Step::Begin)?;
        Self::from_connection(conn, config)
    }

    /// Wraps an existing connection. The schema is validated here, once.
    pub fn from_connection(conn: Connection, config: TreeConfig) -> Result<Self, TreeError> {
        let schema = config.schema.validate()?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .step(Step::Begin)?;
        debug!(table = schema.table_name(), "tree handle ready");
        Ok(Self { conn, schema })
    }

    /// Handle that aborts the statement currently running on this connection, from any thread.
    /// The interrupted operation fails and is rolled back.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Creates the backing table, its indexes and the id sequence table if they are missing.
    pub fn ensure_table(&self) -> Result<(), TreeError> {
        support::install_schema(&self.conn, &self.schema)
    }

    /// Opens a write transaction. Dropping the returned value without `commit` rolls back.
    pub fn transaction(&mut self) -> Result<TreeTx<'_>, TreeError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .step(Step::Begin)?;
        Ok(TreeTx {
            tx,
            schema: &self.schema,
        })
    }

    fn write<T>(
        &mut self,
        op: &'static str,
        body: impl FnOnce(&TreeTx<'_>) -> Result<T, TreeError>,
    ) -> Result<T, TreeError> {
        let tx = self.transaction()?;
        match body(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Some(step) = err.failed_step() {
                    warn!(op, step = step.as_str(), error = %err, "rolling back");
                }
                if let Err(rollback_err) = tx.rollback() {
                    warn!(op, error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip(self, payload))]
    pub fn add(&mut self, payload: Payload, placement: Placement) -> Result<NodeId, TreeError> {
        self.write("add", |tx| tx.add(payload, placement))
    }

    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: NodeId) -> Result<usize, TreeError> {
        self.write("remove", |tx| tx.remove(id))
    }

    #[tracing::instrument(skip(self))]
    pub fn move_node(
        &mut self,
        id: NodeId,
        placement: Placement,
    ) -> Result<MoveOutcome, TreeError> {
        self.write("move", |tx| tx.move_node(id, placement))
    }

    /// Moves each id independently, each in its own transaction; one failure does not stop
    /// the batch.
    #[tracing::instrument(skip(self))]
    pub fn move_nodes(&mut self, ids: &[NodeId], placement: Placement) -> MoveReport {
        let mut report = MoveReport::default();
        for id in ids {
            let result = self.move_node(*id, placement);
            report.results.push((*id, result));
        }
        report
    }

    #[tracing::instrument(skip(self, payload))]
    pub fn update(&mut self, id: NodeId, payload: Payload) -> Result<(), TreeError> {
        self.write("update", |tx| tx.update(id, payload))
    }

    pub fn copy(&mut self, id: NodeId, placement: Placement) -> Result<NodeId, TreeError> {
        self.write("copy", |tx| tx.copy(id, placement))
    }
}

impl TreeReader for SqliteTree {
    fn connection(&self) -> &Connection {
        &self.conn
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// One open write transaction over a tree.
///
/// Operations issued through it become visible together on `commit`, or not at all.
pub struct TreeTx<'conn> {
    tx: Transaction<'conn>,
    schema: &'conn Schema,
}

impl TreeTx<'_> {
    pub fn commit(self) -> Result<(), TreeError> {
        self.tx.commit().step(Step::Commit)
    }

    pub fn rollback(self) -> Result<(), TreeError> {
        self.tx.rollback().step(Step::Rollback)
    }
}

impl TreeReader for TreeTx<'_> {
    fn connection(&self) -> &Connection {
        &self.tx
    }

    fn schema(&self) -> &Schema {
        self.schema
    }
}
