#![forbid(unsafe_code)]

use super::super::schema::Schema;
use rusqlite::types::Value;
use rusqlite::{Connection, Statement, params_from_iter};

/// SQL text with positional parameters bound in the order they are pushed.
#[derive(Debug, Default)]
pub(in crate::store) struct Sql {
    text: String,
    params: Vec<Value>,
}

impl Sql {
    pub(in crate::store) fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            params: Vec::new(),
        }
    }

    pub(in crate::store) fn push(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    pub(in crate::store) fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.text.push('?');
        self.params.push(value.into());
        self
    }

    /// Partition predicate followed by ` AND `, or nothing for an unpartitioned table.
    /// Goes right after `WHERE`.
    pub(in crate::store) fn scope(&mut self, schema: &Schema) -> &mut Self {
        if let Some(partition) = &schema.partition {
            self.text.push_str(&partition.column);
            self.text.push_str(" = ");
            self.bind(partition.value.clone());
            self.text.push_str(" AND ");
        }
        self
    }

    pub(in crate::store) fn execute(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(&self.text, params_from_iter(self.params.iter()))
    }

    pub(in crate::store) fn prepare<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> rusqlite::Result<Statement<'conn>> {
        conn.prepare(&self.text)
    }

    pub(in crate::store) fn params(&self) -> impl rusqlite::Params + '_ {
        params_from_iter(self.params.iter())
    }

    #[cfg(test)]
    pub(in crate::store) fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{PartitionKey, TreeSchema};

    #[test]
    fn scope_is_empty_without_partition() {
        let schema = TreeSchema::new("nodes").validate().expect("schema");
        let mut sql = Sql::new("DELETE FROM t WHERE ");
        sql.scope(&schema).push("x > ").bind(3i64);
        assert_eq!(sql.text(), "DELETE FROM t WHERE x > ?");
        assert_eq!(sql.params, vec![Value::Integer(3)]);
    }

    #[test]
    fn scope_binds_partition_value_first() {
        let schema = TreeSchema::new("nodes")
            .partition("owner", PartitionKey::Text("alice".to_string()))
            .validate()
            .expect("schema");
        let mut sql = Sql::new("DELETE FROM t WHERE ");
        sql.scope(&schema).push("x > ").bind(3i64);
        assert_eq!(sql.text(), "DELETE FROM t WHERE \"owner\" = ? AND x > ?");
        assert_eq!(
            sql.params,
            vec![Value::Text("alice".to_string()), Value::Integer(3)]
        );
    }
}
