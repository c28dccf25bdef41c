#![forbid(unsafe_code)]

use arbor_core::ident::{SqlIdent, SqlIdentError};
use rusqlite::types::Value;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Field names owned by the tree algorithm. Payload fields may not reuse them.
pub const STRUCTURAL_FIELDS: [&str; 4] = ["id", "left", "right", "parent_id"];

/// Declarative mapping from the tree's field vocabulary to a physical table.
///
/// Validated once by [`TreeSchema::validate`]; queries only ever see the validated [`Schema`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeSchema {
    pub table: String,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default)]
    pub payload: Vec<PayloadField>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub partition: Option<Partition>,
    #[serde(default)]
    pub ids: IdStrategy,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    pub id: String,
    pub left: String,
    pub right: String,
    pub parent_id: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        // `left`/`right` are reserved words in several engines.
        Self {
            id: "id".to_string(),
            left: "l".to_string(),
            right: "r".to_string(),
            parent_id: "parent".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayloadField {
    pub name: String,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub sql_type: Option<String>,
}

/// Restricts every statement to rows where `column = value`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Partition {
    pub column: String,
    pub value: PartitionKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PartitionKey {
    Integer(i64),
    Text(String),
}

impl PartitionKey {
    fn to_value(&self) -> Value {
        match self {
            Self::Integer(value) => Value::Integer(*value),
            Self::Text(value) => Value::Text(value.clone()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdStrategy {
    #[default]
    AutoIncrement,
    Sequence {
        table: String,
    },
}

impl TreeSchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: ColumnNames::default(),
            payload: Vec::new(),
            order_by: None,
            partition: None,
            ids: IdStrategy::default(),
        }
    }

    pub fn columns(
        mut self,
        id: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        self.columns = ColumnNames {
            id: id.into(),
            left: left.into(),
            right: right.into(),
            parent_id: parent_id.into(),
        };
        self
    }

    /// Payload field stored in a column of the same name.
    pub fn field(self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let name = name.into();
        self.mapped_field(name.clone(), name, sql_type)
    }

    pub fn mapped_field(
        mut self,
        name: impl Into<String>,
        column: impl Into<String>,
        sql_type: impl Into<String>,
    ) -> Self {
        self.payload.push(PayloadField {
            name: name.into(),
            column: Some(column.into()),
            sql_type: Some(sql_type.into()),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn partition(mut self, column: impl Into<String>, value: PartitionKey) -> Self {
        self.partition = Some(Partition {
            column: column.into(),
            value,
        });
        self
    }

    pub fn sequence_ids(mut self, table: impl Into<String>) -> Self {
        self.ids = IdStrategy::Sequence {
            table: table.into(),
        };
        self
    }

    pub fn validate(&self) -> Result<Schema, SchemaError> {
        let table = ident("table", &self.table)?;
        let id = ident("columns.id", &self.columns.id)?;
        let left = ident("columns.left", &self.columns.left)?;
        let right = ident("columns.right", &self.columns.right)?;
        let parent = ident("columns.parent_id", &self.columns.parent_id)?;

        let mut seen_columns = BTreeSet::new();
        let mut claim = |column: &SqlIdent| -> Result<(), SchemaError> {
            if !seen_columns.insert(column.as_str().to_ascii_lowercase()) {
                return Err(SchemaError::DuplicateColumn(column.as_str().to_string()));
            }
            Ok(())
        };
        for column in [&id, &left, &right, &parent] {
            claim(column)?;
        }

        let partition = match &self.partition {
            Some(partition) => {
                let column = ident("partition.column", &partition.column)?;
                claim(&column)?;
                Some(ResolvedPartition {
                    column: column.quoted(),
                    value: partition.value.to_value(),
                })
            }
            None => None,
        };

        let mut seen_fields = BTreeSet::new();
        let mut payload = Vec::with_capacity(self.payload.len());
        for field in &self.payload {
            if STRUCTURAL_FIELDS.contains(&field.name.as_str()) {
                return Err(SchemaError::ReservedField(field.name.clone()));
            }
            if !seen_fields.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            let column = ident("payload.column", field.column.as_deref().unwrap_or(&field.name))?;
            claim(&column)?;
            let sql_type = match &field.sql_type {
                Some(decl) => Some(sql_type(decl)?),
                None => None,
            };
            payload.push(ResolvedField {
                name: field.name.clone(),
                column: column.quoted(),
                sql_type,
            });
        }

        let order = match self.order_by.as_deref() {
            None | Some("left") => left.quoted(),
            Some("right") => right.quoted(),
            Some("id") => id.quoted(),
            Some("parent_id") => parent.quoted(),
            Some(name) => payload
                .iter()
                .find(|field| field.name == name)
                .map(|field| field.column.clone())
                .ok_or_else(|| SchemaError::UnknownOrderField(name.to_string()))?,
        };

        let ids = match &self.ids {
            IdStrategy::AutoIncrement => ResolvedIds::AutoIncrement,
            IdStrategy::Sequence { table: seq_table } => {
                let seq = ident("ids.table", seq_table)?;
                if seq.as_str().eq_ignore_ascii_case(table.as_str()) {
                    return Err(SchemaError::DuplicateTable(seq.as_str().to_string()));
                }
                ResolvedIds::Sequence(seq.quoted())
            }
        };

        let mut select_list = vec![id.quoted(), left.quoted(), right.quoted(), parent.quoted()];
        select_list.extend(payload.iter().map(|field| field.column.clone()));

        Ok(Schema {
            table_name: table.as_str().to_string(),
            table: table.quoted(),
            id: id.quoted(),
            left: left.quoted(),
            right: right.quoted(),
            parent: parent.quoted(),
            payload,
            order,
            partition,
            ids,
            select_list: select_list.join(", "),
        })
    }
}

fn ident(role: &'static str, value: &str) -> Result<SqlIdent, SchemaError> {
    SqlIdent::try_new(value).map_err(|error| SchemaError::InvalidIdent { role, error })
}

fn sql_type(decl: &str) -> Result<String, SchemaError> {
    let trimmed = decl.trim();
    let allowed = trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '_' | '(' | ')' | ','));
    if trimmed.is_empty() || !allowed {
        return Err(SchemaError::InvalidSqlType(decl.to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    InvalidIdent {
        role: &'static str,
        error: SqlIdentError,
    },
    InvalidSqlType(String),
    DuplicateColumn(String),
    DuplicateField(String),
    DuplicateTable(String),
    ReservedField(String),
    UnknownOrderField(String),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdent { role, error } => write!(f, "{role}: {error}"),
            Self::InvalidSqlType(decl) => write!(f, "invalid sql type: {decl:?}"),
            Self::DuplicateColumn(column) => write!(f, "column {column} is mapped twice"),
            Self::DuplicateField(name) => write!(f, "payload field {name} is declared twice"),
            Self::DuplicateTable(name) => {
                write!(f, "sequence table {name} must differ from the tree table")
            }
            Self::ReservedField(name) => {
                write!(f, "payload field {name} shadows a structural field")
            }
            Self::UnknownOrderField(name) => write!(f, "order_by names unknown field {name}"),
        }
    }
}

impl std::error::Error for SchemaError {}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedField {
    pub(crate) name: String,
    pub(crate) column: String,
    pub(crate) sql_type: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedPartition {
    pub(crate) column: String,
    pub(crate) value: Value,
}

#[derive(Clone, Debug)]
pub(crate) enum ResolvedIds {
    AutoIncrement,
    Sequence(String),
}

/// Validated schema: every identifier is checked and pre-quoted.
#[derive(Clone, Debug)]
pub struct Schema {
    pub(crate) table_name: String,
    pub(crate) table: String,
    pub(crate) id: String,
    pub(crate) left: String,
    pub(crate) right: String,
    pub(crate) parent: String,
    pub(crate) payload: Vec<ResolvedField>,
    pub(crate) order: String,
    pub(crate) partition: Option<ResolvedPartition>,
    pub(crate) ids: ResolvedIds,
    pub(crate) select_list: String,
}

impl Schema {
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub(crate) fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.payload.iter().find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_and_quote() {
        let schema = TreeSchema::new("nodes")
            .field("title", "TEXT")
            .validate()
            .expect("valid schema");
        assert_eq!(schema.table, "\"nodes\"");
        assert_eq!(schema.order, "\"l\"");
        assert_eq!(
            schema.select_list,
            "\"id\", \"l\", \"r\", \"parent\", \"title\""
        );
    }

    #[test]
    fn order_by_payload_field_resolves_to_its_column() {
        let schema = TreeSchema::new("nodes")
            .mapped_field("title", "node_title", "TEXT")
            .order_by("title")
            .validate()
            .expect("valid schema");
        assert_eq!(schema.order, "\"node_title\"");
    }

    #[test]
    fn rejects_bad_mappings() {
        assert!(matches!(
            TreeSchema::new("nodes; drop").validate(),
            Err(SchemaError::InvalidIdent { role: "table", .. })
        ));
        assert_eq!(
            TreeSchema::new("nodes").field("l", "TEXT").validate().unwrap_err(),
            SchemaError::DuplicateColumn("l".to_string())
        );
        assert_eq!(
            TreeSchema::new("nodes").field("left", "TEXT").validate().unwrap_err(),
            SchemaError::ReservedField("left".to_string())
        );
        assert_eq!(
            TreeSchema::new("nodes").order_by("missing").validate().unwrap_err(),
            SchemaError::UnknownOrderField("missing".to_string())
        );
        assert_eq!(
            TreeSchema::new("nodes")
                .field("title", "TEXT; DROP TABLE x")
                .validate()
                .unwrap_err(),
            SchemaError::InvalidSqlType("TEXT; DROP TABLE x".to_string())
        );
        assert_eq!(
            TreeSchema::new("nodes")
                .partition("L", PartitionKey::Integer(1))
                .validate()
                .unwrap_err(),
            SchemaError::DuplicateColumn("L".to_string())
        );
    }
}
