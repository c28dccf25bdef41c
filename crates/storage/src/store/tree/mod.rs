#![forbid(unsafe_code)]

mod add;
mod reader;
mod relocate;
mod remove;
mod update;

pub use reader::TreeReader;

use super::error::TreeError;
use super::schema::{ResolvedField, STRUCTURAL_FIELDS, Schema};
use super::types::Payload;
use rusqlite::types::Value;

/// Maps payload keys onto their columns. Structural fields are never writable through a
/// payload; keys the schema does not know are rejected rather than dropped.
fn payload_columns<'a>(
    schema: &'a Schema,
    payload: &'a Payload,
) -> Result<Vec<(&'a ResolvedField, &'a Value)>, TreeError> {
    let mut out = Vec::with_capacity(payload.len());
    for (name, value) in payload {
        if STRUCTURAL_FIELDS.contains(&name.as_str()) {
            return Err(TreeError::ProtectedField(name.clone()));
        }
        let field = schema
            .field(name)
            .ok_or_else(|| TreeError::UnknownField(name.clone()))?;
        out.push((field, value));
    }
    Ok(out)
}
