#![forbid(unsafe_code)]

use super::error::TreeError;
use super::schema::TreeSchema;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    pub schema: TreeSchema,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl TreeConfig {
    pub fn new(schema: TreeSchema) -> Self {
        Self {
            schema,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn busy_timeout_ms(mut self, value: u64) -> Self {
        self.busy_timeout_ms = value;
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TreeError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| TreeError::Config(err.to_string()))?;
        config.schema.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

impl From<TreeSchema> for TreeConfig {
    fn from(schema: TreeSchema) -> Self {
        Self::new(schema)
    }
}
