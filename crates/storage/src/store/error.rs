#![forbid(unsafe_code)]

use super::schema::SchemaError;
use arbor_core::ids::NodeId;

/// Logical step of a tree operation, reported with backend failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Begin,
    Resolve,
    MakeRoom,
    AllocateId,
    Insert,
    DeleteSubtree,
    Collapse,
    Reparent,
    Offset,
    UpdatePayload,
    Read,
    Install,
    Commit,
    Rollback,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Resolve => "resolve",
            Self::MakeRoom => "make_room",
            Self::AllocateId => "allocate_id",
            Self::Insert => "insert",
            Self::DeleteSubtree => "delete_subtree",
            Self::Collapse => "collapse",
            Self::Reparent => "reparent",
            Self::Offset => "offset",
            Self::UpdatePayload => "update_payload",
            Self::Read => "read",
            Self::Install => "install",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
        }
    }
}

#[derive(Debug)]
pub enum TreeError {
    Io(std::io::Error),
    Config(String),
    Schema(SchemaError),
    NotFound(NodeId),
    EmptyTree,
    InvalidMove(&'static str),
    InvalidInput(&'static str),
    UnknownField(String),
    ProtectedField(String),
    Unsupported(&'static str),
    Backend {
        step: Step,
        source: rusqlite::Error,
    },
}

impl TreeError {
    /// Step that failed when the backend rejected a statement.
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            Self::Backend { step, .. } => Some(*step),
            _ => None,
        }
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Config(message) => write!(f, "config: {message}"),
            Self::Schema(err) => write!(f, "schema: {err}"),
            Self::NotFound(id) => write!(f, "element with id {id} does not exist"),
            Self::EmptyTree => write!(f, "tree has no root"),
            Self::InvalidMove(message) => write!(f, "invalid move: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::UnknownField(name) => write!(f, "unknown payload field: {name}"),
            Self::ProtectedField(name) => {
                write!(f, "field {name} is maintained by the tree and cannot be updated")
            }
            Self::Unsupported(operation) => write!(f, "{operation} is not supported"),
            Self::Backend { step, source } => {
                write!(f, "sqlite (step={}): {source}", step.as_str())
            }
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TreeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SchemaError> for TreeError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<rusqlite::Error> for TreeError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend {
            step: Step::Read,
            source: value,
        }
    }
}

pub(crate) trait StepExt<T> {
    fn step(self, step: Step) -> Result<T, TreeError>;
}

impl<T> StepExt<T> for Result<T, rusqlite::Error> {
    fn step(self, step: Step) -> Result<T, TreeError> {
        self.map_err(|source| TreeError::Backend { step, source })
    }
}
