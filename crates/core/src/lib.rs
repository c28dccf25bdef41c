#![forbid(unsafe_code)]

pub mod interval;
pub mod verify;

pub mod ids {
    /// Stable identity of one tree row, assigned by the store at creation time.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct NodeId(i64);

    impl NodeId {
        pub const fn new(value: i64) -> Self {
            Self(value)
        }

        pub const fn get(self) -> i64 {
            self.0
        }
    }

    impl From<i64> for NodeId {
        fn from(value: i64) -> Self {
            Self(value)
        }
    }

    impl std::fmt::Display for NodeId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
}

pub mod ident {
    /// A table or column name that is safe to splice into SQL text.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct SqlIdent(String);

    impl SqlIdent {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, SqlIdentError> {
            let value = value.into();
            validate_ident(&value)?;
            Ok(Self(value))
        }

        /// Double-quoted form, usable even for reserved words like `left`.
        pub fn quoted(&self) -> String {
            format!("\"{}\"", self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum SqlIdentError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    impl SqlIdentError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "identifier must not be empty",
                Self::TooLong => "identifier is too long",
                Self::InvalidFirstChar => "identifier must start with a letter or '_'",
                Self::InvalidChar { .. } => "identifier may only contain [A-Za-z0-9_]",
            }
        }
    }

    impl std::fmt::Display for SqlIdentError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::InvalidChar { ch, index } => {
                    write!(f, "{} (found {ch:?} at {index})", self.message())
                }
                other => f.write_str(other.message()),
            }
        }
    }

    fn validate_ident(value: &str) -> Result<(), SqlIdentError> {
        if value.is_empty() {
            return Err(SqlIdentError::Empty);
        }
        if value.len() > 64 {
            return Err(SqlIdentError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(SqlIdentError::Empty);
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(SqlIdentError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate().skip(1) {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                continue;
            }
            return Err(SqlIdentError::InvalidChar { ch, index });
        }
        Ok(())
    }

}
