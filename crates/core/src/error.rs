/// Coarse classification of a [`RecordError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller passed a value the operation cannot accept (an absent value).
    InvalidArgument,
    /// A document does not have the shape the decoder expects.
    Format,
    /// A decoded index or type tag names no known alternative.
    OutOfRange,
    /// The set of alternative types cannot be serialized unambiguously.
    Configuration,
    /// An internal invariant was broken. Indicates a bug, not bad input.
    Unreachable,
}

/// All errors produced by funrec values and their codecs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A value was required but the optional wrapper was absent.
    #[error("invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    /// A tagged-object document is missing one of its fixed properties.
    #[error("property not found: '{property}'")]
    PropertyNotFound { property: String },

    /// The document (or the text it came from) is malformed.
    #[error("format error: {0}")]
    Format(String),

    /// A positional index outside `1..=arity`.
    #[error("choice index {index} out of range 1..={arity}")]
    IndexOutOfRange { index: i64, arity: usize },

    /// A type tag that matches none of the alternatives.
    #[error("unknown choice type '{tag}', expected one of: {}", .expected.join(", "))]
    UnknownTypeTag { tag: String, expected: Vec<String> },

    /// Alternatives whose canonical names collide, or too few of them.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unreachable: {0}")]
    Unreachable(String),
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            RecordError::PropertyNotFound { .. } | RecordError::Format(_) => ErrorKind::Format,
            RecordError::IndexOutOfRange { .. } | RecordError::UnknownTypeTag { .. } => {
                ErrorKind::OutOfRange
            }
            RecordError::Configuration(_) => ErrorKind::Configuration,
            RecordError::Unreachable(_) => ErrorKind::Unreachable,
        }
    }

    pub(crate) fn absent_argument(argument: &str, message: impl Into<String>) -> Self {
        RecordError::InvalidArgument {
            argument: argument.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn property_not_found(property: &str) -> Self {
        RecordError::PropertyNotFound {
            property: property.to_string(),
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::Format(err.to_string())
    }
}
