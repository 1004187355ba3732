//! Error types for loading and flattening.

/// Error raised by an [`Executor`](crate::executor::Executor).
///
/// Drivers box their own error type; it is carried through untouched so
/// callers can downcast it back.
pub type ExecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while writing tables or flattening trees.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The write was configured in a way that cannot run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The tabular input could not be interpreted.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The tree input has no usable root.
    #[error("Malformed tree: {0}")]
    MalformedTree(String),

    /// Error reported by the execution layer, surfaced verbatim.
    #[error(transparent)]
    Execution(ExecError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (reading configuration or input files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Builds a [`LoadError::Configuration`] from anything displayable.
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Builds a [`LoadError::MalformedInput`] from anything displayable.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Returns the driver error when this is an execution failure.
    #[must_use]
    pub fn execution_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Execution(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Result type for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
