use thiserror::Error;

/// Unified error type for translation and execution across all backends
#[derive(Error, Debug)]
pub enum DataError {
    /// The query uses a combinator or comparison the backend cannot express
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A value has no representation on the destination backend
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// A composite value references a user-defined type missing from backend metadata
    #[error("Unknown structural type: {0}")]
    UnknownStructuralType(String),

    /// Operation-level capability absent on this backend (e.g. TTL)
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// Connection failed (authentication, network, etc.)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Waiting on an operation exceeded its bound
    #[error("Query timeout after {0}ms")]
    QueryTimeout(u64),

    /// Caller stopped waiting on an operation
    #[error("Wait cancelled: {0}")]
    Cancelled(String),

    /// Invalid query structure or parameters
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error reported by the vendor client, passed through unchanged
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DataError {
    /// Create an unsupported operator error
    pub fn unsupported_operator(msg: impl Into<String>) -> Self {
        DataError::UnsupportedOperator(msg.into())
    }

    /// Create an unsupported value error
    pub fn unsupported_value(msg: impl Into<String>) -> Self {
        DataError::UnsupportedValue(msg.into())
    }

    /// Create an unknown structural type error
    pub fn unknown_structural_type(msg: impl Into<String>) -> Self {
        DataError::UnknownStructuralType(msg.into())
    }

    /// Create an unsupported capability error
    pub fn unsupported_capability(msg: impl Into<String>) -> Self {
        DataError::UnsupportedCapability(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        DataError::InvalidConfiguration(msg.into())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::SerializationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
