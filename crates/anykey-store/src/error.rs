use anykey_types::{Value, ValueKind};

/// Errors from container operations.
///
/// Every error is raised by the call that detects it. A failed operation
/// leaves the container unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Parallel key and value inputs have different lengths.
    #[error("the number of keys ({keys}) does not match the number of values ({values})")]
    KeyValueCountMismatch { keys: usize, values: usize },

    /// No stored key matches the requested key.
    #[error("undefined index: {0}")]
    KeyNotFound(Value),

    /// The key kind cannot be normalized into a native map key.
    #[error("the key type, {0}, is not valid")]
    InvalidKeyType(ValueKind),

    /// An append found its next integer key already in use.
    #[error("cannot append: the next index {0} is already occupied")]
    NextIndexOccupied(i64),

    /// Encoding a container failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Decoding a container payload failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Serialized bytes do not belong to this container variant or version,
    /// or the decoded state is inconsistent.
    #[error("invalid serialized form: {0}")]
    Format(String),

    /// Configuration text could not be parsed.
    #[error("invalid options: {0}")]
    Options(String),
}

/// Result alias for container operations.
pub type StoreResult<T> = Result<T, StoreError>;
