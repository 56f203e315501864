//! Error types for reflection graph access

use crate::descriptor::ObjectId;
use thiserror::Error;

/// Errors raised while reading a reflection graph
#[derive(Debug, Error)]
pub enum ReflectError {
    /// An id does not resolve to an object in the graph
    #[error("Unknown object id {0}")]
    UnknownObject(ObjectId),

    /// A read past the end of a default instance's memory
    #[error("Instance read of {len} bytes at offset {offset} exceeds instance size {size}")]
    InstanceOutOfBounds {
        /// Requested start offset
        offset: usize,
        /// Requested byte count
        len: usize,
        /// Actual instance size
        size: usize,
    },

    /// Snapshot file could not be read or written
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot JSON is malformed
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot parsed but references objects that do not exist
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result alias for reflection operations
pub type ReflectResult<T> = Result<T, ReflectError>;
