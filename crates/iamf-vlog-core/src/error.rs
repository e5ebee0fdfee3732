//! Error types for the verification log generator

use thiserror::Error;

/// Main error type for verification log operations
#[derive(Error, Debug)]
pub enum VlogError {
    /// Destination could not be created, removed, written, or closed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Emit or close was called on a closed session
    #[error("Log session is not open")]
    NotOpen,

    /// Rendered record text exceeds the per-record bound
    #[error("Serialization overflow: record needs {attempted} bytes, limit is {limit}")]
    SerializationOverflow {
        /// Configured upper bound in bytes
        limit: usize,
        /// Size the record would have reached
        attempted: usize,
    },

    /// Heap payload for an oversized record could not be obtained
    #[error("Allocation failure: could not reserve {bytes} bytes for record payload")]
    AllocationFailure {
        /// Requested payload size
        bytes: usize,
    },

    /// Record description could not be decoded
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<serde_json::Error> for VlogError {
    fn from(err: serde_json::Error) -> Self {
        VlogError::InvalidRecord(err.to_string())
    }
}

/// Result type alias using VlogError
pub type VlogResult<T> = Result<T, VlogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VlogError::SerializationOverflow {
            limit: 100,
            attempted: 140,
        };
        assert_eq!(
            format!("{}", err),
            "Serialization overflow: record needs 140 bytes, limit is 100"
        );
        assert_eq!(format!("{}", VlogError::NotOpen), "Log session is not open");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vlog_err: VlogError = io_err.into();
        assert!(matches!(vlog_err, VlogError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let vlog_err: VlogError = json_err.into();
        assert!(matches!(vlog_err, VlogError::InvalidRecord(_)));
    }
}
