//! Session configuration.

use serde::{Deserialize, Serialize};

/// Upper bound on the rendered size of a single record.
pub const DEFAULT_MAX_RECORD_BYTES: usize = 100_000;

/// Payloads shorter than this are stored inline in the record.
pub const DEFAULT_INLINE_CAPACITY: usize = 256;

/// Tunables for a [`VlogSession`](crate::session::VlogSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rendering a record past this many bytes fails with
    /// [`VlogError::SerializationOverflow`](crate::VlogError::SerializationOverflow).
    pub max_record_bytes: usize,

    /// Payloads below this length stay inline, longer ones move to the heap.
    /// Clamped to [`DEFAULT_INLINE_CAPACITY`].
    pub inline_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            inline_capacity: DEFAULT_INLINE_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Override the per-record rendering bound.
    pub fn with_max_record_bytes(mut self, bytes: usize) -> Self {
        self.max_record_bytes = bytes;
        self
    }

    /// Override the inline payload threshold.
    pub fn with_inline_capacity(mut self, bytes: usize) -> Self {
        self.inline_capacity = bytes.min(DEFAULT_INLINE_CAPACITY);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_record_bytes, 100_000);
        assert_eq!(config.inline_capacity, 256);
    }

    #[test]
    fn test_inline_capacity_is_clamped() {
        let config = SessionConfig::default().with_inline_capacity(4096);
        assert_eq!(config.inline_capacity, DEFAULT_INLINE_CAPACITY);

        let config = SessionConfig::default().with_inline_capacity(16);
        assert_eq!(config.inline_capacity, 16);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"max_record_bytes": 512}"#).unwrap();
        assert_eq!(config.max_record_bytes, 512);
        assert_eq!(config.inline_capacity, DEFAULT_INLINE_CAPACITY);
    }
}
