//! Pending log records and their payload storage.

use crate::category::Category;
use crate::config::DEFAULT_INLINE_CAPACITY;
use crate::error::{VlogError, VlogResult};

/// Rendered text of one record.
///
/// Short texts live inline in the record; longer ones get their own heap
/// allocation. The variant is fixed at construction.
#[derive(Clone, PartialEq, Eq)]
pub enum Payload {
    Inline(InlineText),
    Heap(Box<str>),
}

/// Fixed-capacity inline text buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineText {
    len: usize,
    bytes: [u8; DEFAULT_INLINE_CAPACITY],
}

impl InlineText {
    fn new(text: &str) -> Option<Self> {
        if text.len() >= DEFAULT_INLINE_CAPACITY {
            return None;
        }
        let mut bytes = [0u8; DEFAULT_INLINE_CAPACITY];
        bytes[..text.len()].copy_from_slice(text.as_bytes());
        Some(Self {
            len: text.len(),
            bytes,
        })
    }

    fn as_str(&self) -> &str {
        // Filled from a whole &str, so always valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }
}

impl Payload {
    /// Store `text`, inline when shorter than `inline_capacity`.
    ///
    /// Fails with [`VlogError::AllocationFailure`] only on the heap path.
    pub fn new(text: &str, inline_capacity: usize) -> VlogResult<Self> {
        if text.len() < inline_capacity {
            if let Some(inline) = InlineText::new(text) {
                return Ok(Payload::Inline(inline));
            }
        }

        let mut owned = String::new();
        owned
            .try_reserve_exact(text.len())
            .map_err(|_| VlogError::AllocationFailure { bytes: text.len() })?;
        owned.push_str(text);
        Ok(Payload::Heap(owned.into_boxed_str()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Payload::Inline(inline) => inline.as_str(),
            Payload::Heap(text) => text,
        }
    }

    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Payload::Inline(_))
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_inline() { "Inline" } else { "Heap" };
        f.debug_tuple(kind).field(&self.as_str()).finish()
    }
}

/// One pending trace entry, owned by the store until drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub category: Category,
    /// Emission sequence number; not unique.
    pub key: u64,
    pub payload: Payload,
}

impl LogRecord {
    pub fn new(category: Category, key: u64, payload: Payload) -> Self {
        Self {
            category,
            key,
            payload,
        }
    }

    pub fn text(&self) -> &str {
        self.payload.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_inline() {
        let payload = Payload::new("#0\nTemporalDelimiterOBU_0:\n##\n", 256).unwrap();
        assert!(payload.is_inline());
        assert_eq!(payload.as_str(), "#0\nTemporalDelimiterOBU_0:\n##\n");
    }

    #[test]
    fn test_inline_boundary() {
        let exact = "x".repeat(255);
        assert!(Payload::new(&exact, 256).unwrap().is_inline());

        let over = "x".repeat(256);
        let payload = Payload::new(&over, 256).unwrap();
        assert!(!payload.is_inline());
        assert_eq!(payload.len(), 256);
    }

    #[test]
    fn test_lower_capacity_moves_to_heap() {
        let payload = Payload::new("abcdefgh", 4).unwrap();
        assert!(!payload.is_inline());
        assert_eq!(payload.as_str(), "abcdefgh");
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::new("", 256).unwrap();
        assert!(payload.is_empty());
        assert!(payload.is_inline());
    }

    #[test]
    fn test_multibyte_text_survives_inline() {
        let payload = Payload::new("label: \"Stéréo\"\n", 256).unwrap();
        assert!(payload.is_inline());
        assert_eq!(payload.as_str(), "label: \"Stéréo\"\n");
    }
}
