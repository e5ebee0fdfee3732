//! Output streams of the verification log.
//!
//! Each category has its own start/end markers and its own ordering. Blocks
//! are written category by category in [`DRAIN_ORDER`], independent of the
//! order in which the decoder produced them.

use serde::{Deserialize, Serialize};

/// One of the fixed output streams a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Per-OBU record trace (`#0` ... `##`)
    Record,
    /// Container (MP4 box) trace (`#1` ... `##`)
    Container,
    /// Decoder operation trace (`$0` ... `$$`)
    DecoderOp,
}

/// Order in which categories are written when a session closes.
pub const DRAIN_ORDER: [Category; 3] = [Category::Container, Category::Record, Category::DecoderOp];

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 3;

    /// All categories, in declaration order.
    pub const ALL: [Category; Self::COUNT] = [Category::Record, Category::Container, Category::DecoderOp];

    /// Dense index, used to address per-category buckets.
    pub fn index(self) -> usize {
        match self {
            Category::Record => 0,
            Category::Container => 1,
            Category::DecoderOp => 2,
        }
    }

    /// Line opening every block of this category.
    pub fn start_marker(self) -> &'static str {
        match self {
            Category::Record => "#0",
            Category::Container => "#1",
            Category::DecoderOp => "$0",
        }
    }

    /// Line closing every block of this category.
    pub fn end_marker(self) -> &'static str {
        match self {
            Category::Record | Category::Container => "##",
            Category::DecoderOp => "$$",
        }
    }

    /// Identify a category from its start marker line.
    pub fn from_start_marker(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.start_marker() == line)
    }

    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Category::Record => "record",
            Category::Container => "container",
            Category::DecoderOp => "decoder_op",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(Category::Record.start_marker(), "#0");
        assert_eq!(Category::Record.end_marker(), "##");
        assert_eq!(Category::Container.start_marker(), "#1");
        assert_eq!(Category::Container.end_marker(), "##");
        assert_eq!(Category::DecoderOp.start_marker(), "$0");
        assert_eq!(Category::DecoderOp.end_marker(), "$$");
    }

    #[test]
    fn test_indices_are_dense() {
        let mut seen = [false; Category::COUNT];
        for category in Category::ALL {
            seen[category.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_drain_order_covers_every_category() {
        for category in Category::ALL {
            assert!(DRAIN_ORDER.contains(&category));
        }
        assert_eq!(DRAIN_ORDER[0], Category::Container);
    }

    #[test]
    fn test_from_start_marker() {
        assert_eq!(Category::from_start_marker("$0"), Some(Category::DecoderOp));
        assert_eq!(Category::from_start_marker("##"), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Category::DecoderOp).unwrap();
        assert_eq!(json, "\"decoder_op\"");
        let parsed: Category = serde_json::from_str("\"container\"").unwrap();
        assert_eq!(parsed, Category::Container);
    }
}
