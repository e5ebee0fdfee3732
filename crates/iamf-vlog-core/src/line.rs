//! Indented line formatting and the block builder built on top of it.
//!
//! A block is a start marker, a run of YAML-like lines whose indentation
//! encodes nesting, and an end marker:
//!
//! ```text
//! #0
//! CodecConfigOBU_1:
//! - codec_config_id: 0
//!   codec_config:
//!     codec_id: 1332770163
//! ##
//! ```

use std::fmt::{self, Display, Write as _};

use crate::category::Category;
use crate::error::{VlogError, VlogResult};

/// One level of indentation.
pub const INDENT: &str = "  ";

/// Append `indent` indentation units, the formatted arguments, and a newline
/// to `out`. Returns the number of bytes appended.
pub fn format_line(out: &mut String, indent: usize, args: fmt::Arguments<'_>) -> usize {
    let start = out.len();
    for _ in 0..indent {
        out.push_str(INDENT);
    }
    // Writing into a String cannot fail.
    let _ = out.write_fmt(args);
    out.push('\n');
    out.len() - start
}

/// Bounded builder for one marker-delimited block.
///
/// Line methods never fail individually. Once a line would push the block
/// past its limit, the block stops growing and [`TraceBlock::finish`] reports
/// [`VlogError::SerializationOverflow`] with the size it would have reached.
///
/// A line that spans several lines or reads as a block marker would break
/// the framing of the log. Such a line is dropped and `finish` reports
/// [`VlogError::InvalidRecord`].
#[derive(Debug, Clone)]
pub struct TraceBlock {
    category: Category,
    text: String,
    limit: usize,
    attempted: usize,
    /// First framing violation, reported by `finish`.
    invalid: Option<String>,
}

impl TraceBlock {
    /// Start a block of `category`, bounded to `limit` bytes including markers.
    pub fn new(category: Category, limit: usize) -> Self {
        let mut block = Self {
            category,
            text: String::new(),
            limit,
            attempted: 0,
            invalid: None,
        };
        block.push(0, format_args!("{}", category.start_marker()));
        block
    }

    /// Category whose markers bracket this block.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Bytes rendered so far.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True until the first line lands (never, once constructed).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether a line has already been rejected for exceeding the limit.
    pub fn overflowed(&self) -> bool {
        self.attempted > self.limit
    }

    /// Whether a line has been rejected for breaking the block framing.
    pub fn is_invalid(&self) -> bool {
        self.invalid.is_some()
    }

    /// Append a raw formatted line.
    ///
    /// The formatted text must be a single line and, unindented, must not
    /// equal a block marker.
    pub fn line(&mut self, indent: usize, args: fmt::Arguments<'_>) -> &mut Self {
        let start = self.text.len();
        self.push(indent, args);
        if self.overflowed() || self.text.len() == start {
            return self;
        }

        let content = &self.text[start + indent * INDENT.len()..self.text.len() - 1];
        let reason = if content.contains(|c: char| c == '\n' || c == '\r') {
            Some(format!("line {content:?} spans several lines"))
        } else if indent == 0 && is_marker(content) {
            Some(format!("line {content:?} would be read as a block marker"))
        } else {
            None
        };
        if let Some(reason) = reason {
            self.text.truncate(start);
            self.attempted = self.text.len();
            if self.invalid.is_none() {
                self.invalid = Some(reason);
            }
        }
        self
    }

    /// Append a line without checking its framing.
    fn push(&mut self, indent: usize, args: fmt::Arguments<'_>) {
        if self.overflowed() {
            self.attempted += measure(indent, args);
            return;
        }
        let start = self.text.len();
        let written = format_line(&mut self.text, indent, args);
        self.attempted = start + written;
        if self.overflowed() {
            self.text.truncate(start);
        }
    }

    /// `key:` opening a nested field group.
    pub fn key(&mut self, indent: usize, key: &str) -> &mut Self {
        self.line(indent, format_args!("{key}:"))
    }

    /// `key: value`
    pub fn field(&mut self, indent: usize, key: &str, value: impl Display) -> &mut Self {
        self.line(indent, format_args!("{key}: {value}"))
    }

    /// `key: "value"`, with quotes, backslashes and line breaks escaped.
    pub fn quoted(&mut self, indent: usize, key: &str, value: &str) -> &mut Self {
        self.line(indent, format_args!("{key}: \"{}\"", Escaped(value)))
    }

    /// `- value`
    pub fn item(&mut self, indent: usize, value: impl Display) -> &mut Self {
        self.line(indent, format_args!("- {value}"))
    }

    /// `- key:` opening a list item that is itself a field group.
    pub fn item_key(&mut self, indent: usize, key: &str) -> &mut Self {
        self.line(indent, format_args!("- {key}:"))
    }

    /// `- key: value`, the first field of a list item.
    pub fn item_field(&mut self, indent: usize, key: &str, value: impl Display) -> &mut Self {
        self.line(indent, format_args!("- {key}: {value}"))
    }

    /// Close the block with its end marker and hand back the text.
    pub fn finish(mut self) -> VlogResult<String> {
        if let Some(reason) = self.invalid.take() {
            return Err(VlogError::InvalidRecord(format!(
                "{} block: {reason}",
                self.category
            )));
        }
        let end = self.category.end_marker();
        self.push(0, format_args!("{end}"));
        if self.overflowed() {
            return Err(VlogError::SerializationOverflow {
                limit: self.limit,
                attempted: self.attempted,
            });
        }
        Ok(self.text)
    }
}

/// Whether `line` is the start or end marker of any category.
fn is_marker(line: &str) -> bool {
    Category::ALL
        .iter()
        .any(|c| line == c.start_marker() || line == c.end_marker())
}

/// Double-quoted string content with `"`, `\\` and line breaks escaped.
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Length a line would occupy, without keeping it.
fn measure(indent: usize, args: fmt::Arguments<'_>) -> usize {
    let mut scratch = String::new();
    format_line(&mut scratch, indent, args)
}
