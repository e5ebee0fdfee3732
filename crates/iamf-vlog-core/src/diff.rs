//! Block-level comparison of two verification logs.
//!
//! Logs are split into marker-delimited blocks and compared category by
//! category, block by block. Only the first mismatch of each category is
//! reported; later blocks usually differ as a consequence.

use std::fmt;

use crate::category::{Category, DRAIN_ORDER};
use crate::error::{VlogError, VlogResult};

/// One marker-delimited block of a parsed log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub category: Category,
    /// 1-based line number of the start marker.
    pub line: usize,
    /// Lines between the markers.
    pub body: Vec<&'a str>,
}

/// Split a verification log into blocks.
///
/// Blank lines between blocks are ignored. Anything else outside a block,
/// or a block missing its end marker, is an error.
pub fn split_blocks(log: &str) -> VlogResult<Vec<Block<'_>>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for (index, line) in log.lines().enumerate() {
        let line_no = index + 1;
        if let Some(block) = current.as_mut() {
            if line == block.category.end_marker() {
                blocks.extend(current.take());
            } else {
                block.body.push(line);
            }
            continue;
        }

        if !line.trim().is_empty() {
            let category = Category::from_start_marker(line).ok_or_else(|| {
                VlogError::InvalidRecord(format!(
                    "line {line_no}: expected a block start marker, found {line:?}"
                ))
            })?;
            current = Some(Block {
                category,
                line: line_no,
                body: Vec::new(),
            });
        }
    }

    if let Some(open) = current {
        return Err(VlogError::InvalidRecord(format!(
            "line {}: {} block is missing its end marker",
            open.line, open.category
        )));
    }
    Ok(blocks)
}

/// First difference found in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMismatch {
    pub category: Category,
    /// 0-based index of the block within its category.
    pub index: usize,
    /// Start-marker line in each log; `None` when the block is missing.
    pub actual_line: Option<usize>,
    pub reference_line: Option<usize>,
    /// First differing body line in each block.
    pub actual: Option<String>,
    pub reference: Option<String>,
}

impl fmt::Display for BlockMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |line: &Option<usize>, text: &Option<String>| match (line, text) {
            (None, _) => "<missing block>".to_string(),
            (Some(n), Some(text)) => format!("line {n}: {text:?}"),
            (Some(n), None) => format!("line {n}: <end of block>"),
        };
        write!(
            f,
            "{} block #{}: actual {} / reference {}",
            self.category,
            self.index,
            show(&self.actual_line, &self.actual),
            show(&self.reference_line, &self.reference)
        )
    }
}

/// Outcome of [`diff_logs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// Blocks present in both logs, per category in drain order.
    pub compared: Vec<(Category, usize)>,
    pub mismatches: Vec<BlockMismatch>,
}

impl DiffReport {
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compare `actual` against `reference`.
pub fn diff_logs(actual: &str, reference: &str) -> VlogResult<DiffReport> {
    let actual = split_blocks(actual)?;
    let reference = split_blocks(reference)?;
    let mut report = DiffReport::default();

    for category in DRAIN_ORDER {
        let ours: Vec<_> = actual.iter().filter(|b| b.category == category).collect();
        let theirs: Vec<_> = reference.iter().filter(|b| b.category == category).collect();
        report.compared.push((category, ours.len().min(theirs.len())));

        for index in 0..ours.len().max(theirs.len()) {
            let a = ours.get(index).copied();
            let r = theirs.get(index).copied();
            if let Some(mismatch) = compare_block(category, index, a, r) {
                report.mismatches.push(mismatch);
                break;
            }
        }
    }

    Ok(report)
}

fn compare_block(
    category: Category,
    index: usize,
    actual: Option<&Block<'_>>,
    reference: Option<&Block<'_>>,
) -> Option<BlockMismatch> {
    let mut mismatch = BlockMismatch {
        category,
        index,
        actual_line: actual.map(|b| b.line),
        reference_line: reference.map(|b| b.line),
        actual: None,
        reference: None,
    };

    let (a, r) = match (actual, reference) {
        (Some(a), Some(r)) => (a, r),
        (None, None) => return None,
        (Some(a), None) => {
            mismatch.actual = a.body.first().map(|s| s.to_string());
            return Some(mismatch);
        }
        (None, Some(r)) => {
            mismatch.reference = r.body.first().map(|s| s.to_string());
            return Some(mismatch);
        }
    };

    let len = a.body.len().max(r.body.len());
    for offset in 0..len {
        let ours = a.body.get(offset);
        let theirs = r.body.get(offset);
        if ours != theirs {
            // Point at the differing line rather than the start marker.
            mismatch.actual_line = Some(a.line + 1 + offset);
            mismatch.reference_line = Some(r.line + 1 + offset);
            mismatch.actual = ours.map(|s| s.to_string());
            mismatch.reference = theirs.map(|s| s.to_string());
            return Some(mismatch);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "#1\nbox\n##\n#0\nTemporalDelimiterOBU_0:\n##\n#0\nSyncOBU_1:\n- global_offset: 0\n##\n$0\nop\n$$\n";

    #[test]
    fn test_split_blocks() {
        let blocks = split_blocks(LOG).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].category, Category::Container);
        assert_eq!(blocks[1].line, 4);
        assert_eq!(blocks[2].body, vec!["SyncOBU_1:", "- global_offset: 0"]);
        assert_eq!(blocks[3].category, Category::DecoderOp);
    }

    #[test]
    fn test_split_rejects_stray_lines() {
        let err = split_blocks("hello\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_split_rejects_unterminated_block() {
        let err = split_blocks("#0\nSyncOBU_0:\n").unwrap_err();
        assert!(err.to_string().contains("missing its end marker"));
    }

    #[test]
    fn test_decoder_op_block_needs_its_own_end_marker() {
        // "##" inside a decoder-op block is body text, not a terminator
        let blocks = split_blocks("$0\n##\n$$\n").unwrap();
        assert_eq!(blocks[0].body, vec!["##"]);
    }

    #[test]
    fn test_identical_logs_match() {
        let report = diff_logs(LOG, LOG).unwrap();
        assert!(report.is_match());
        assert_eq!(
            report.compared,
            vec![
                (Category::Container, 1),
                (Category::Record, 2),
                (Category::DecoderOp, 1)
            ]
        );
    }

    #[test]
    fn test_field_mismatch_is_located() {
        let other = LOG.replace("- global_offset: 0", "- global_offset: 7");
        let report = diff_logs(&other, LOG).unwrap();
        assert_eq!(report.mismatches.len(), 1);

        let mismatch = &report.mismatches[0];
        assert_eq!(mismatch.category, Category::Record);
        assert_eq!(mismatch.index, 1);
        assert_eq!(mismatch.actual_line, Some(9));
        assert_eq!(mismatch.actual.as_deref(), Some("- global_offset: 7"));
        assert_eq!(mismatch.reference.as_deref(), Some("- global_offset: 0"));
    }

    #[test]
    fn test_missing_block_is_reported() {
        let shorter = "#1\nbox\n##\n#0\nTemporalDelimiterOBU_0:\n##\n$0\nop\n$$\n";
        let report = diff_logs(shorter, LOG).unwrap();
        assert_eq!(report.mismatches.len(), 1);
        let mismatch = &report.mismatches[0];
        assert_eq!(mismatch.actual_line, None);
        assert!(mismatch.to_string().contains("<missing block>"));
    }
}
