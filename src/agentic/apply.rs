//! Multi-step fix orchestration and transactional apply
//!
//! All candidate blocks are checked together before anything is applied.
//! Each block then goes through [`apply_fix`], which either commits a
//! validated candidate or hands back the untouched original.

use super::syntax::{validate_syntax, SyntaxError};
use super::types::CodeBlock;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreValidationError {
    #[error("no fix blocks to validate")]
    NoBlocks,
    #[error("fix block {index} is empty or contains only whitespace")]
    EmptyBlock { index: usize },
    #[error("fix block {index} has invalid syntax: {source}")]
    InvalidSyntax {
        index: usize,
        #[source]
        source: SyntaxError,
    },
    #[error("fix blocks {first} and {second} contain duplicate code")]
    DuplicateBlocks { first: usize, second: usize },
    #[error("multiple whole-file replacements detected ({count} blocks marked as whole); only one whole-file replacement is allowed in a multi-step fix")]
    MultipleWholeFile { count: usize },
    #[error("cannot mix whole-file replacement with partial fixes; found {total} blocks with 1 whole-file replacement")]
    MixedReplacement { total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("fix code cannot be empty or whitespace-only")]
    EmptyFix,
    #[error("applied fix resulted in empty or whitespace-only content")]
    EmptyResult,
    #[error("fix validation failed: {0}")]
    Validation(#[source] SyntaxError),
}

/// A single-block apply that was rolled back. `original` is the content as
/// it was before the attempt, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RolledBack {
    pub original: String,
    pub reason: ApplyError,
}

/// A block in a multi-step sequence failed; nothing from the sequence is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fix block {ordinal} failed: {reason}")]
pub struct SequenceError {
    /// 1-based position in the applied order
    pub ordinal: usize,
    pub reason: ApplyError,
}

/// Check the whole candidate set before any block is applied.
///
/// Indices in errors are 1-based positions in `blocks`.
pub fn prevalidate_blocks(blocks: &[CodeBlock], file_type: &str) -> Result<(), PreValidationError> {
    if blocks.is_empty() {
        return Err(PreValidationError::NoBlocks);
    }

    for (i, block) in blocks.iter().enumerate() {
        if block.code.trim().is_empty() {
            return Err(PreValidationError::EmptyBlock { index: i + 1 });
        }
        validate_syntax(&block.code, file_type).map_err(|source| {
            PreValidationError::InvalidSyntax {
                index: i + 1,
                source,
            }
        })?;
    }

    if blocks.len() == 1 {
        return Ok(());
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, block) in blocks.iter().enumerate() {
        if let Some(prev) = seen.insert(block.code.trim(), i) {
            return Err(PreValidationError::DuplicateBlocks {
                first: prev + 1,
                second: i + 1,
            });
        }
    }

    let whole_count = blocks.iter().filter(|b| b.is_whole).count();
    if whole_count > 1 {
        return Err(PreValidationError::MultipleWholeFile { count: whole_count });
    }
    if whole_count == 1 {
        return Err(PreValidationError::MixedReplacement {
            total: blocks.len(),
        });
    }

    Ok(())
}

/// Whole-file blocks first, then partial ones; larger code first within
/// each group. Ties keep their original order.
pub fn order_fix_blocks(mut blocks: Vec<CodeBlock>) -> Vec<CodeBlock> {
    blocks.sort_by(|a, b| {
        b.is_whole
            .cmp(&a.is_whole)
            .then_with(|| b.code.len().cmp(&a.code.len()))
    });
    blocks
}

/// Apply one fix as a full replacement of `original`.
///
/// Backup, normalize, validate, then commit. Any failure returns the
/// original content unchanged inside [`RolledBack`].
pub fn apply_fix(original: &str, fix_code: &str, file_type: &str) -> Result<String, RolledBack> {
    let rollback = |reason| RolledBack {
        original: original.to_string(),
        reason,
    };

    if fix_code.trim().is_empty() {
        return Err(rollback(ApplyError::EmptyFix));
    }

    let mut candidate = fix_code.to_string();
    if !candidate.ends_with('\n') {
        candidate.push('\n');
    }

    if candidate.trim().is_empty() {
        return Err(rollback(ApplyError::EmptyResult));
    }

    if let Err(e) = validate_syntax(&candidate, file_type) {
        return Err(rollback(ApplyError::Validation(e)));
    }

    Ok(candidate)
}

/// Apply `ordered` blocks one after another, each on top of the previous
/// result.
///
/// Every block is a full replacement, so with more than one block only the
/// last one's content survives.
pub fn apply_blocks(
    original: &str,
    ordered: &[CodeBlock],
    file_type: &str,
) -> Result<String, SequenceError> {
    let mut content = original.to_string();
    for (i, block) in ordered.iter().enumerate() {
        content = apply_fix(&content, &block.code, file_type).map_err(|rb| SequenceError {
            ordinal: i + 1,
            reason: rb.reason,
        })?;
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(code: &str, is_whole: bool) -> CodeBlock {
        CodeBlock {
            language: "bash".to_string(),
            code: code.to_string(),
            is_whole,
        }
    }

    const WHOLE: &str = "#!/bin/bash\nset -e\necho one\necho two\n";

    #[test]
    fn test_apply_appends_trailing_newline() {
        let result = apply_fix("echo 'a'", "echo 'a'\necho 'b'", "bash").unwrap();
        assert_eq!(result, "echo 'a'\necho 'b'\n");
        assert!(result.contains("echo 'a'") && result.contains("echo 'b'"));
    }

    #[test]
    fn test_apply_keeps_existing_newline() {
        assert_eq!(apply_fix("", "echo hi\n", "bash").unwrap(), "echo hi\n");
    }

    #[test]
    fn test_apply_rejects_blank_fix_and_returns_original() {
        let original = "echo keep\n";
        let err = apply_fix(original, "  \n\t ", "bash").unwrap_err();
        assert_eq!(err.original, original);
        assert_eq!(err.reason, ApplyError::EmptyFix);
    }

    #[test]
    fn test_apply_rolls_back_on_invalid_syntax() {
        let original = "if true; then\n  echo ok\nfi\n";
        let err = apply_fix(original, "if true; then\n  echo broken", "bash").unwrap_err();
        assert_eq!(err.original, original);
        assert!(matches!(err.reason, ApplyError::Validation(_)));
        assert!(err.to_string().starts_with("fix validation failed: bash syntax error"));
    }

    #[test]
    fn test_apply_has_exactly_two_outcomes() {
        let original = "echo 'orig'";
        let fixes = ["", "echo ok", "echo 'broken", "   ", "x\n", "f() {"];
        for fix in fixes {
            match apply_fix(original, fix, "bash") {
                Ok(content) => {
                    assert!(content.ends_with('\n'));
                    assert_eq!(content.trim_end_matches('\n'), fix.trim_end_matches('\n'));
                }
                Err(rb) => assert_eq!(rb.original, original),
            }
        }
    }

    #[test]
    fn test_prevalidate_empty_list() {
        assert_eq!(prevalidate_blocks(&[], "bash"), Err(PreValidationError::NoBlocks));
    }

    #[test]
    fn test_prevalidate_names_blank_block() {
        let blocks = vec![block("echo a", false), block("   ", false)];
        assert_eq!(
            prevalidate_blocks(&blocks, "bash"),
            Err(PreValidationError::EmptyBlock { index: 2 })
        );
    }

    #[test]
    fn test_prevalidate_names_syntax_failure() {
        let blocks = vec![block("echo a", false), block("echo 'b", false)];
        let err = prevalidate_blocks(&blocks, "bash").unwrap_err();
        assert!(matches!(err, PreValidationError::InvalidSyntax { index: 2, .. }));
        assert_eq!(
            err.to_string(),
            "fix block 2 has invalid syntax: bash syntax error: unmatched single quote"
        );
    }

    #[test]
    fn test_prevalidate_detects_duplicates_by_trimmed_code() {
        let blocks = vec![
            block("echo a", false),
            block("echo b", false),
            block("  echo a\n", false),
        ];
        let err = prevalidate_blocks(&blocks, "bash").unwrap_err();
        assert_eq!(err, PreValidationError::DuplicateBlocks { first: 1, second: 3 });
        let msg = err.to_string();
        assert!(msg.contains('1') && msg.contains('3'));
    }

    #[test]
    fn test_prevalidate_rejects_two_whole_blocks() {
        let other = "#!/bin/bash\nset -u\necho three\necho four\n";
        let blocks = vec![block(WHOLE, true), block(other, true)];
        assert_eq!(
            prevalidate_blocks(&blocks, "bash"),
            Err(PreValidationError::MultipleWholeFile { count: 2 })
        );
    }

    #[test]
    fn test_prevalidate_rejects_whole_mixed_with_partial() {
        let blocks = vec![block("echo patch", false), block(WHOLE, true), block("echo x", false)];
        let err = prevalidate_blocks(&blocks, "bash").unwrap_err();
        assert_eq!(err, PreValidationError::MixedReplacement { total: 3 });
        assert!(err.to_string().contains("cannot mix whole-file replacement"));
    }

    #[test]
    fn test_prevalidate_single_whole_block_passes() {
        assert!(prevalidate_blocks(&[block(WHOLE, true)], "bash").is_ok());
    }

    #[test]
    fn test_prevalidate_partial_blocks_pass() {
        let blocks = vec![block("echo a", false), block("echo b", false)];
        assert!(prevalidate_blocks(&blocks, "bash").is_ok());
    }

    #[test]
    fn test_order_whole_first_then_by_size_stable() {
        let blocks = vec![
            block("bb", false),
            block("aaaa", false),
            block("cc", false),
            block("whole-one", true),
        ];
        let ordered: Vec<String> = order_fix_blocks(blocks)
            .into_iter()
            .map(|b| b.code)
            .collect();
        assert_eq!(ordered, vec!["whole-one", "aaaa", "bb", "cc"]);
    }

    #[test]
    fn test_order_handles_trivial_inputs() {
        assert!(order_fix_blocks(Vec::new()).is_empty());
        assert_eq!(order_fix_blocks(vec![block("x", false)]).len(), 1);
    }

    #[test]
    fn test_sequence_keeps_only_last_block() {
        let ordered = vec![block("echo first-longer", false), block("echo second", false)];
        let result = apply_blocks("echo original\n", &ordered, "bash").unwrap();
        assert_eq!(result, "echo second\n");
    }

    #[test]
    fn test_sequence_reports_failing_ordinal() {
        let ordered = vec![block("echo fine", false), block("  ", false)];
        let err = apply_blocks("echo original\n", &ordered, "bash").unwrap_err();
        assert_eq!(err.ordinal, 2);
        assert_eq!(err.reason, ApplyError::EmptyFix);
    }
}
