//! Fenced code block extraction and fix selection
//!
//! Models answer in markdown; the fix is whichever fenced block matches the
//! target file's language. When a model forgets the fence tag we fall back
//! to the first untagged block that looks substantial.

use super::types::CodeBlock;
use regex::Regex;
use std::sync::OnceLock;

/// A block with more non-blank lines than this replaces the whole file
const WHOLE_FILE_MIN_LINES: usize = 3;
/// An untagged block needs more non-blank lines than this to be used as a fix
const UNTAGGED_FALLBACK_MIN_LINES: usize = 2;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```([A-Za-z0-9_+\-]*)[ \t]*\r?\n(.*?)```")
            .unwrap_or_else(|_| Regex::new("$^").unwrap())
    })
}

/// Extract every non-empty fenced block, in order of appearance.
pub fn extract_code_blocks(response: &str) -> Vec<CodeBlock> {
    fence_regex()
        .captures_iter(response)
        .filter_map(|caps| {
            let language = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let code = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            if code.trim().is_empty() {
                return None;
            }
            Some(CodeBlock::new(language.trim(), code.trim_end_matches('\n')))
        })
        .collect()
}

/// Collapse a fence tag or file type onto its canonical dialect name.
///
/// Unknown tags are only lowercased so that e.g. a `python` block still
/// matches a `python` file type.
pub fn canonical_tag(tag: &str) -> String {
    let tag = tag.trim().to_lowercase();
    match tag.as_str() {
        "sh" | "bash" | "shell" => "bash".to_string(),
        "ps" | "ps1" | "powershell" => "powershell".to_string(),
        "md" | "markdown" => "markdown".to_string(),
        _ => tag,
    }
}

fn language_matches(language: &str, file_type: &str) -> bool {
    let language = canonical_tag(language);
    !language.is_empty() && language == canonical_tag(file_type)
}

pub(crate) fn count_non_blank_lines(code: &str) -> usize {
    code.lines().filter(|l| !l.trim().is_empty()).count()
}

fn with_whole_flag(mut block: CodeBlock) -> CodeBlock {
    block.is_whole = count_non_blank_lines(&block.code) > WHOLE_FILE_MIN_LINES;
    block
}

/// Pick the blocks that should be applied to a file of `file_type`.
pub fn identify_fix_blocks(blocks: &[CodeBlock], file_type: &str) -> Vec<CodeBlock> {
    let matched: Vec<CodeBlock> = blocks
        .iter()
        .filter(|b| language_matches(&b.language, file_type))
        .cloned()
        .map(with_whole_flag)
        .collect();

    if !matched.is_empty() {
        return matched;
    }

    blocks
        .iter()
        .find(|b| {
            b.language.is_empty() && count_non_blank_lines(&b.code) > UNTAGGED_FALLBACK_MIN_LINES
        })
        .cloned()
        .map(with_whole_flag)
        .into_iter()
        .collect()
}
