//! Inline diff annotation
//!
//! Marks the single contiguous span that differs between two versions of a
//! file. Removed lines are prefixed with [`DEL_MARKER`], added lines with
//! [`ADD_MARKER`]; everything else is copied verbatim.

pub const DEL_MARKER: &str = "~DEL~";
pub const ADD_MARKER: &str = "~ADD~";

/// A single line of an annotated diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Add(String),
    Remove(String),
}

impl DiffLine {
    pub fn content(&self) -> &str {
        match self {
            DiffLine::Context(s) => s,
            DiffLine::Add(s) => s,
            DiffLine::Remove(s) => s,
        }
    }
}

/// The differing region between two line lists.
///
/// `start` is shared; `old_end` and `new_end` are exclusive ends in the
/// original and modified lines. Either range may be empty (pure insertion
/// or pure deletion) but not both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSpan {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

/// Find the first and last differing lines. `None` when identical.
///
/// The scan from the back stops before it reaches the front mismatch, so
/// the two ends never overlap.
pub fn change_span(original: &[&str], modified: &[&str]) -> Option<ChangeSpan> {
    let common = original.len().min(modified.len());

    let start = match (0..common).find(|&i| original[i] != modified[i]) {
        Some(i) => i,
        None if original.len() != modified.len() => common,
        None => return None,
    };

    let max_suffix = (original.len() - start).min(modified.len() - start);
    let suffix = (0..max_suffix)
        .find(|&i| original[original.len() - 1 - i] != modified[modified.len() - 1 - i])
        .unwrap_or(max_suffix);

    Some(ChangeSpan {
        start,
        old_end: original.len() - suffix,
        new_end: modified.len() - suffix,
    })
}

/// Annotate `modified` against `original`. Identical inputs come back
/// unchanged with no markers.
pub fn inline_diff(original: &str, modified: &str) -> String {
    let old_lines: Vec<&str> = original.split('\n').collect();
    let new_lines: Vec<&str> = modified.split('\n').collect();

    let Some(span) = change_span(&old_lines, &new_lines) else {
        return modified.to_string();
    };

    let mut out: Vec<String> = Vec::with_capacity(old_lines.len() + new_lines.len());
    out.extend(old_lines[..span.start].iter().map(|l| l.to_string()));
    out.extend(
        old_lines[span.start..span.old_end]
            .iter()
            .map(|l| format!("{}{}", DEL_MARKER, l)),
    );
    out.extend(
        new_lines[span.start..span.new_end]
            .iter()
            .map(|l| format!("{}{}", ADD_MARKER, l)),
    );
    out.extend(old_lines[span.old_end..].iter().map(|l| l.to_string()));

    out.join("\n")
}

/// Split annotated text back into typed lines.
pub fn parse_inline_diff(annotated: &str) -> Vec<DiffLine> {
    annotated
        .split('\n')
        .map(|line| {
            if let Some(rest) = line.strip_prefix(DEL_MARKER) {
                DiffLine::Remove(rest.to_string())
            } else if let Some(rest) = line.strip_prefix(ADD_MARKER) {
                DiffLine::Add(rest.to_string())
            } else {
                DiffLine::Context(line.to_string())
            }
        })
        .collect()
}

/// Accept an annotated diff: drop removed lines, keep added ones.
pub fn resolve_inline_diff(annotated: &str) -> String {
    parse_inline_diff(annotated)
        .iter()
        .filter(|l| !matches!(l, DiffLine::Remove(_)))
        .map(DiffLine::content)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Count of (added, removed) lines in an annotated diff
pub fn diff_stats(annotated: &str) -> (usize, usize) {
    parse_inline_diff(annotated)
        .iter()
        .fold((0, 0), |(adds, removes), line| match line {
            DiffLine::Add(_) => (adds + 1, removes),
            DiffLine::Remove(_) => (adds, removes + 1),
            DiffLine::Context(_) => (adds, removes),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_input_has_no_markers() {
        let text = "echo a\necho b\n";
        assert_eq!(inline_diff(text, text), text);
        assert_eq!(inline_diff("", ""), "");
    }

    #[test]
    fn test_single_line_change() {
        let diff = inline_diff("a\nb\nc", "a\nB\nc");
        assert_eq!(diff, "a\n~DEL~b\n~ADD~B\nc");
        assert_eq!(diff_stats(&diff), (1, 1));
    }

    #[test]
    fn test_appended_lines() {
        let diff = inline_diff("echo 'a'", "echo 'a'\necho 'b'\n");
        assert_eq!(diff, "echo 'a'\n~ADD~echo 'b'\n~ADD~");
    }

    #[test]
    fn test_removed_tail() {
        let diff = inline_diff("a\nb\nc", "a");
        assert_eq!(diff, "a\n~DEL~b\n~DEL~c");
    }

    #[test]
    fn test_insert_in_middle_does_not_overlap() {
        // Repeated lines tempt the back scan to run past the front mismatch.
        let diff = inline_diff("x\nx", "x\nx\nx");
        assert_eq!(diff, "x\nx\n~ADD~x");
        assert_eq!(resolve_inline_diff(&diff), "x\nx\nx");
    }

    #[test]
    fn test_new_file() {
        let diff = inline_diff("", "echo hi\n");
        assert_eq!(diff, "~ADD~echo hi\n");
        assert_eq!(resolve_inline_diff(&diff), "echo hi\n");
    }

    #[test]
    fn test_change_span_bounds() {
        let old = ["a", "b", "c", "d"];
        let new = ["a", "X", "Y", "d"];
        assert_eq!(
            change_span(&old, &new),
            Some(ChangeSpan {
                start: 1,
                old_end: 3,
                new_end: 3
            })
        );
        assert_eq!(change_span(&old, &old), None);
    }

    #[test]
    fn test_resolve_recovers_modified_content() {
        let original = "#!/bin/bash\nset -e\nold()\n{\n  echo 1\n}\nmain\n";
        let modified = "#!/bin/bash\nset -eu\nnew() {\n  echo 2\n}\nmain\n";
        let diff = inline_diff(original, modified);
        assert!(diff.contains("~DEL~set -e\n"));
        assert!(diff.contains("~ADD~set -eu\n"));
        assert_eq!(resolve_inline_diff(&diff), modified);
    }

    #[test]
    fn test_parse_inline_diff_types_lines() {
        let lines = parse_inline_diff("keep\n~DEL~gone\n~ADD~new");
        assert_eq!(
            lines,
            vec![
                DiffLine::Context("keep".into()),
                DiffLine::Remove("gone".into()),
                DiffLine::Add("new".into()),
            ]
        );
        assert_eq!(lines[2].content(), "new");
    }
}
