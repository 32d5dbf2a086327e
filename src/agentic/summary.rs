//! Human-readable change reports
//!
//! The summary shown next to a fix: what happened, how many lines moved,
//! where, and which function the change sits in.

use super::diff::change_span;
use regex::Regex;
use std::sync::OnceLock;

/// How far back from the first changed line to look for a declaration
const FUNCTION_SEARCH_LINES: usize = 20;

struct FunctionPatterns {
    keyword: Regex,
    posix: Regex,
    powershell: Regex,
}

fn function_patterns() -> &'static FunctionPatterns {
    static PATTERNS: OnceLock<FunctionPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).unwrap_or_else(|_| Regex::new("$^").unwrap());
        FunctionPatterns {
            // bash: function deploy { / function deploy() {
            keyword: compile(r"^function\s+([A-Za-z_][A-Za-z0-9_.:-]*)"),
            // POSIX sh: deploy() {
            posix: compile(r"^([A-Za-z_][A-Za-z0-9_.:-]*)\s*\(\s*\)"),
            // PowerShell: Function Get-Thing / filter Select-Odd
            powershell: compile(r"(?i)^(?:function|filter)\s+([A-Za-z_][A-Za-z0-9_.:-]*)"),
        }
    })
}

/// Build the report for a computed (or previewed) change.
pub fn change_summary(
    original: &str,
    modified: &str,
    file_path: &str,
    block_count: usize,
    preview_mode: bool,
) -> String {
    let mut summary = String::new();

    if preview_mode {
        summary.push_str("🔍 PREVIEW MODE - Changes NOT applied\n\n");
        summary.push_str(&format!("Proposed changes for {}\n\n", file_path));
    } else {
        summary.push_str(&format!("✓ Code fix applied to {}\n\n", file_path));
    }

    let old_lines: Vec<&str> = if original.trim().is_empty() {
        Vec::new()
    } else {
        original.trim().split('\n').collect()
    };
    let new_lines: Vec<&str> = modified.trim().split('\n').collect();

    summary.push_str("Changes:\n");

    if block_count > 1 {
        let verb = if preview_mode { "Would apply" } else { "Applied" };
        summary.push_str(&format!("- {} {} code blocks\n", verb, block_count));
    }

    summary.push_str(&line_delta(old_lines.len(), new_lines.len(), preview_mode));

    if let Some(location) = describe_location(&old_lines, &new_lines) {
        summary.push_str(&location);
    }

    summary.push('\n');
    if preview_mode {
        summary.push_str(
            "ℹ️  This is a preview. To apply these changes, send the request without /preview",
        );
    } else {
        summary.push_str("⚠️  Remember to save the file and test the changes!");
    }

    summary
}

fn line_delta(old: usize, new: usize, preview_mode: bool) -> String {
    if old == 0 {
        let verb = if preview_mode { "Would add" } else { "Added" };
        return format!("- {} {} lines (new file)\n", verb, new);
    }

    let verb = if preview_mode {
        "Would modify file"
    } else {
        "Modified file"
    };
    if new > old {
        format!("- {}: {} → {} lines (+{})\n", verb, old, new, new - old)
    } else if new < old {
        format!("- {}: {} → {} lines (-{})\n", verb, old, new, old - new)
    } else {
        format!("- {}: {} lines (same length, content changed)\n", verb, new)
    }
}

/// Location line plus an optional enclosing-function line.
fn describe_location(old_lines: &[&str], new_lines: &[&str]) -> Option<String> {
    if old_lines.is_empty() || new_lines.is_empty() {
        return None;
    }

    let span = change_span(old_lines, new_lines)?;
    let first = span.start;
    let last = span.new_end.saturating_sub(1).max(first);

    let mut location = if first == last {
        format!("- Location: Line {}\n", first + 1)
    } else {
        format!("- Location: Lines {}-{}\n", first + 1, last + 1)
    };

    if let Some(name) = nearby_function(new_lines, first) {
        location.push_str(&format!("- Context: Near function '{}'\n", name));
    }

    Some(location)
}

/// Name of the closest function declared at or above `line`.
pub fn nearby_function(lines: &[&str], line: usize) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let from = line.min(lines.len() - 1);
    let to = from.saturating_sub(FUNCTION_SEARCH_LINES);
    let patterns = function_patterns();

    for i in (to..=from).rev() {
        let trimmed = lines[i].trim();

        if let Some(caps) = patterns.keyword.captures(trimmed) {
            return Some(caps[1].to_string());
        }

        if let Some(caps) = patterns.posix.captures(trimmed) {
            let opens_here = trimmed.contains('{');
            let opens_next = lines.get(i + 1).is_some_and(|next| next.contains('{'));
            if opens_here || opens_next {
                return Some(caps[1].to_string());
            }
        }

        if let Some(caps) = patterns.powershell.captures(trimmed) {
            return Some(caps[1].to_string());
        }
    }

    None
}
