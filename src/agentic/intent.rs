//! Fix-request detection
//!
//! Decides whether a chat message asks for a code change or is just
//! conversation. Explicit commands win; otherwise a small keyword
//! vocabulary is scored.

use super::types::FixDetectionResult;

pub const FIX_COMMAND: &str = "/fix";
pub const ASK_COMMAND: &str = "/ask";

const FIX_KEYWORDS: &[&str] = &["fix", "change", "update", "modify", "correct"];

/// Polite or necessity phrasing that raises confidence on a single keyword
const ACTION_PHRASES: &[&str] = &[
    "please",
    "can you",
    "could you",
    "need to",
    "want to",
    "should",
    "must",
];

/// Classify a message as a fix request or conversation.
pub fn detect_fix_request(message: &str) -> FixDetectionResult {
    let lower = message.trim().to_lowercase();

    if lower.starts_with(FIX_COMMAND) {
        return FixDetectionResult {
            is_fix_request: true,
            confidence: 1.0,
            keywords: vec![FIX_COMMAND.to_string()],
        };
    }

    if lower.starts_with(ASK_COMMAND) {
        return FixDetectionResult::conversational();
    }

    // Substring match on purpose: "fixes", "changed" and "updating" count.
    let keywords: Vec<String> = FIX_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .map(|k| k.to_string())
        .collect();

    if keywords.is_empty() {
        return FixDetectionResult::conversational();
    }

    let confidence = if keywords.len() >= 2 {
        0.9
    } else if ACTION_PHRASES.iter().any(|p| lower.contains(p)) {
        0.8
    } else {
        0.7
    };

    FixDetectionResult {
        is_fix_request: true,
        confidence,
        keywords,
    }
}
