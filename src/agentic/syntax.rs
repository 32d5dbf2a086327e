//! Lexical syntax checks for generated fixes
//!
//! These are balance checks, not parsers: quotes, brackets and block
//! keywords must pair up. They catch truncated or half-edited model output
//! before it reaches the editor.

use std::fmt;
use thiserror::Error;

/// Languages with dedicated checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Bash,
    PowerShell,
    Markdown,
}

impl Dialect {
    /// Resolve a file type name; `None` for types we don't check.
    ///
    /// Narrower than fence-tag matching: `sh` and `ps` are tags, not file
    /// types.
    pub fn from_file_type(file_type: &str) -> Option<Self> {
        match file_type.trim().to_lowercase().as_str() {
            "bash" | "shell" => Some(Dialect::Bash),
            "powershell" | "ps1" => Some(Dialect::PowerShell),
            "markdown" | "md" => Some(Dialect::Markdown),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Bash => "bash",
            Dialect::PowerShell => "powershell",
            Dialect::Markdown => "markdown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Defect {
    #[error("unmatched single quote")]
    UnmatchedSingleQuote,
    #[error("unmatched double quote")]
    UnmatchedDoubleQuote,
    #[error("unmatched closing bracket: {0}")]
    UnmatchedClosing(char),
    #[error("mismatched brackets: expected closing for {open}, got {close}")]
    MismatchedBrackets { open: char, close: char },
    #[error("unmatched opening bracket: {0}")]
    UnmatchedOpening(char),
    #[error("unmatched {open}/{close} statements ({open}: {opens}, {close}: {closes})")]
    UnbalancedKeywords {
        open: &'static str,
        close: &'static str,
        opens: usize,
        closes: usize,
    },
    #[error("try block without catch or finally")]
    TryWithoutHandler,
    #[error("unmatched code block markers (```)")]
    UnmatchedCodeFence,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("code cannot be empty")]
    Empty,
    #[error("{dialect} syntax error: {defect}")]
    Invalid { dialect: Dialect, defect: Defect },
}

impl SyntaxError {
    pub fn defect(&self) -> Option<&Defect> {
        match self {
            SyntaxError::Empty => None,
            SyntaxError::Invalid { defect, .. } => Some(defect),
        }
    }
}

/// Check `code` against the lexical rules for `file_type`.
///
/// Blank input is always rejected; file types without rules always pass.
pub fn validate_syntax(code: &str, file_type: &str) -> Result<(), SyntaxError> {
    if code.trim().is_empty() {
        return Err(SyntaxError::Empty);
    }

    let Some(dialect) = Dialect::from_file_type(file_type) else {
        return Ok(());
    };

    let checked = match dialect {
        Dialect::Bash => {
            check_quotes_and_brackets(code).and_then(|_| check_bash_keywords(code))
        }
        Dialect::PowerShell => {
            check_quotes_and_brackets(code).and_then(|_| check_powershell_handlers(code))
        }
        Dialect::Markdown => check_code_fences(code),
    };

    checked.map_err(|defect| SyntaxError::Invalid { dialect, defect })
}

fn opener_for(close: char) -> char {
    match close {
        ')' => '(',
        '}' => '{',
        _ => '[',
    }
}

/// Single pass over quotes and brackets. Quote state carries across lines;
/// brackets inside quotes are ignored. On lines holding a case terminator
/// (`;;`) a `)` with no `(` to close is a case pattern and is tolerated.
fn check_quotes_and_brackets(code: &str) -> Result<(), Defect> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for line in code.split('\n') {
        let case_line = line.contains(";;");

        for ch in line.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '\'' if !in_double => in_single = !in_single,
                '"' if !in_single => in_double = !in_double,
                _ if in_single || in_double => {}
                '(' | '{' | '[' => stack.push(ch),
                ')' if case_line => {
                    if stack.last() == Some(&'(') {
                        stack.pop();
                    }
                }
                ')' | '}' | ']' => match stack.pop() {
                    None => return Err(Defect::UnmatchedClosing(ch)),
                    Some(open) if open != opener_for(ch) => {
                        return Err(Defect::MismatchedBrackets {
                            open,
                            close: ch,
                        })
                    }
                    Some(_) => {}
                },
                _ => {}
            }
        }

        // A newline consumes a pending escape (line continuation).
        escaped = false;
    }

    if in_single {
        return Err(Defect::UnmatchedSingleQuote);
    }
    if in_double {
        return Err(Defect::UnmatchedDoubleQuote);
    }
    if let Some(open) = stack.last() {
        return Err(Defect::UnmatchedOpening(*open));
    }
    Ok(())
}

const BASH_PAIRS: [(&str, &str); 3] = [("if", "fi"), ("do", "done"), ("case", "esac")];

fn check_bash_keywords(code: &str) -> Result<(), Defect> {
    let mut counts = [(0usize, 0usize); 3];

    for line in code.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            continue;
        }
        for word in trimmed.split_whitespace() {
            for (i, (open, close)) in BASH_PAIRS.iter().enumerate() {
                if word == *open {
                    counts[i].0 += 1;
                } else if word == *close {
                    counts[i].1 += 1;
                }
            }
        }
    }

    for ((open, close), (opens, closes)) in BASH_PAIRS.into_iter().zip(counts) {
        if opens != closes {
            return Err(Defect::UnbalancedKeywords {
                open,
                close,
                opens,
                closes,
            });
        }
    }
    Ok(())
}

fn check_powershell_handlers(code: &str) -> Result<(), Defect> {
    let lower = code.to_lowercase();
    if lower.contains("try") && !lower.contains("catch") && !lower.contains("finally") {
        return Err(Defect::TryWithoutHandler);
    }
    Ok(())
}

fn check_code_fences(code: &str) -> Result<(), Defect> {
    if code.matches("```").count() % 2 != 0 {
        return Err(Defect::UnmatchedCodeFence);
    }
    Ok(())
}
