//! Request/result types for a single fix round trip
//!
//! Everything here is created and dropped within one call to
//! [`AgenticFixer::process_message`](super::AgenticFixer::process_message).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// File types the fixer accepts in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Bash,
    Shell,
    PowerShell,
    Markdown,
}

impl FileType {
    pub const ALL: [FileType; 4] = [
        FileType::Bash,
        FileType::Shell,
        FileType::PowerShell,
        FileType::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Bash => "bash",
            FileType::Shell => "shell",
            FileType::PowerShell => "powershell",
            FileType::Markdown => "markdown",
        }
    }

    /// Guess the file type from a path's extension. Unknown extensions are
    /// treated as generic shell scripts.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("sh") | Some("bash") => FileType::Bash,
            Some("ps1") => FileType::PowerShell,
            Some("md") => FileType::Markdown,
            _ => FileType::Shell,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "FileType must be one of: bash, shell, powershell, markdown; got: {}",
                    s
                )
            })
    }
}

/// A request to change the currently open file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRequest {
    pub user_message: String,
    /// May be empty when the file is new
    pub file_content: String,
    pub file_path: String,
    pub file_type: String,
    pub preview_mode: bool,
}

impl FixRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.user_message.trim().is_empty() {
            return Err("UserMessage must not be empty".to_string());
        }
        if self.file_path.trim().is_empty() {
            return Err("FilePath must not be empty".to_string());
        }
        self.file_type.parse::<FileType>()?;
        Ok(())
    }
}

/// Outcome of processing one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixResult {
    pub success: bool,
    /// New content annotated with inline diff markers
    pub modified_content: String,
    pub changes_summary: String,
    pub error_message: String,
    pub is_conversational: bool,
    pub preview_mode: bool,
}

impl FixResult {
    pub fn applied(modified_content: String, changes_summary: String, preview_mode: bool) -> Self {
        Self {
            success: true,
            modified_content,
            changes_summary,
            preview_mode,
            ..Self::default()
        }
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            ..Self::default()
        }
    }

    /// The message was not a fix request; the caller should treat it as chat.
    pub fn conversational() -> Self {
        Self {
            is_conversational: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.success {
            if self.modified_content.trim().is_empty() {
                return Err("ModifiedContent must not be empty when Success is true".to_string());
            }
            if self.changes_summary.trim().is_empty() {
                return Err("ChangesSummary must not be empty when Success is true".to_string());
            }
            if self.is_conversational {
                return Err("IsConversational should be false when Success is true".to_string());
            }
        } else {
            if !self.is_conversational && self.error_message.trim().is_empty() {
                return Err(
                    "ErrorMessage must not be empty when Success is false and not conversational"
                        .to_string(),
                );
            }
            if !self.modified_content.is_empty() {
                return Err("ModifiedContent should be empty when Success is false".to_string());
            }
        }
        Ok(())
    }
}

/// A fenced code region pulled out of a model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    /// Heuristic: the block replaces the whole file rather than a fragment
    pub is_whole: bool,
}

impl CodeBlock {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            is_whole: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("Code must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixDetectionResult {
    pub is_fix_request: bool,
    /// In `[0.0, 1.0]`
    pub confidence: f64,
    pub keywords: Vec<String>,
}

impl FixDetectionResult {
    pub(crate) fn conversational() -> Self {
        Self {
            is_fix_request: false,
            confidence: 0.0,
            keywords: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0; got: {}",
                self.confidence
            ));
        }
        if self.is_fix_request {
            if self.confidence < 0.7 {
                return Err(format!(
                    "Confidence should be >= 0.7 when IsFixRequest is true; got: {}",
                    self.confidence
                ));
            }
            if self.keywords.is_empty() {
                return Err(
                    "Keywords should contain at least one keyword when IsFixRequest is true"
                        .to_string(),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> FixRequest {
        FixRequest {
            user_message: "fix the loop".to_string(),
            file_content: String::new(),
            file_path: "deploy.sh".to_string(),
            file_type: "bash".to_string(),
            preview_mode: false,
        }
    }

    #[test]
    fn test_request_accepts_empty_content() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_request_rejects_blank_message_and_path() {
        let mut r = request();
        r.user_message = "   ".to_string();
        assert!(r.validate().unwrap_err().contains("UserMessage"));

        let mut r = request();
        r.file_path = String::new();
        assert!(r.validate().unwrap_err().contains("FilePath"));
    }

    #[test]
    fn test_request_rejects_unsupported_file_type() {
        let mut r = request();
        r.file_type = "python".to_string();
        let err = r.validate().unwrap_err();
        assert!(err.contains("got: python"));
    }

    #[test]
    fn test_file_type_from_path() {
        assert_eq!(FileType::from_path(Path::new("a/run.sh")), FileType::Bash);
        assert_eq!(FileType::from_path(Path::new("x.BASH")), FileType::Bash);
        assert_eq!(FileType::from_path(Path::new("setup.ps1")), FileType::PowerShell);
        assert_eq!(FileType::from_path(Path::new("README.md")), FileType::Markdown);
        assert_eq!(FileType::from_path(Path::new("Makefile")), FileType::Shell);
    }

    #[test]
    fn test_result_shapes_hold_invariants() {
        assert!(FixResult::applied("echo\n".into(), "summary".into(), false)
            .validate()
            .is_ok());
        assert!(FixResult::failed("boom").validate().is_ok());
        assert!(FixResult::conversational().validate().is_ok());
        assert!(FixResult::failed("").validate().is_err());

        let mut bad = FixResult::failed("boom");
        bad.modified_content = "leftover".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_detection_invariants() {
        let low = FixDetectionResult {
            is_fix_request: true,
            confidence: 0.5,
            keywords: vec!["fix".into()],
        };
        assert!(low.validate().is_err());

        let no_keywords = FixDetectionResult {
            is_fix_request: true,
            confidence: 0.9,
            keywords: Vec::new(),
        };
        assert!(no_keywords.validate().is_err());
        assert!(FixDetectionResult::conversational().validate().is_ok());
    }

    #[test]
    fn test_code_block_rejects_blank_body() {
        assert!(CodeBlock::new("bash", " \n ").validate().is_err());
        assert!(CodeBlock::new("", "echo hi").validate().is_ok());
    }
}
