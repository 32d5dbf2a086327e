//! The fix pipeline
//!
//! One message in, one [`FixResult`] out. Every failure along the way is
//! folded into the result so callers only ever branch on its flags.

use super::apply::{apply_blocks, order_fix_blocks, prevalidate_blocks};
use super::diff::inline_diff;
use super::gateway::{drain_stream, ModelGateway};
use super::intent::detect_fix_request;
use super::observer::{EventLevel, FixEvent, FixObserver, Stage, TracingObserver};
use super::parse::{extract_code_blocks, identify_fix_blocks};
use super::prompt::build_fix_prompt;
use super::summary::change_summary;
use super::types::{FixDetectionResult, FixRequest, FixResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

pub const PREVIEW_COMMAND: &str = "/preview";

pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(120);

const MSG_PREVIEW_WITHOUT_REQUEST: &str = "Please provide a fix request after /preview command";
const MSG_NO_FILE: &str = "Please open a file before requesting code fixes";
const MSG_UNAVAILABLE: &str = "AI service unavailable. Please check your AI provider connection";
const MSG_EMPTY_RESPONSE: &str = "AI generated an empty response";
const MSG_NO_CODE_BLOCKS: &str = "AI response did not contain any code blocks";
const MSG_NO_FIX_BLOCKS: &str = "Could not identify valid fix blocks in AI response. The AI may have provided explanations without code, or the code blocks don't match the file type. Please try rephrasing your request.";

pub struct AgenticFixer {
    gateway: Arc<dyn ModelGateway>,
    model: String,
    stream_timeout: Duration,
    observer: Arc<dyn FixObserver>,
}

impl AgenticFixer {
    pub fn new(gateway: Arc<dyn ModelGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FixObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn emit(&self, stage: Stage, level: EventLevel, message: impl Into<String>) {
        self.observer.on_event(&FixEvent {
            stage,
            level,
            message: message.into(),
        });
    }

    fn fail(&self, stage: Stage, message: impl Into<String>) -> FixResult {
        let message = message.into();
        self.emit(stage, EventLevel::Error, message.clone());
        FixResult::failed(message)
    }

    /// Classify a message, reporting the decision to the observer.
    pub fn is_fix_request(&self, message: &str) -> FixDetectionResult {
        let detection = detect_fix_request(message);
        if detection.is_fix_request {
            self.emit(
                Stage::Intent,
                EventLevel::Info,
                format!(
                    "fix request detected (confidence {:.1}, keywords {:?})",
                    detection.confidence, detection.keywords
                ),
            );
        } else {
            self.emit(Stage::Intent, EventLevel::Debug, "message is conversational");
        }
        detection
    }

    /// Route a chat message: strip `/preview`, classify, build the request
    /// and run the fix when it is one.
    pub async fn process_message(
        &self,
        message: &str,
        file_content: &str,
        file_path: &str,
        file_type: &str,
    ) -> FixResult {
        let span = tracing::info_span!("fix_request", id = %Uuid::new_v4(), file = file_path);
        self.process_message_inner(message, file_content, file_path, file_type)
            .instrument(span)
            .await
    }

    async fn process_message_inner(
        &self,
        message: &str,
        file_content: &str,
        file_path: &str,
        file_type: &str,
    ) -> FixResult {
        self.emit(
            Stage::Request,
            EventLevel::Debug,
            format!(
                "processing message for {} ({}, {} bytes)",
                file_path,
                file_type,
                file_content.len()
            ),
        );

        let (message, preview_mode) = match strip_preview(message) {
            Some(rest) if rest.is_empty() => {
                return self.fail(Stage::Request, MSG_PREVIEW_WITHOUT_REQUEST);
            }
            Some(rest) => {
                self.emit(Stage::Request, EventLevel::Info, "preview mode enabled");
                (rest, true)
            }
            None => (message, false),
        };

        if !self.is_fix_request(message).is_fix_request {
            return FixResult::conversational();
        }

        if file_path.trim().is_empty() {
            return self.fail(Stage::Request, MSG_NO_FILE);
        }

        let request = FixRequest {
            user_message: message.to_string(),
            file_content: file_content.to_string(),
            file_path: file_path.to_string(),
            file_type: file_type.to_string(),
            preview_mode,
        };

        if let Err(e) = request.validate() {
            return self.fail(Stage::Request, format!("Invalid fix request: {}", e));
        }

        self.generate_fix(&request).await
    }

    /// Run a validated request through the model and apply the result.
    pub async fn generate_fix(&self, request: &FixRequest) -> FixResult {
        match self.gateway.is_available().await {
            Ok(true) => {}
            Ok(false) => return self.fail(Stage::Availability, MSG_UNAVAILABLE),
            Err(e) => {
                self.emit(
                    Stage::Availability,
                    EventLevel::Debug,
                    format!("availability check failed: {}", e),
                );
                return self.fail(Stage::Availability, MSG_UNAVAILABLE);
            }
        }

        let prompt = build_fix_prompt(request);
        self.emit(
            Stage::Generate,
            EventLevel::Debug,
            format!("prompt is {} bytes, model {}", prompt.len(), self.model),
        );

        let chunks = match self.gateway.generate(&prompt, &self.model, &[]).await {
            Ok(rx) => rx,
            Err(e) => return self.fail(Stage::Generate, format!("Failed to generate fix: {}", e)),
        };

        let response = match drain_stream(chunks, self.stream_timeout).await {
            Ok(text) => text,
            Err(e) => return self.fail(Stage::Generate, e.to_string()),
        };

        if response.trim().is_empty() {
            return self.fail(Stage::Generate, MSG_EMPTY_RESPONSE);
        }
        self.emit(
            Stage::Generate,
            EventLevel::Debug,
            format!("received {} bytes", response.len()),
        );

        let blocks = extract_code_blocks(&response);
        if blocks.is_empty() {
            return self.fail(Stage::Extract, MSG_NO_CODE_BLOCKS);
        }
        self.emit(
            Stage::Extract,
            EventLevel::Debug,
            format!("extracted {} code blocks", blocks.len()),
        );

        let fix_blocks = identify_fix_blocks(&blocks, &request.file_type);
        if fix_blocks.is_empty() {
            return self.fail(Stage::Select, MSG_NO_FIX_BLOCKS);
        }

        if let Err(e) = prevalidate_blocks(&fix_blocks, &request.file_type) {
            return self.fail(
                Stage::Prevalidate,
                format!(
                    "Pre-validation failed: {}. Please review your request and try again.",
                    e
                ),
            );
        }

        let ordered = order_fix_blocks(fix_blocks);
        self.emit(
            Stage::Apply,
            EventLevel::Info,
            format!(
                "applying {} fix blocks (preview: {})",
                ordered.len(),
                request.preview_mode
            ),
        );

        let modified = match apply_blocks(&request.file_content, &ordered, &request.file_type) {
            Ok(content) => content,
            Err(e) => {
                return self.fail(
                    Stage::Apply,
                    format!(
                        "Failed to apply fix block {}: {}. The generated code may be incomplete or invalid.",
                        e.ordinal, e.reason
                    ),
                );
            }
        };

        let summary = change_summary(
            &request.file_content,
            &modified,
            &request.file_path,
            ordered.len(),
            request.preview_mode,
        );
        self.emit(Stage::Summary, EventLevel::Info, "fix ready");

        FixResult::applied(
            inline_diff(&request.file_content, &modified),
            summary,
            request.preview_mode,
        )
    }
}

/// Remaining message text when `message` starts with `/preview` (any case).
fn strip_preview(message: &str) -> Option<&str> {
    let trimmed = message.trim();
    let prefix = trimmed.get(..PREVIEW_COMMAND.len())?;
    if !prefix.eq_ignore_ascii_case(PREVIEW_COMMAND) {
        return None;
    }
    Some(trimmed[PREVIEW_COMMAND.len()..].trim())
}
