//! Agentic code fixing
//!
//! Turns a chat message plus the open file into a validated, diff-annotated
//! change. The model itself sits behind [`ModelGateway`].

pub mod apply;
pub mod diff;
pub mod fixer;
pub mod gateway;
pub mod intent;
pub mod observer;
pub mod parse;
pub mod prompt;
pub mod summary;
pub mod syntax;
pub mod types;

pub use apply::{
    apply_blocks, apply_fix, order_fix_blocks, prevalidate_blocks, ApplyError,
    PreValidationError, RolledBack, SequenceError,
};
pub use diff::{diff_stats, inline_diff, parse_inline_diff, resolve_inline_diff, DiffLine};
pub use fixer::{AgenticFixer, DEFAULT_STREAM_TIMEOUT};
pub use gateway::{drain_stream, ModelGateway, StreamTimeout};
pub use intent::detect_fix_request;
pub use observer::{EventLevel, FixEvent, FixObserver, NullObserver, Stage, TracingObserver};
pub use parse::{extract_code_blocks, identify_fix_blocks};
pub use prompt::build_fix_prompt;
pub use summary::change_summary;
pub use syntax::{validate_syntax, SyntaxError};
pub use types::{CodeBlock, FileType, FixDetectionResult, FixRequest, FixResult};
