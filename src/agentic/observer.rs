//! Pipeline event side channel
//!
//! The fixer reports what it is doing through a [`FixObserver`]. Nothing in
//! the pipeline reads events back; swapping the observer never changes a
//! result.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Debug,
    Info,
    Error,
}

/// Where in the pipeline an event was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intent,
    Request,
    Availability,
    Generate,
    Extract,
    Select,
    Prevalidate,
    Apply,
    Summary,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intent => "intent",
            Stage::Request => "request",
            Stage::Availability => "availability",
            Stage::Generate => "generate",
            Stage::Extract => "extract",
            Stage::Select => "select",
            Stage::Prevalidate => "prevalidate",
            Stage::Apply => "apply",
            Stage::Summary => "summary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixEvent {
    pub stage: Stage,
    pub level: EventLevel,
    pub message: String,
}

pub trait FixObserver: Send + Sync {
    fn on_event(&self, event: &FixEvent);
}

/// Forwards events to `tracing`, tagged with their stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FixObserver for TracingObserver {
    fn on_event(&self, event: &FixEvent) {
        let stage = event.stage.as_str();
        match event.level {
            EventLevel::Debug => tracing::debug!(stage, "{}", event.message),
            EventLevel::Info => tracing::info!(stage, "{}", event.message),
            EventLevel::Error => tracing::error!(stage, "{}", event.message),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl FixObserver for NullObserver {
    fn on_event(&self, _event: &FixEvent) {}
}
