//! Recorded-response gateway
//!
//! Plays back a model answer captured earlier (or typed by hand) as if it
//! were streaming from a provider. Used by the CLI and in tests.

use crate::agentic::ModelGateway;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tokio::sync::mpsc;

/// Bytes per streamed chunk, rounded down to a char boundary
const CHUNK_SIZE: usize = 64;

pub struct ReplayGateway {
    response: String,
    model: String,
}

impl ReplayGateway {
    pub fn new(response: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            model: model.into(),
        }
    }

    /// Load a recorded response. `-` reads stdin.
    pub fn from_source(source: &Path, model: impl Into<String>) -> Result<Self> {
        let response = if source == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read response from stdin")?;
            buf
        } else {
            std::fs::read_to_string(source)
                .with_context(|| format!("Failed to read response file {}", source.display()))?
        };
        Ok(Self::new(response, model))
    }
}

/// Split `text` into pieces of at most `size` bytes without cutting a char.
fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // A single char wider than `size`
            end = rest.chars().next().map(char::len_utf8).unwrap_or(rest.len());
        }
        chunks.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    chunks
}

#[async_trait::async_trait]
impl ModelGateway for ReplayGateway {
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    async fn generate(
        &self,
        _prompt: &str,
        model: &str,
        _context: &[i64],
    ) -> Result<mpsc::Receiver<String>> {
        if model != self.model {
            anyhow::bail!("model '{}' not found", model);
        }
        let chunks = chunk_text(&self.response, CHUNK_SIZE);
        let (tx, rx) = mpsc::channel(chunks.len().max(1));
        for chunk in chunks {
            // Capacity covers every chunk, so this never waits.
            if tx.try_send(chunk).is_err() {
                break;
            }
        }
        Ok(rx)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec![self.model.clone()])
    }
}
