//! Model gateway boundary
//!
//! The fixer never talks to a model provider directly. It sees a
//! [`ModelGateway`] that streams text chunks over a channel and closes the
//! channel when generation is done.

use anyhow::Result;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[async_trait::async_trait]
pub trait ModelGateway: Send + Sync {
    /// Whether the provider can be used right now.
    async fn is_available(&self) -> Result<bool>;

    /// Start generating. `context` carries provider conversation tokens and
    /// may be empty.
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        context: &[i64],
    ) -> Result<mpsc::Receiver<String>>;

    async fn list_models(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("AI response timed out after {}s", .0.as_secs())]
pub struct StreamTimeout(pub Duration);

/// Concatenate every chunk until the sender closes the channel.
///
/// Fails when the whole stream takes longer than `deadline`; whatever was
/// received so far is dropped.
pub async fn drain_stream(
    mut chunks: mpsc::Receiver<String>,
    deadline: Duration,
) -> Result<String, StreamTimeout> {
    let collect = async {
        let mut response = String::new();
        while let Some(chunk) = chunks.recv().await {
            response.push_str(&chunk);
        }
        response
    };

    tokio::time::timeout(deadline, collect)
        .await
        .map_err(|_| StreamTimeout(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_concatenates_in_order() {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for part in ["```ba", "sh\necho ", "hi\n```"] {
                tx.send(part.to_string()).await.unwrap();
            }
        });
        let text = drain_stream(rx, Duration::from_secs(5)).await.unwrap();
        assert_eq!(text, "```bash\necho hi\n```");
    }

    #[tokio::test]
    async fn test_drain_closed_channel_is_empty() {
        let (tx, rx) = mpsc::channel::<String>(1);
        drop(tx);
        assert_eq!(drain_stream(rx, Duration::from_secs(1)).await.unwrap(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_times_out_on_stalled_stream() {
        let (tx, rx) = mpsc::channel::<String>(1);
        let err = drain_stream(rx, Duration::from_secs(3)).await.unwrap_err();
        assert_eq!(err.to_string(), "AI response timed out after 3s");
        drop(tx);
    }
}
