//! Boundary contract to the external model client. The core only needs
//! prompt-in, text-plus-artifact-metadata-out; transport, authentication
//! and retries live entirely behind this trait.

pub mod fake;

use async_trait::async_trait;

/// Raw completion plus the artifact metadata the caller observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
    /// Output was cut off (e.g. token limit) before completion finished.
    pub truncated: bool,
    pub latency_ms: Option<u64>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            truncated: false,
            latency_ms: None,
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<ModelReply>;
    fn provider_name(&self) -> &'static str;
}
