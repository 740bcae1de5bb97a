use super::{ModelClient, ModelReply};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

type Responder = dyn Fn(&str) -> ModelReply + Send + Sync;

/// Deterministic stand-in for a real model client. Replies with a fixed
/// string, or routes each prompt through a scripted responder; optional
/// jitter scrambles completion order under concurrency.
pub struct FakeClient {
    fixed_reply: Option<String>,
    truncate: bool,
    jitter_ms: u64,
    responder: Option<Arc<Responder>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            fixed_reply: None,
            truncate: false,
            jitter_ms: 0,
            responder: None,
        }
    }

    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.fixed_reply = Some(text.into());
        self
    }

    pub fn with_truncation(mut self) -> Self {
        self.truncate = true;
        self
    }

    pub fn with_jitter(mut self, max_ms: u64) -> Self {
        self.jitter_ms = max_ms;
        self
    }

    pub fn with_responder(mut self, f: impl Fn(&str) -> ModelReply + Send + Sync + 'static) -> Self {
        self.responder = Some(Arc::new(f));
        self
    }
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for FakeClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<ModelReply> {
        if self.jitter_ms > 0 {
            tokio::time::sleep(Duration::from_millis(rand::random::<u64>() % self.jitter_ms)).await;
        }
        if let Some(f) = &self.responder {
            return Ok(f(prompt));
        }
        let text = self
            .fixed_reply
            .clone()
            .unwrap_or_else(|| "FINAL_ANSWER: 0".to_string());
        Ok(ModelReply {
            text,
            truncated: self.truncate,
            latency_ms: Some(0),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
