/// Mock generation backend for tests and offline runs.
///
/// Returns a canned reply (or a canned failure) and records what it was asked.
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Generation, GenerationBackend, GenerationError, TokenUsage};

/// One recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub system: String,
    pub user: String,
}

/// A backend that answers every request with the same result.
pub struct MockBackend {
    model_id: String,
    reply: Result<Generation, GenerationError>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    /// Always reply with `text` and the given usage counters.
    #[must_use]
    pub fn replying(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            model_id: "mock".to_string(),
            reply: Ok(Generation {
                text: text.into(),
                usage,
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: GenerationError) -> Self {
        Self {
            model_id: "mock".to_string(),
            reply: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::replying(
            "(mock) No model was called; this is a canned reply.",
            TokenUsage::default(),
        )
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<Generation, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                system: system.to_string(),
                user: user.to_string(),
            });
        }
        self.reply.clone()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
