/// Text-generation backend trait and shared types.
///
/// The pipeline sends one system instruction and one user instruction and
/// gets back text plus token counters. Transport details live in the
/// implementations.
pub mod mock;
pub mod openai;
pub mod retry;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while calling a generation backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("backend returned no text")]
    EmptyResponse,
}

impl GenerationError {
    /// Whether retrying the same request could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) | Self::EmptyResponse => false,
        }
    }
}

/// Token counters reported by the backend; either may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl TokenUsage {
    #[must_use]
    pub fn new(input_tokens: Option<u32>, output_tokens: Option<u32>) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Sum of both counters, missing ones counted as `0`.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.input_tokens.unwrap_or(0)) + u64::from(self.output_tokens.unwrap_or(0))
    }
}

/// A successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

/// Trait for text-generation backends.
///
/// Implementations must be `Send + Sync` so the pipeline can hold them
/// behind `Arc<dyn GenerationBackend>`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a reply to `user` under the `system` instruction.
    async fn generate(&self, system: &str, user: &str) -> Result<Generation, GenerationError>;

    /// Identifier of the model used, for reporting.
    fn model_id(&self) -> &str;

    /// URL the backend sends requests to, if it talks to one.
    fn endpoint(&self) -> Option<String> {
        None
    }
}
