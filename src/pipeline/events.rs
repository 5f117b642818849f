/// Structured stage notifications emitted by the [`Pipeline`](super::Pipeline).
///
/// Presentation lives entirely in observers; the stages themselves never
/// print.
use std::fmt;

use tracing::{info, warn};

use crate::prompt::TextMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Encode,
    Assemble,
    Generate,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Encode => "encode",
            Self::Assemble => "assemble",
            Self::Generate => "generate",
            Self::Report => "report",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Started,
    Succeeded,
    /// Carries a human-readable diagnostic.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEvent {
    pub stage: Stage,
    pub status: StageStatus,
    /// Size of the stage's output, when it has one.
    pub metrics: Option<TextMetrics>,
}

impl StageEvent {
    pub fn started(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Started,
            metrics: None,
        }
    }

    pub fn succeeded(stage: Stage, metrics: Option<TextMetrics>) -> Self {
        Self {
            stage,
            status: StageStatus::Succeeded,
            metrics,
        }
    }

    pub fn failed(stage: Stage, diagnostic: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Failed(diagnostic.into()),
            metrics: None,
        }
    }
}

/// Receives every [`StageEvent`] in emission order.
pub trait StageObserver: Send + Sync {
    fn on_event(&self, event: &StageEvent);
}

/// Drops every event.
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_event(&self, _event: &StageEvent) {}
}

/// Forwards events to `tracing`.
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_event(&self, event: &StageEvent) {
        let stage = event.stage;
        match (&event.status, event.metrics) {
            (StageStatus::Started, _) => info!("[{stage}] started"),
            (StageStatus::Succeeded, Some(m)) => info!(
                "[{stage}] done: {} chars (~{} tokens)",
                m.chars, m.approx_tokens
            ),
            (StageStatus::Succeeded, None) => info!("[{stage}] done"),
            (StageStatus::Failed(diagnostic), _) => warn!("[{stage}] failed: {diagnostic}"),
        }
    }
}
