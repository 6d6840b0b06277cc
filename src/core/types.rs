use serde::{Deserialize, Serialize};

use super::error::PipelineResult;
use crate::edgar::filing::{FilingQuery, FilingReference};
use crate::edgar::section::SectionItem;
use crate::summarize::CompletionRequest;

/// Result of a stage that is allowed to fail softly.
///
/// `Ready` with an empty value is a legitimate empty result; `Degraded`
/// means the upstream call did not produce anything usable.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Ready(T),
    Degraded { reason: String },
}

impl<T> StageOutcome<T> {
    pub fn degraded(reason: impl Into<String>) -> Self {
        StageOutcome::Degraded {
            reason: reason.into(),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            StageOutcome::Ready(value) => Some(value),
            StageOutcome::Degraded { .. } => None,
        }
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            StageOutcome::Ready(_) => None,
            StageOutcome::Degraded { reason } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }
}

impl StageOutcome<String> {
    /// Text of the stage, empty when degraded.
    pub fn text(&self) -> &str {
        self.ready().map(String::as_str).unwrap_or("")
    }
}

/// A soft failure as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedStage {
    pub stage: String,
    pub reason: String,
}

/// Full-text search over filing metadata.
#[async_trait::async_trait]
pub trait FilingSearch: Send + Sync {
    async fn search(&self, query: &FilingQuery) -> PipelineResult<Vec<FilingReference>>;
}

/// Plain-text extraction of one item of a filing.
#[async_trait::async_trait]
pub trait SectionSource: Send + Sync {
    async fn extract(&self, document_url: &str, item: SectionItem) -> PipelineResult<String>;
}

/// Single-turn chat completion.
#[async_trait::async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> PipelineResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ready_is_not_degraded() {
        let empty: StageOutcome<String> = StageOutcome::Ready(String::new());
        assert!(!empty.is_degraded());
        assert_eq!(empty.text(), "");

        let failed: StageOutcome<String> = StageOutcome::degraded("HTTP 500");
        assert!(failed.is_degraded());
        assert_eq!(failed.text(), "");
        assert_eq!(failed.degraded_reason(), Some("HTTP 500"));
    }
}
