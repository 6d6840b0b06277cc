pub mod classify;
pub mod openai;

use log::{info, warn};
use std::sync::Arc;

use crate::core::types::{CompletionModel, StageOutcome};
use crate::edgar::parsing::text::char_prefix;
use crate::edgar::section::{FilingSections, SectionItem};

pub use classify::{classify_line, BusinessProfile, ExecutiveNotes, NarrativeClass, RiskReview};
pub use openai::OpenAiClient;

pub const SYSTEM_PROMPT: &str = "You are a professional financial analyst with expertise in SEC filing analysis. Provide detailed, quantitative analysis based on the provided SEC filing data.";
pub const MAX_TOKENS: u32 = 2000;
pub const TEMPERATURE: f32 = 0.3;

const SOURCE_UNAVAILABLE: &str = "source section unavailable";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn analyst(prompt: String) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeTask {
    Business,
    Risk,
    Executive,
}

impl NarrativeTask {
    pub fn stage_name(&self) -> &'static str {
        match self {
            NarrativeTask::Business => "businessSummary",
            NarrativeTask::Risk => "riskSummary",
            NarrativeTask::Executive => "executiveSummary",
        }
    }

    /// Sections whose text the prompt is built from. The prompt is only sent
    /// if at least one of them has text.
    fn sources(&self) -> &'static [SectionItem] {
        match self {
            NarrativeTask::Business => &[SectionItem::Business],
            NarrativeTask::Risk => &[SectionItem::RiskFactors],
            NarrativeTask::Executive => {
                &[SectionItem::Business, SectionItem::ManagementDiscussion]
            }
        }
    }

    pub fn prompt(&self, sections: &FilingSections) -> String {
        let business = sections.text(SectionItem::Business);
        match self {
            NarrativeTask::Business => format!(
                "Analyze this business section from a SEC filing and provide:\n\
                 1. A detailed business description (2-3 sentences)\n\
                 2. Main revenue streams (list 3-5 specific revenue sources)\n\
                 3. Industry sector classification\n\n\
                 SEC Business Section:\n{}",
                char_prefix(business, 3000)
            ),
            NarrativeTask::Risk => format!(
                "Analyze these risk factors from a SEC filing and provide:\n\
                 1. Top 5 key risks (be specific and quantitative where possible)\n\
                 2. Top 5 company strengths (based on business model and competitive position)\n\
                 3. Top 3 weaknesses or concerns\n\
                 4. Final investment verdict (1-2 sentences)\n\n\
                 Risk Factors:\n{}\n\n\
                 Business Context:\n{}",
                char_prefix(sections.text(SectionItem::RiskFactors), 3000),
                char_prefix(business, 1000)
            ),
            NarrativeTask::Executive => {
                let combined = format!(
                    "{}{}",
                    business,
                    sections.text(SectionItem::ManagementDiscussion)
                );
                format!(
                    "Extract executive management information from this SEC filing text:\n\
                     1. CEO name and role\n\
                     2. CEO start date (if mentioned)\n\
                     3. Whether CEO is a founder\n\
                     4. Brief performance notes\n\n\
                     Text:\n{}",
                    char_prefix(&combined, 2000)
                )
            }
        }
    }
}

/// Raw completions of the three narrative prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct Narratives {
    pub business: StageOutcome<String>,
    pub risk: StageOutcome<String>,
    pub executive: StageOutcome<String>,
}

pub struct NarrativeSummarizer {
    model: Arc<dyn CompletionModel>,
}

impl NarrativeSummarizer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub async fn summarize(&self, task: NarrativeTask, sections: &FilingSections) -> StageOutcome<String> {
        let has_source = task
            .sources()
            .iter()
            .any(|item| !sections.text(*item).trim().is_empty());
        if !has_source {
            warn!("Skipping {}: {}", task.stage_name(), SOURCE_UNAVAILABLE);
            return StageOutcome::degraded(SOURCE_UNAVAILABLE);
        }

        let request = CompletionRequest::analyst(task.prompt(sections));
        match self.model.complete(&request).await {
            Ok(text) => StageOutcome::Ready(text),
            Err(e) => {
                warn!("{} analysis failed: {}", task.stage_name(), e);
                StageOutcome::degraded(e.to_string())
            }
        }
    }

    /// Runs the three prompts concurrently; each call is independent.
    pub async fn summarize_all(&self, sections: &FilingSections) -> Narratives {
        let (business, risk, executive) = tokio::join!(
            self.summarize(NarrativeTask::Business, sections),
            self.summarize(NarrativeTask::Risk, sections),
            self.summarize(NarrativeTask::Executive, sections),
        );
        info!(
            "Narratives ready (business: {}, risk: {}, executive: {})",
            !business.is_degraded(),
            !risk.is_degraded(),
            !executive.is_degraded()
        );
        Narratives {
            business,
            risk,
            executive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::section::ExtractedSection;

    fn sections(business: &str, risk: StageOutcome<String>) -> FilingSections {
        FilingSections::new(vec![
            ExtractedSection {
                item: SectionItem::Business,
                raw_text: StageOutcome::Ready(business.to_string()),
            },
            ExtractedSection {
                item: SectionItem::RiskFactors,
                raw_text: risk,
            },
        ])
    }

    #[test]
    fn prompts_are_bounded() {
        let long = "§".repeat(5000);
        let s = sections(&long, StageOutcome::Ready(long.clone()));
        let business = NarrativeTask::Business.prompt(&s);
        assert_eq!(business.matches('§').count(), 3000);
        let risk = NarrativeTask::Risk.prompt(&s);
        assert_eq!(risk.matches('§').count(), 4000);
        let exec = NarrativeTask::Executive.prompt(&s);
        assert_eq!(exec.matches('§').count(), 2000);
    }

    #[test]
    fn analyst_request_uses_fixed_sampling() {
        let request = CompletionRequest::analyst("p".to_string());
        assert_eq!(request.max_tokens, 2000);
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
        assert!(request.system.contains("financial analyst"));
    }

    #[test]
    fn sources_check_reads_section_text() {
        let s = sections("We sell anvils.", StageOutcome::degraded("HTTP 500"));
        assert!(NarrativeTask::Risk
            .sources()
            .iter()
            .all(|item| s.text(*item).is_empty()));
        assert!(!s.text(SectionItem::Business).is_empty());
    }
}
