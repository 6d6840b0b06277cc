use futures::future::join_all;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use strum::{EnumIter, IntoEnumIterator};

use super::filing::{FilingReference, SecApiClient, SEC_API_SERVICE};
use super::parsing::text::process_section_text;
use crate::core::error::PipelineResult;
use crate::core::types::{SectionSource, StageOutcome};

/// Filing items the pipeline reads, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "camelCase")]
pub enum SectionItem {
    Business,
    RiskFactors,
    ManagementDiscussion,
    FinancialStatements,
}

impl SectionItem {
    /// Item number as used by the 10-K table of contents.
    pub fn item_code(&self) -> &'static str {
        match self {
            SectionItem::Business => "1",
            SectionItem::RiskFactors => "1A",
            SectionItem::ManagementDiscussion => "7",
            SectionItem::FinancialStatements => "8",
        }
    }
}

impl fmt::Display for SectionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionItem::Business => "business description",
            SectionItem::RiskFactors => "risk factors",
            SectionItem::ManagementDiscussion => "management discussion & analysis",
            SectionItem::FinancialStatements => "financial statements",
        };
        write!(f, "{} (item {})", name, self.item_code())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSection {
    pub item: SectionItem,
    pub raw_text: StageOutcome<String>,
}

/// All four sections of one filing, indexed by item.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingSections {
    sections: Vec<ExtractedSection>,
}

impl FilingSections {
    pub fn new(sections: Vec<ExtractedSection>) -> Self {
        Self { sections }
    }

    pub fn get(&self, item: SectionItem) -> Option<&StageOutcome<String>> {
        self.sections
            .iter()
            .find(|s| s.item == item)
            .map(|s| &s.raw_text)
    }

    /// Section text, empty when missing or degraded.
    pub fn text(&self, item: SectionItem) -> &str {
        self.get(item).map(|s| s.text()).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractedSection> {
        self.sections.iter()
    }
}

/// Fetches filing sections; a failed section degrades instead of failing
/// the request.
pub struct SectionExtractor {
    source: Arc<dyn SectionSource>,
}

impl SectionExtractor {
    pub fn new(source: Arc<dyn SectionSource>) -> Self {
        Self { source }
    }

    pub async fn extract(&self, document_url: &str, item: SectionItem) -> ExtractedSection {
        let raw_text = match self.source.extract(document_url, item).await {
            Ok(text) => StageOutcome::Ready(process_section_text(&text)),
            Err(e) => {
                warn!("Failed to extract section {}: {}", item, e);
                StageOutcome::degraded(e.to_string())
            }
        };
        ExtractedSection { item, raw_text }
    }

    /// Extracts every [`SectionItem`] concurrently. The result keeps item
    /// order whatever the completion order.
    pub async fn extract_all(&self, filing: &FilingReference) -> FilingSections {
        let sections = join_all(
            SectionItem::iter().map(|item| self.extract(&filing.document_url, item)),
        )
        .await;

        let degraded = sections.iter().filter(|s| s.raw_text.is_degraded()).count();
        info!(
            "Extracted {} of {} sections from {}",
            sections.len() - degraded,
            sections.len(),
            filing.document_url
        );
        FilingSections::new(sections)
    }
}

/// Accepts a JSON string, a JSON array of strings, or plain text.
pub fn parse_extractor_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        Ok(serde_json::Value::Null) => String::new(),
        _ => body.to_string(),
    }
}

#[async_trait::async_trait]
impl SectionSource for SecApiClient {
    async fn extract(&self, document_url: &str, item: SectionItem) -> PipelineResult<String> {
        let url = format!("{}/extractor", self.base_url);
        let body = json!({
            "url": document_url,
            "item": item.item_code(),
            "type": "text"
        });
        let text = self
            .upstream
            .send(SEC_API_SERVICE, |client| {
                client
                    .post(&url)
                    .header(reqwest::header::AUTHORIZATION, &self.api_key)
                    .json(&body)
            })
            .await?;
        Ok(parse_extractor_body(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_iterate_in_filing_order() {
        let codes: Vec<_> = SectionItem::iter().map(|i| i.item_code()).collect();
        assert_eq!(codes, vec!["1", "1A", "7", "8"]);
    }

    #[test]
    fn extractor_body_shapes() {
        assert_eq!(parse_extractor_body(r#""Item 1. Business""#), "Item 1. Business");
        assert_eq!(parse_extractor_body(r#"["a", "b"]"#), "a\nb");
        assert_eq!(parse_extractor_body("plain text body"), "plain text body");
        assert_eq!(parse_extractor_body("null"), "");
    }
}
