//! Keyword bucketing of model output.
//!
//! The model is asked for a structure but nothing enforces it, so every
//! rule here works line by line on whatever text came back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]+|\d+[.)]|[a-zA-Z][.)])\s+").unwrap());
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2}(?:-\d{2}-\d{2})?)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NarrativeClass {
    Strength,
    Weakness,
    Risk,
    Verdict,
    Unclassified,
}

/// Tags a line by keyword, first match wins:
/// verdict/recommendation, then strength/advantage, then weakness/concern,
/// then risk/challenge. Anything else is `Unclassified` and is left out of
/// the narrative buckets.
///
/// A leading `Label:` decides on its own when it carries a keyword, so
/// "Competitive risk: rivals may erode our pricing advantage" is a risk.
pub fn classify_line(line: &str) -> NarrativeClass {
    let item = strip_list_marker(line);
    if let Some((label, _)) = item.split_once(':') {
        match keyword_class(&label.to_lowercase()) {
            NarrativeClass::Unclassified => {}
            class => return class,
        }
    }
    keyword_class(&line.to_lowercase())
}

fn keyword_class(lower: &str) -> NarrativeClass {
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["verdict", "recommendation"]) {
        NarrativeClass::Verdict
    } else if has(&["strength", "advantage"]) {
        NarrativeClass::Strength
    } else if has(&["weakness", "concern"]) {
        NarrativeClass::Weakness
    } else if has(&["risk", "challenge"]) {
        NarrativeClass::Risk
    } else {
        NarrativeClass::Unclassified
    }
}

const HEADING_WORDS: &[&str] = &[
    "key", "main", "major", "top", "principal", "primary", "competitive", "and", "of", "the",
    "risk", "risks", "factors", "challenge", "challenges", "strength", "strengths", "advantage",
    "advantages", "weakness", "weaknesses", "concern", "concerns", "verdict", "recommendation",
];

/// Section titles the model puts above its lists: "2. Strengths",
/// "Key risks:", "Concerns -". They name a bucket but are not an item.
fn is_heading(item: &str) -> bool {
    let title = item.trim_end_matches([':', '-', ' ']);
    if title.is_empty() || item.trim_end().ends_with(':') {
        return true;
    }
    title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .all(|w| w.is_empty() || HEADING_WORDS.contains(&w.as_str()))
}

/// Non-empty, trimmed lines with markdown emphasis removed.
pub fn narrative_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().replace("**", ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    match LIST_MARKER_RE.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line,
    }
}

/// Text after the first `:`, if there is any.
fn after_colon(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, rest)| rest.trim().to_string())
        .filter(|rest| !rest.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskReview {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub risks: Vec<String>,
    pub verdict: Option<String>,
}

impl RiskReview {
    pub fn from_completion(text: &str) -> Self {
        let mut review = RiskReview::default();
        for line in narrative_lines(text) {
            let item = strip_list_marker(&line).to_string();
            if is_heading(&item) {
                continue;
            }
            match classify_line(&line) {
                NarrativeClass::Verdict => {
                    if review.verdict.is_none() {
                        review.verdict = Some(after_colon(&item).unwrap_or(item));
                    }
                }
                NarrativeClass::Strength => review.strengths.push(item),
                NarrativeClass::Weakness => review.weaknesses.push(item),
                NarrativeClass::Risk => review.risks.push(item),
                NarrativeClass::Unclassified => {}
            }
        }
        review
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessProfile {
    pub sector: Option<String>,
    pub description: Option<String>,
    pub revenue_streams: Vec<String>,
}

impl BusinessProfile {
    pub fn from_completion(text: &str) -> Self {
        let lines = narrative_lines(text);

        let sector = lines
            .iter()
            .find(|l| {
                let lower = l.to_lowercase();
                lower.contains("sector") || lower.contains("industry")
            })
            .and_then(|l| after_colon(l));

        let description = lines
            .iter()
            .find(|l| l.chars().count() > 100)
            .map(|l| strip_list_marker(l).to_string());

        let revenue_streams = lines
            .iter()
            .filter(|l| {
                let lower = l.to_lowercase();
                lower.contains("revenue") || lower.contains("stream") || lower.contains("segment")
            })
            .map(|l| strip_list_marker(l).to_string())
            .take(4)
            .collect();

        Self {
            sector,
            description,
            revenue_streams,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutiveNotes {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub founder: bool,
    pub notes: Option<String>,
}

impl ExecutiveNotes {
    pub fn from_completion(text: &str) -> Self {
        let lines = narrative_lines(text);

        let name = lines
            .iter()
            .find(|l| l.contains("CEO"))
            .and_then(|l| after_colon(l));

        let start_date = lines
            .iter()
            .filter(|l| {
                let lower = l.to_lowercase();
                ["start", "since", "appointed", "joined"]
                    .iter()
                    .any(|w| lower.contains(w))
            })
            .find_map(|l| YEAR_RE.captures(l).map(|c| c[1].to_string()));

        let founder = lines.iter().any(|l| {
            let lower = l.to_lowercase();
            lower.contains("founder") && !is_negated(&lower)
        });

        let notes = lines
            .iter()
            .find(|l| {
                let lower = l.to_lowercase();
                lower.contains("performance") || lower.contains("achievement")
            })
            .map(|l| strip_list_marker(l).to_string());

        Self {
            name,
            start_date,
            founder,
            notes,
        }
    }
}

// "Founder: No", "is not a founder", "non-founder CEO".
fn is_negated(lower: &str) -> bool {
    lower.contains("non-founder")
        || lower
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .any(|w| matches!(w, "no" | "not" | "isn't" | "wasn't"))
}
