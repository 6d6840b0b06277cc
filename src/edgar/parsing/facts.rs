use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use super::types::{FactLabel, FinancialFact, SourceConfidence};

/// Label phrase, then a currency-like number with an optional scale word.
/// The scale word is matched so it is consumed, but no scaling is applied.
fn fact_pattern(phrases: &str) -> Regex {
    Regex::new(&format!(
        r"(?i)(?:{})[:\s]+\$?([0-9,]+(?:\.[0-9]+)?)\s*(?:million|billion)?",
        phrases
    ))
    .unwrap()
}

static PATTERNS: Lazy<Vec<(FactLabel, Regex)>> = Lazy::new(|| {
    FactLabel::iter()
        .map(|label| (label, fact_pattern(label.phrases())))
        .collect()
});

impl FactLabel {
    fn phrases(&self) -> &'static str {
        match self {
            FactLabel::Revenue => "revenue|net sales|total revenue",
            FactLabel::NetIncome => "net income|net earnings",
            FactLabel::OperatingCashFlow => "operating cash flow|cash from operations",
            FactLabel::TotalAssets => "total assets",
            FactLabel::TotalDebt => "total debt|long-term debt",
            FactLabel::CashAndEquivalents => "cash and cash equivalents|cash and equivalents",
            FactLabel::CurrentAssets => "total current assets",
            FactLabel::CurrentLiabilities => "total current liabilities",
        }
    }
}

/// Every match of one label, in text order.
pub fn scan_label(text: &str, label: FactLabel) -> Vec<FinancialFact> {
    let Some((_, pattern)) = PATTERNS.iter().find(|(l, _)| *l == label) else {
        return Vec::new();
    };
    pattern
        .captures_iter(text)
        .filter_map(|caps| parse_amount(caps.get(1)?.as_str()))
        .filter(|value| label != FactLabel::Revenue || *value > 0.0)
        .map(|value| FinancialFact {
            label,
            value,
            source_confidence: SourceConfidence::RegexMatch,
        })
        .collect()
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Best-effort figures scanned out of filing prose. Values are in the units
/// the filing wrote them in (usually millions of USD) and are not verified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFinancials {
    pub revenue: Vec<f64>,
    pub net_income: Vec<f64>,
    pub operating_cash_flow: Vec<f64>,
    pub total_assets: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
}

impl ParsedFinancials {
    pub fn baseline_revenue(&self) -> Option<f64> {
        self.revenue.first().copied()
    }

    pub fn baseline_net_income(&self) -> Option<f64> {
        self.net_income.first().copied()
    }

    pub fn baseline_operating_cash_flow(&self) -> Option<f64> {
        self.operating_cash_flow.first().copied()
    }
}

pub fn parse_financials(text: &str) -> ParsedFinancials {
    let all = |label| scan_label(text, label).into_iter().map(|f| f.value).collect();
    let first = |label| scan_label(text, label).first().map(|f| f.value);

    let parsed = ParsedFinancials {
        revenue: all(FactLabel::Revenue),
        net_income: all(FactLabel::NetIncome),
        operating_cash_flow: all(FactLabel::OperatingCashFlow),
        total_assets: first(FactLabel::TotalAssets),
        total_debt: first(FactLabel::TotalDebt),
        cash_and_equivalents: first(FactLabel::CashAndEquivalents),
        current_assets: first(FactLabel::CurrentAssets),
        current_liabilities: first(FactLabel::CurrentLiabilities),
    };
    log::debug!(
        "Parsed facts: {} revenue, {} net income, {} operating cash flow",
        parsed.revenue.len(),
        parsed.net_income.len(),
        parsed.operating_cash_flow.len()
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_labelled_figures_in_order() {
        let text = "Total Revenue: $48,210 million compared with revenue of $44,100 million.\n\
                    Net Income: $7,332 million\n\
                    Net earnings 6,900.5\n\
                    Operating cash flow: $9,120 million";
        let parsed = parse_financials(text);
        assert_eq!(parsed.baseline_revenue(), Some(48210.0));
        assert_eq!(parsed.net_income, vec![7332.0, 6900.5]);
        assert_eq!(parsed.baseline_operating_cash_flow(), Some(9120.0));
        assert_eq!(parsed.total_assets, None);
    }

    #[test]
    fn revenue_of_zero_is_ignored() {
        let parsed = parse_financials("Revenue: $0 million\nNet sales: 1,250");
        assert_eq!(parsed.revenue, vec![1250.0]);
    }

    #[test]
    fn balance_sheet_items_take_first_match() {
        let text = "Total assets: $352,583 million\nTotal assets: $1 million\n\
                    Long-term debt: 95,281\nCash and cash equivalents: $29,965 million\n\
                    Total current assets: 143,566\nTotal current liabilities: 145,308";
        let parsed = parse_financials(text);
        assert_eq!(parsed.total_assets, Some(352583.0));
        assert_eq!(parsed.total_debt, Some(95281.0));
        assert_eq!(parsed.cash_and_equivalents, Some(29965.0));
        assert_eq!(parsed.current_assets, Some(143566.0));
        assert_eq!(parsed.current_liabilities, Some(145308.0));
    }

    #[test]
    fn unmatched_text_yields_nothing() {
        let parsed = parse_financials("The company makes anvils and rocket skates.");
        assert_eq!(parsed, ParsedFinancials::default());
    }

    #[test]
    fn scan_reports_regex_confidence() {
        let facts = scan_label("Total debt: 12,000", FactLabel::TotalDebt);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].value, 12000.0);
        assert_eq!(facts[0].source_confidence, SourceConfidence::RegexMatch);
    }
}
