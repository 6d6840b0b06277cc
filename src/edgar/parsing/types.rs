use serde::{Deserialize, Serialize};
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "camelCase")]
pub enum FactLabel {
    Revenue,
    NetIncome,
    OperatingCashFlow,
    TotalAssets,
    TotalDebt,
    CashAndEquivalents,
    CurrentAssets,
    CurrentLiabilities,
}

/// How much a figure can be trusted. Only regex matching exists today;
/// nothing is cross-checked against structured financial data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceConfidence {
    RegexMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialFact {
    pub label: FactLabel,
    pub value: f64,
    pub source_confidence: SourceConfidence,
}
