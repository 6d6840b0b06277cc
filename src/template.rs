use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::types::{DegradedStage, StageOutcome};
use crate::edgar::filing::FilingReference;
use crate::edgar::report::FormType;
use crate::edgar::section::FilingSections;
use crate::metrics::{
    BalanceSheetSnapshot, CashFlowYear, FinancialMetrics, IncomeStatementYear, MetricsProjection,
};
use crate::summarize::{BusinessProfile, ExecutiveNotes, NarrativeTask, Narratives, RiskReview};

/// Shown for narrative fields nothing could resolve.
pub const NOT_AVAILABLE: &str = "N/A";
pub const CEO_ROLE: &str = "Chief Executive Officer";

const PROFILE_RISKS: usize = 5;
const SUMMARY_RISKS: usize = 4;
const SUMMARY_STRENGTHS: usize = 4;
const SUMMARY_WEAKNESSES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub ticker: String,
    pub name: String,
    pub industry_sector: String,
    pub business_description: String,
    pub revenue_streams: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveEntry {
    pub name: String,
    pub role: String,
    pub start_date: String,
    pub founder: bool,
    pub notes_performance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub risks: Vec<String>,
    pub final_verdict: String,
}

/// Everything the pipeline learned about one company. Built once per
/// request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAnalysis {
    pub company_profile: CompanyProfile,
    pub financial_metrics: FinancialMetrics,
    pub balance_sheet: BalanceSheetSnapshot,
    pub cash_flow: Vec<CashFlowYear>,
    pub income_statement: Vec<IncomeStatementYear>,
    pub executive_management: Vec<ExecutiveEntry>,
    pub summary: Summary,
    pub degraded_stages: Vec<DegradedStage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub sector: String,
    pub description: String,
    pub current_price: String,
    pub market_cap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsSummary {
    pub revenue: String,
    pub net_income: String,
    pub operating_cash_flow: String,
    pub total_assets: String,
    pub total_debt: String,
    pub cash_and_equivalents: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub pe_ratio: f64,
    pub pb_ratio: String,
    pub ev_ebitda: String,
    pub price_to_sales: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisNotes {
    pub strengths: String,
    pub risks: String,
    pub thesis: String,
}

/// Flattened projection with the field names of the persisted research
/// template, plus the full analysis under `structuredData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    pub company_name: String,
    pub ticker_symbol: String,
    pub basic_info: BasicInfo,
    pub structured_data: CompanyAnalysis,
    pub business_model: String,
    pub financials: FinancialsSummary,
    pub valuation: Valuation,
    pub analysis: AnalysisNotes,
    pub ceo_name: String,
    pub ceo_start_date: String,
    pub founder_led: bool,
    pub ceo_background: String,
    pub bull_case: String,
    pub bear_case: String,
    pub key_catalysts: String,
    pub additional_thesis_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingsSummary {
    pub ten_k: String,
    pub ten_q: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub ticker: String,
    pub company_name: String,
    pub template_data: TemplateData,
    pub filings_summary: FilingsSummary,
}

pub struct AssemblyInput<'a> {
    pub filing: &'a FilingReference,
    pub sections: &'a FilingSections,
    pub narratives: &'a Narratives,
    pub projection: MetricsProjection,
    pub as_of: NaiveDate,
}

fn or_na(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn millions(value: f64) -> String {
    format!("${}M", value)
}

fn parse_or_default<T: Default>(outcome: &StageOutcome<String>, parse: fn(&str) -> T) -> T {
    outcome.ready().map(|text| parse(text)).unwrap_or_default()
}

fn degraded_stages(sections: &FilingSections, narratives: &Narratives) -> Vec<DegradedStage> {
    let section_stages = sections.iter().filter_map(|s| {
        s.raw_text.degraded_reason().map(|reason| DegradedStage {
            stage: format!("section:{}", s.item.item_code()),
            reason: reason.to_string(),
        })
    });
    let narrative_stages = [
        (NarrativeTask::Business, &narratives.business),
        (NarrativeTask::Risk, &narratives.risk),
        (NarrativeTask::Executive, &narratives.executive),
    ]
    .into_iter()
    .filter_map(|(task, outcome)| {
        outcome.degraded_reason().map(|reason| DegradedStage {
            stage: task.stage_name().to_string(),
            reason: reason.to_string(),
        })
    });
    section_stages.chain(narrative_stages).collect()
}

fn filings_summary(filing: &FilingReference, as_of: NaiveDate) -> FilingsSummary {
    let (ten_k, ten_q) = match filing.form_type {
        FormType::Form10K => (
            format!(
                "Latest 10-K filed {} analyzed for comprehensive business overview",
                filing.filed_at
            ),
            NOT_AVAILABLE.to_string(),
        ),
        FormType::Form10Q => (
            NOT_AVAILABLE.to_string(),
            format!(
                "Latest 10-Q filed {} analyzed for current financial performance",
                filing.filed_at
            ),
        ),
    };
    FilingsSummary {
        ten_k,
        ten_q,
        last_updated: as_of.format("%Y-%m-%d").to_string(),
    }
}

/// Folds the stage outputs into the response. Pure: no I/O, and the same
/// inputs always give the same response.
pub fn assemble(input: AssemblyInput<'_>) -> GenerateResponse {
    let AssemblyInput {
        filing,
        sections,
        narratives,
        projection,
        as_of,
    } = input;

    let business = parse_or_default(&narratives.business, BusinessProfile::from_completion);
    let review = parse_or_default(&narratives.risk, RiskReview::from_completion);
    let executive = parse_or_default(&narratives.executive, ExecutiveNotes::from_completion);

    let company_profile = CompanyProfile {
        ticker: filing.ticker.clone(),
        name: filing.company_name.clone(),
        industry_sector: or_na(business.sector),
        business_description: or_na(business.description),
        revenue_streams: business.revenue_streams,
        risks: review.risks.iter().take(PROFILE_RISKS).cloned().collect(),
    };

    let summary = Summary {
        strengths: review.strengths.into_iter().take(SUMMARY_STRENGTHS).collect(),
        weaknesses: review.weaknesses.into_iter().take(SUMMARY_WEAKNESSES).collect(),
        risks: review.risks.into_iter().take(SUMMARY_RISKS).collect(),
        final_verdict: or_na(review.verdict),
    };

    let ceo = ExecutiveEntry {
        name: or_na(executive.name),
        role: CEO_ROLE.to_string(),
        start_date: or_na(executive.start_date),
        founder: executive.founder,
        notes_performance: or_na(executive.notes),
    };

    let analysis = CompanyAnalysis {
        company_profile,
        financial_metrics: projection.financial_metrics,
        balance_sheet: projection.balance_sheet,
        cash_flow: projection.cash_flow,
        income_statement: projection.income_statement,
        executive_management: vec![ceo],
        summary,
        degraded_stages: degraded_stages(sections, narratives),
    };

    let template_data = flatten(analysis);
    GenerateResponse {
        ticker: template_data.ticker_symbol.clone(),
        company_name: template_data.company_name.clone(),
        template_data,
        filings_summary: filings_summary(filing, as_of),
    }
}

/// Template field names as persisted by the CRUD layer.
pub fn flatten(analysis: CompanyAnalysis) -> TemplateData {
    let profile = &analysis.company_profile;
    let summary = &analysis.summary;
    let metrics = &analysis.financial_metrics;
    let latest_income = analysis.income_statement.last();
    let latest_cash_flow = analysis.cash_flow.last();
    let (ceo_name, ceo_start_date, ceo_background, founder_led) =
        match analysis.executive_management.first() {
            Some(ceo) => (
                ceo.name.clone(),
                ceo.start_date.clone(),
                ceo.notes_performance.clone(),
                ceo.founder,
            ),
            None => (
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                false,
            ),
        };

    TemplateData {
        company_name: profile.name.clone(),
        ticker_symbol: profile.ticker.clone(),
        basic_info: BasicInfo {
            sector: profile.industry_sector.clone(),
            description: profile.business_description.clone(),
            current_price: NOT_AVAILABLE.to_string(),
            market_cap: NOT_AVAILABLE.to_string(),
        },
        business_model: profile.business_description.clone(),
        financials: FinancialsSummary {
            revenue: millions(latest_income.map(|r| r.total_revenue).unwrap_or(0.0)),
            net_income: millions(latest_income.map(|r| r.net_income).unwrap_or(0.0)),
            operating_cash_flow: millions(
                latest_cash_flow.map(|r| r.operating_cash_flow).unwrap_or(0.0),
            ),
            total_assets: millions(analysis.balance_sheet.total_liquid_assets),
            total_debt: millions(analysis.balance_sheet.total_debt),
            cash_and_equivalents: millions(analysis.balance_sheet.cash_and_equivalents),
        },
        valuation: Valuation {
            pe_ratio: metrics.pe_ratio,
            pb_ratio: metrics.pb_ratio.to_string(),
            ev_ebitda: metrics.ev_ebitda.to_string(),
            price_to_sales: metrics.price_to_sales.to_string(),
        },
        analysis: AnalysisNotes {
            strengths: summary.strengths.join(" "),
            risks: summary.risks.join(" "),
            thesis: summary.final_verdict.clone(),
        },
        ceo_name,
        ceo_start_date,
        founder_led,
        ceo_background,
        bull_case: summary.strengths.join(". "),
        bear_case: summary.risks.join(". "),
        key_catalysts: NOT_AVAILABLE.to_string(),
        additional_thesis_notes: summary.final_verdict.clone(),
        structured_data: analysis,
    }
}
