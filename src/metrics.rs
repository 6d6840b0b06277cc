//! Three-year figures and balance-sheet ratios derived from parsed facts.
//!
//! The multi-year series is a heuristic extrapolation, not a multi-year
//! extraction: a single baseline figure from the latest filing anchors the
//! current year and the two earlier years are discounted at fixed growth
//! rates. Every figure carries a [`Provenance`] so consumers can tell the
//! extracted value from the placeholders and projections around it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::edgar::parsing::ParsedFinancials;

pub const PLACEHOLDER_REVENUE: f64 = 50_000.0;
pub const PLACEHOLDER_NET_MARGIN: f64 = 0.15;
pub const PLACEHOLDER_CASH_FLOW_MARGIN: f64 = 0.18;

pub const PLACEHOLDER_CASH: f64 = 29_000.0;
pub const PLACEHOLDER_SHORT_TERM_INVESTMENTS: f64 = 15_000.0;
pub const PLACEHOLDER_LONG_TERM_INVESTMENTS: f64 = 45_000.0;
pub const PLACEHOLDER_SHORT_TERM_DEBT: f64 = 8_000.0;
pub const PLACEHOLDER_LONG_TERM_DEBT: f64 = 25_000.0;
/// Reported when liquid assets over debt has no finite value.
pub const FALLBACK_ASSETS_TO_DEBT_RATIO: f64 = 3.2;

pub const YEARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    /// Read from the filing text.
    Extracted,
    /// Fixed stand-in used because nothing was extracted.
    Placeholder,
    /// Extrapolated from another figure with a growth assumption.
    Projected,
    /// Computed only from extracted figures.
    Derived,
}

impl Provenance {
    /// Provenance of a figure computed from `parts`.
    pub fn combine(parts: &[Provenance]) -> Provenance {
        if parts
            .iter()
            .all(|p| matches!(p, Provenance::Extracted | Provenance::Derived))
        {
            Provenance::Derived
        } else {
            Provenance::Placeholder
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure {
    pub value: f64,
    pub provenance: Provenance,
}

impl Figure {
    pub fn extracted_or(value: Option<f64>, placeholder: f64) -> Self {
        match value {
            Some(value) => Figure {
                value,
                provenance: Provenance::Extracted,
            },
            None => Figure {
                value: placeholder,
                provenance: Provenance::Placeholder,
            },
        }
    }
}

/// `(current - previous) / previous * 100`, or 0 when that is undefined.
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthAssumptions {
    pub revenue: f64,
    pub net_income: f64,
    pub operating_cash_flow: f64,
}

impl Default for GrowthAssumptions {
    fn default() -> Self {
        Self {
            revenue: 0.08,
            net_income: 0.12,
            operating_cash_flow: 0.10,
        }
    }
}

/// Values for (current-2, current-1, current), anchored on `base` in the
/// current year and rounded to whole units.
fn series(base: f64, rate: f64) -> [f64; YEARS] {
    let factor = 1.0 + rate;
    [base / factor.powi(2), base / factor, base].map(f64::round)
}

fn yoy(values: &[f64; YEARS]) -> [f64; YEARS] {
    [
        0.0,
        growth_rate(values[1], values[0]),
        growth_rate(values[2], values[1]),
    ]
}

fn provenance_by_year(anchor: Provenance) -> [Provenance; YEARS] {
    [Provenance::Projected, Provenance::Projected, anchor]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowProvenance {
    pub net_income: Provenance,
    pub operating_cash_flow: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowYear {
    pub year: i32,
    pub net_income: f64,
    #[serde(rename = "netIncomeYoYGrowth")]
    pub net_income_yoy_growth: f64,
    pub operating_cash_flow: f64,
    #[serde(rename = "operatingCashFlowYoYGrowth")]
    pub operating_cash_flow_yoy_growth: f64,
    pub provenance: CashFlowProvenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementProvenance {
    pub total_revenue: Provenance,
    pub net_income: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementYear {
    pub year: i32,
    pub total_revenue: f64,
    #[serde(rename = "totalRevenueYoYGrowth")]
    pub total_revenue_yoy_growth: f64,
    pub net_income: f64,
    #[serde(rename = "netIncomeYoYGrowth")]
    pub net_income_yoy_growth: f64,
    pub revenue_vs_net_income_comparison: String,
    pub provenance: IncomeStatementProvenance,
}

fn net_margin_label(net_income: f64, revenue: f64) -> String {
    let margin = if revenue == 0.0 {
        0.0
    } else {
        net_income / revenue * 100.0
    };
    format!("Net margin: {:.1}%", margin)
}

/// Inputs of the balance-sheet snapshot. A missing component counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BalanceSheetInputs {
    pub cash_and_equivalents: Option<Figure>,
    pub short_term_investments: Option<Figure>,
    pub long_term_investments: Option<Figure>,
    pub short_term_debt: Option<Figure>,
    pub long_term_debt: Option<Figure>,
}

impl BalanceSheetInputs {
    /// Extracted cash and debt, placeholders for everything the parser does
    /// not look for.
    pub fn from_financials(financials: &ParsedFinancials) -> Self {
        let placeholder = |value| Some(Figure::extracted_or(None, value));
        Self {
            cash_and_equivalents: Some(Figure::extracted_or(
                financials.cash_and_equivalents,
                PLACEHOLDER_CASH,
            )),
            short_term_investments: placeholder(PLACEHOLDER_SHORT_TERM_INVESTMENTS),
            long_term_investments: placeholder(PLACEHOLDER_LONG_TERM_INVESTMENTS),
            short_term_debt: placeholder(PLACEHOLDER_SHORT_TERM_DEBT),
            long_term_debt: Some(Figure::extracted_or(
                financials.total_debt,
                PLACEHOLDER_LONG_TERM_DEBT,
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetProvenance {
    pub cash_and_equivalents: Provenance,
    pub short_term_investments: Provenance,
    pub long_term_investments: Provenance,
    pub total_liquid_assets: Provenance,
    pub short_term_debt: Provenance,
    pub long_term_debt: Provenance,
    pub total_debt: Provenance,
    pub assets_to_debt_ratio: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetSnapshot {
    pub cash_and_equivalents: f64,
    pub short_term_investments: f64,
    pub long_term_investments: f64,
    pub total_liquid_assets: f64,
    pub short_term_debt: f64,
    pub long_term_debt: f64,
    pub total_debt: f64,
    pub assets_to_debt_ratio: f64,
    pub provenance: BalanceSheetProvenance,
}

impl BalanceSheetSnapshot {
    pub fn from_inputs(inputs: &BalanceSheetInputs) -> Self {
        let part = |f: Option<Figure>| {
            f.unwrap_or(Figure {
                value: 0.0,
                provenance: Provenance::Placeholder,
            })
        };
        let cash = part(inputs.cash_and_equivalents);
        let short_inv = part(inputs.short_term_investments);
        let long_inv = part(inputs.long_term_investments);
        let short_debt = part(inputs.short_term_debt);
        let long_debt = part(inputs.long_term_debt);

        let total_liquid_assets = cash.value + short_inv.value + long_inv.value;
        let total_debt = short_debt.value + long_debt.value;
        let liquid_provenance =
            Provenance::combine(&[cash.provenance, short_inv.provenance, long_inv.provenance]);
        let debt_provenance = Provenance::combine(&[short_debt.provenance, long_debt.provenance]);

        let quotient = total_liquid_assets / total_debt;
        let (assets_to_debt_ratio, ratio_provenance) = if total_debt != 0.0 && quotient.is_finite() {
            (quotient, Provenance::combine(&[liquid_provenance, debt_provenance]))
        } else {
            (FALLBACK_ASSETS_TO_DEBT_RATIO, Provenance::Placeholder)
        };

        Self {
            cash_and_equivalents: cash.value,
            short_term_investments: short_inv.value,
            long_term_investments: long_inv.value,
            total_liquid_assets,
            short_term_debt: short_debt.value,
            long_term_debt: long_debt.value,
            total_debt,
            assets_to_debt_ratio,
            provenance: BalanceSheetProvenance {
                cash_and_equivalents: cash.provenance,
                short_term_investments: short_inv.provenance,
                long_term_investments: long_inv.provenance,
                total_liquid_assets: liquid_provenance,
                short_term_debt: short_debt.provenance,
                long_term_debt: long_debt.provenance,
                total_debt: debt_provenance,
                assets_to_debt_ratio: ratio_provenance,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtToAssetsBand {
    #[serde(rename = "Low Risk")]
    LowRisk,
    Moderate,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl DebtToAssetsBand {
    pub fn for_percent(percent: f64) -> Self {
        if percent < 20.0 {
            DebtToAssetsBand::LowRisk
        } else if percent <= 40.0 {
            DebtToAssetsBand::Moderate
        } else {
            DebtToAssetsBand::HighRisk
        }
    }
}

impl fmt::Display for DebtToAssetsBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtToAssetsBand::LowRisk => write!(f, "Low Risk"),
            DebtToAssetsBand::Moderate => write!(f, "Moderate"),
            DebtToAssetsBand::HighRisk => write!(f, "High Risk"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrentRatioBand {
    Strong,
    Adequate,
    Weak,
}

impl CurrentRatioBand {
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio > 2.0 {
            CurrentRatioBand::Strong
        } else if ratio >= 1.0 {
            CurrentRatioBand::Adequate
        } else {
            CurrentRatioBand::Weak
        }
    }
}

impl fmt::Display for CurrentRatioBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// `totalDebt / totalAssets * 100`; a zero, missing or non-finite
/// denominator gives 0 and the riskiest band.
pub fn debt_to_assets(total_debt: f64, total_assets: Option<f64>) -> (f64, DebtToAssetsBand) {
    match total_assets {
        Some(assets) if assets != 0.0 && (total_debt / assets).is_finite() => {
            let percent = total_debt / assets * 100.0;
            (percent, DebtToAssetsBand::for_percent(percent))
        }
        _ => (0.0, DebtToAssetsBand::HighRisk),
    }
}

/// `currentAssets / currentLiabilities`; a zero or missing denominator gives
/// 0 and the weakest band.
pub fn current_ratio(
    current_assets: Option<f64>,
    current_liabilities: Option<f64>,
) -> (f64, CurrentRatioBand) {
    let assets = current_assets.unwrap_or(0.0);
    match current_liabilities {
        Some(liabilities) if liabilities != 0.0 && (assets / liabilities).is_finite() => {
            let ratio = assets / liabilities;
            (ratio, CurrentRatioBand::for_ratio(ratio))
        }
        _ => (0.0, CurrentRatioBand::Weak),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetricsProvenance {
    pub valuation: Provenance,
    pub debt_to_assets_ratio: Provenance,
    pub current_ratio: Provenance,
}

/// Valuation multiples are fixed placeholders: no market-data source feeds
/// this pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub pe_ratio: f64,
    pub forward_pe: f64,
    pub peg_ratio: f64,
    pub dividend_yield: f64,
    pub expected_eps_growth: f64,
    pub pb_ratio: f64,
    pub ev_ebitda: f64,
    pub price_to_sales: f64,
    pub debt_to_assets_ratio: f64,
    pub debt_to_assets_band: DebtToAssetsBand,
    pub current_ratio: f64,
    pub current_ratio_band: CurrentRatioBand,
    pub provenance: FinancialMetricsProvenance,
}

impl FinancialMetrics {
    pub fn assess(financials: &ParsedFinancials, balance_sheet: &BalanceSheetSnapshot) -> Self {
        let (debt_to_assets_ratio, debt_to_assets_band) =
            debt_to_assets(balance_sheet.total_debt, financials.total_assets);
        let (current_ratio, current_ratio_band) =
            current_ratio(financials.current_assets, financials.current_liabilities);

        let debt_provenance = if financials.total_assets.is_some() {
            Provenance::combine(&[balance_sheet.provenance.total_debt])
        } else {
            Provenance::Placeholder
        };
        let current_provenance =
            if financials.current_assets.is_some() && financials.current_liabilities.is_some() {
                Provenance::Derived
            } else {
                Provenance::Placeholder
            };

        Self {
            pe_ratio: 25.4,
            forward_pe: 22.1,
            peg_ratio: 1.8,
            dividend_yield: 1.2,
            expected_eps_growth: 12.5,
            pb_ratio: 6.8,
            ev_ebitda: 18.5,
            price_to_sales: 7.2,
            debt_to_assets_ratio,
            debt_to_assets_band,
            current_ratio,
            current_ratio_band,
            provenance: FinancialMetricsProvenance {
                valuation: Provenance::Placeholder,
                debt_to_assets_ratio: debt_provenance,
                current_ratio: current_provenance,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsProjection {
    pub cash_flow: Vec<CashFlowYear>,
    pub income_statement: Vec<IncomeStatementYear>,
    pub balance_sheet: BalanceSheetSnapshot,
    pub financial_metrics: FinancialMetrics,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsProjector {
    pub growth: GrowthAssumptions,
}

impl MetricsProjector {
    pub fn new(growth: GrowthAssumptions) -> Self {
        Self { growth }
    }

    pub fn project(&self, financials: &ParsedFinancials, as_of: NaiveDate) -> MetricsProjection {
        let revenue = Figure::extracted_or(financials.baseline_revenue(), PLACEHOLDER_REVENUE);
        let net_income = Figure::extracted_or(
            financials.baseline_net_income(),
            revenue.value * PLACEHOLDER_NET_MARGIN,
        );
        let cash_flow = Figure::extracted_or(
            financials.baseline_operating_cash_flow(),
            revenue.value * PLACEHOLDER_CASH_FLOW_MARGIN,
        );

        let revenues = series(revenue.value, self.growth.revenue);
        let incomes = series(net_income.value, self.growth.net_income);
        let cash_flows = series(cash_flow.value, self.growth.operating_cash_flow);
        let revenue_growth = yoy(&revenues);
        let income_growth = yoy(&incomes);
        let cash_flow_growth = yoy(&cash_flows);

        let revenue_prov = provenance_by_year(revenue.provenance);
        let income_prov = provenance_by_year(net_income.provenance);
        let cash_flow_prov = provenance_by_year(cash_flow.provenance);

        let current_year = as_of.year();
        let years: Vec<i32> = (0..YEARS as i32)
            .map(|i| current_year - (YEARS as i32 - 1) + i)
            .collect();

        let cash_flow = (0..YEARS)
            .map(|i| CashFlowYear {
                year: years[i],
                net_income: incomes[i],
                net_income_yoy_growth: income_growth[i],
                operating_cash_flow: cash_flows[i],
                operating_cash_flow_yoy_growth: cash_flow_growth[i],
                provenance: CashFlowProvenance {
                    net_income: income_prov[i],
                    operating_cash_flow: cash_flow_prov[i],
                },
            })
            .collect();

        let income_statement = (0..YEARS)
            .map(|i| IncomeStatementYear {
                year: years[i],
                total_revenue: revenues[i],
                total_revenue_yoy_growth: revenue_growth[i],
                net_income: incomes[i],
                net_income_yoy_growth: income_growth[i],
                revenue_vs_net_income_comparison: net_margin_label(incomes[i], revenues[i]),
                provenance: IncomeStatementProvenance {
                    total_revenue: revenue_prov[i],
                    net_income: income_prov[i],
                },
            })
            .collect();

        let balance_sheet =
            BalanceSheetSnapshot::from_inputs(&BalanceSheetInputs::from_financials(financials));
        let financial_metrics = FinancialMetrics::assess(financials, &balance_sheet);

        MetricsProjection {
            cash_flow,
            income_statement,
            balance_sheet,
            financial_metrics,
        }
    }
}
