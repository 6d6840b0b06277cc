use chrono::{DateTime, NaiveDate};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::report::FormType;
use crate::core::error::{PipelineError, PipelineResult};
use crate::core::types::FilingSearch;
use crate::utils::http::Upstream;

pub const SEC_API_SERVICE: &str = "SEC API";
pub const SEARCH_PAGE_SIZE: usize = 10;

// Exchange symbols plus class suffixes ("BRK.B", "BF-B"). Anything else
// would be spliced into the search query as syntax.
static TICKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9.\-]{1,10}$").unwrap());

/// The filing a request is answered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingReference {
    pub ticker: String,
    pub company_name: String,
    pub form_type: FormType,
    pub filed_at: NaiveDate,
    pub document_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingQuery {
    pub ticker: String,
    pub form_types: Vec<FormType>,
    pub size: usize,
}

impl FilingQuery {
    pub fn periodic_reports(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            form_types: vec![FormType::Form10K, FormType::Form10Q],
            size: SEARCH_PAGE_SIZE,
        }
    }

    /// Lucene-style query string understood by the full-text search endpoint.
    pub fn query_string(&self) -> String {
        let forms = self
            .form_types
            .iter()
            .map(|f| format!("\"{}\"", f))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("ticker:{} AND formType:({})", self.ticker, forms)
    }

    pub fn to_search_body(&self) -> serde_json::Value {
        json!({
            "query": { "query_string": { "query": self.query_string() } },
            "from": "0",
            "size": self.size.to_string(),
            "sort": [{ "filedAt": { "order": "desc" } }]
        })
    }
}

pub fn normalize_ticker(ticker: &str) -> PipelineResult<String> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(PipelineError::InvalidRequest(
            "Ticker symbol is required".to_string(),
        ));
    }
    if !TICKER_RE.is_match(&ticker) {
        return Err(PipelineError::InvalidRequest(format!(
            "Invalid ticker symbol: {}",
            ticker
        )));
    }
    Ok(ticker)
}

/// Finds the most recent periodic report for a ticker.
pub struct FilingLocator {
    search: Arc<dyn FilingSearch>,
}

impl FilingLocator {
    pub fn new(search: Arc<dyn FilingSearch>) -> Self {
        Self { search }
    }

    pub async fn locate(&self, ticker: &str) -> PipelineResult<FilingReference> {
        let ticker = normalize_ticker(ticker)?;
        let query = FilingQuery::periodic_reports(&ticker);
        info!("Searching filings: {}", query.query_string());

        let filings = self.search.search(&query).await?;
        let latest = filings
            .into_iter()
            .next()
            .ok_or(PipelineError::NotFound { ticker })?;

        info!(
            "Found filing: {} filed at {} ({})",
            latest.form_type, latest.filed_at, latest.company_name
        );
        Ok(latest)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    filings: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(rename = "companyName", default)]
    company_name: Option<String>,
    #[serde(rename = "formType", default)]
    form_type: String,
    #[serde(rename = "filedAt", default)]
    filed_at: String,
    #[serde(rename = "linkToFilingDetails", default)]
    link_to_filing_details: Option<String>,
    #[serde(rename = "linkToHtml", default)]
    link_to_html: Option<String>,
}

impl SearchHit {
    fn into_reference(self, query_ticker: &str) -> Option<FilingReference> {
        let form_type = self.form_type.parse::<FormType>().ok()?;
        let filed_at = parse_filed_at(&self.filed_at)?;
        let document_url = self
            .link_to_filing_details
            .or(self.link_to_html)
            .filter(|u| !u.is_empty())?;
        let ticker = self
            .ticker
            .filter(|t| !t.is_empty())
            .map(|t| t.to_uppercase())
            .unwrap_or_else(|| query_ticker.to_string());
        let company_name = self
            .company_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{} Inc.", ticker));

        Some(FilingReference {
            ticker,
            company_name,
            form_type,
            filed_at,
            document_url,
        })
    }
}

fn parse_filed_at(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

/// Parses a search response body, keeping hits in the upstream order.
pub fn parse_search_response(body: &str, query: &FilingQuery) -> PipelineResult<Vec<FilingReference>> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| PipelineError::Decode {
            service: SEC_API_SERVICE,
            message: e.to_string(),
        })?;

    let total = response.filings.len();
    let references: Vec<FilingReference> = response
        .filings
        .into_iter()
        .filter_map(|hit| hit.into_reference(&query.ticker))
        .collect();
    if references.len() < total {
        debug!(
            "Skipped {} search hits without a usable form, date or link",
            total - references.len()
        );
    }
    Ok(references)
}

/// Client for the sec-api.io query and extractor endpoints.
#[derive(Debug, Clone)]
pub struct SecApiClient {
    pub(crate) upstream: Upstream,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl SecApiClient {
    pub fn new(upstream: Upstream, base_url: &str, api_key: &str) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl FilingSearch for SecApiClient {
    async fn search(&self, query: &FilingQuery) -> PipelineResult<Vec<FilingReference>> {
        let body = query.to_search_body();
        let url = self.base_url.clone();
        let text = self
            .upstream
            .send(SEC_API_SERVICE, |client| {
                client
                    .post(&url)
                    .header(reqwest::header::AUTHORIZATION, &self.api_key)
                    .header(reqwest::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .json(&body)
            })
            .await?;
        parse_search_response(&text, query)
    }
}
