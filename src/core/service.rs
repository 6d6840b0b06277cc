use chrono::{NaiveDate, Utc};
use log::info;
use std::sync::Arc;

use super::config::{AppConfig, Credentials};
use super::error::{PipelineError, PipelineResult};
use super::types::{CompletionModel, FilingSearch, SectionSource};
use crate::edgar::filing::{FilingLocator, SecApiClient};
use crate::edgar::parsing::{parse_financials, ParsedFinancials};
use crate::edgar::section::{FilingSections, SectionExtractor, SectionItem};
use crate::metrics::MetricsProjector;
use crate::summarize::{NarrativeSummarizer, OpenAiClient};
use crate::template::{assemble, AssemblyInput, GenerateResponse};
use crate::utils::http::Upstream;

/// Runs the whole pipeline for one ticker:
/// locate, extract, then parse and summarize side by side, project, assemble.
pub struct TemplateService {
    locator: FilingLocator,
    extractor: SectionExtractor,
    summarizer: NarrativeSummarizer,
    projector: MetricsProjector,
}

impl TemplateService {
    pub fn new(
        search: Arc<dyn FilingSearch>,
        sections: Arc<dyn SectionSource>,
        model: Arc<dyn CompletionModel>,
    ) -> Self {
        Self {
            locator: FilingLocator::new(search),
            extractor: SectionExtractor::new(sections),
            summarizer: NarrativeSummarizer::new(model),
            projector: MetricsProjector::default(),
        }
    }

    /// Production wiring: both clients share one HTTP client and one
    /// concurrency limit.
    pub fn from_config(config: &AppConfig, credentials: &Credentials) -> PipelineResult<Self> {
        let upstream = Upstream::from_config(config).map_err(|e| {
            PipelineError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;
        let sec_api = Arc::new(SecApiClient::new(
            upstream.clone(),
            &config.sec_api_url,
            &credentials.sec_api_key,
        ));
        let openai = Arc::new(OpenAiClient::new(
            upstream,
            &config.openai_api_url,
            &credentials.openai_key,
            &config.openai_model,
        ));
        Ok(Self::new(sec_api.clone(), sec_api, openai))
    }

    pub async fn generate(&self, ticker: &str) -> PipelineResult<GenerateResponse> {
        self.generate_as_of(ticker, Utc::now().date_naive()).await
    }

    /// Same as [`TemplateService::generate`] with a fixed reference date for
    /// the year labels and `lastUpdated`.
    pub async fn generate_as_of(
        &self,
        ticker: &str,
        as_of: NaiveDate,
    ) -> PipelineResult<GenerateResponse> {
        let filing = self.locator.locate(ticker).await?;

        info!("Extracting sections for {}", filing.ticker);
        let sections = self.extractor.extract_all(&filing).await;

        let (financials, narratives) = tokio::join!(
            async { financial_facts(&sections) },
            self.summarizer.summarize_all(&sections),
        );

        info!(
            "Projecting metrics for {} ({} revenue, {} net income facts)",
            filing.ticker,
            financials.revenue.len(),
            financials.net_income.len()
        );
        let projection = self.projector.project(&financials, as_of);

        let response = assemble(AssemblyInput {
            filing: &filing,
            sections: &sections,
            narratives: &narratives,
            projection,
            as_of,
        });
        info!(
            "Template ready for {} ({} degraded stages)",
            response.ticker,
            response.template_data.structured_data.degraded_stages.len()
        );
        Ok(response)
    }
}

/// Facts from the financial statements, then MD&A.
fn financial_facts(sections: &FilingSections) -> ParsedFinancials {
    let text = format!(
        "{}\n{}",
        sections.text(SectionItem::FinancialStatements),
        sections.text(SectionItem::ManagementDiscussion)
    );
    parse_financials(&text)
}
