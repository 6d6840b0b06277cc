#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use template_advisor::core::error::{PipelineError, PipelineResult};
use template_advisor::core::service::TemplateService;
use template_advisor::core::types::{CompletionModel, FilingSearch, SectionSource};
use template_advisor::edgar::filing::{FilingQuery, FilingReference};
use template_advisor::edgar::report::FormType;
use template_advisor::edgar::section::SectionItem;
use template_advisor::summarize::CompletionRequest;

/// Returns fixed filings, or fails like a non-2xx search response when
/// `failure` holds a status and body.
#[derive(Default)]
pub struct FakeSearch {
    pub filings: Vec<FilingReference>,
    pub failure: Option<(u16, String)>,
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl FilingSearch for FakeSearch {
    async fn search(&self, _query: &FilingQuery) -> PipelineResult<Vec<FilingReference>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some((status, body)) => Err(PipelineError::Upstream {
                service: "SEC API",
                status: *status,
                body: body.clone(),
            }),
            None => Ok(self.filings.clone()),
        }
    }
}

/// Serves fixed section texts; items mapped to `None` fail like an
/// extractor returning HTTP 500.
#[derive(Default)]
pub struct FakeSections {
    pub texts: HashMap<SectionItem, Option<String>>,
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl SectionSource for FakeSections {
    async fn extract(&self, _document_url: &str, item: SectionItem) -> PipelineResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.texts.get(&item) {
            Some(Some(text)) => Ok(text.clone()),
            Some(None) => Err(PipelineError::Upstream {
                service: "SEC API",
                status: 500,
                body: "extractor unavailable".to_string(),
            }),
            None => Ok(String::new()),
        }
    }
}

pub struct FakeModel {
    pub reply: String,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every completion fails like a 500 from the chat endpoint.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying("")
        }
    }
}

#[async_trait::async_trait]
impl CompletionModel for FakeModel {
    async fn complete(&self, request: &CompletionRequest) -> PipelineResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if self.fail {
            return Err(PipelineError::Upstream {
                service: "OpenAI API",
                status: 500,
                body: "model overloaded".to_string(),
            });
        }
        Ok(self.reply.clone())
    }
}

pub struct Harness {
    pub search: Arc<FakeSearch>,
    pub sections: Arc<FakeSections>,
    pub model: Arc<FakeModel>,
}

impl Harness {
    pub fn service(&self) -> TemplateService {
        TemplateService::new(
            self.search.clone(),
            self.sections.clone(),
            self.model.clone(),
        )
    }

    pub fn search_calls(&self) -> usize {
        self.search.calls.load(Ordering::SeqCst)
    }

    pub fn extraction_calls(&self) -> usize {
        self.sections.calls.load(Ordering::SeqCst)
    }

    pub fn model_calls(&self) -> usize {
        self.model.calls.load(Ordering::SeqCst)
    }
}

pub fn acme_filing() -> FilingReference {
    FilingReference {
        ticker: "ACME".to_string(),
        company_name: "Acme Corporation".to_string(),
        form_type: FormType::Form10K,
        filed_at: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
        document_url: "https://www.sec.gov/Archives/edgar/data/1/acme-10k.htm".to_string(),
    }
}

pub const MODEL_REPLY: &str = "Industry sector: Industrials\nCEO: Wile E. Coyote";

/// ACME 10-K whose risk-factors extraction fails.
pub fn acme() -> Harness {
    let mut texts = HashMap::new();
    texts.insert(
        SectionItem::Business,
        Some("<p>Acme Corporation makes anvils.</p>".to_string()),
    );
    texts.insert(SectionItem::RiskFactors, None);
    texts.insert(
        SectionItem::ManagementDiscussion,
        Some("Revenue grew on anvil demand.".to_string()),
    );
    texts.insert(
        SectionItem::FinancialStatements,
        Some("Total Revenue: $48,210 million\nNet Income: $7,332 million".to_string()),
    );

    Harness {
        search: Arc::new(FakeSearch {
            filings: vec![acme_filing()],
            ..FakeSearch::default()
        }),
        sections: Arc::new(FakeSections {
            texts,
            ..FakeSections::default()
        }),
        model: Arc::new(FakeModel::replying(MODEL_REPLY)),
    }
}

/// No filings at all.
pub fn zzzz() -> Harness {
    Harness {
        search: Arc::new(FakeSearch::default()),
        sections: Arc::new(FakeSections::default()),
        model: Arc::new(FakeModel::replying(MODEL_REPLY)),
    }
}

/// ACME whose filing search is refused with 401 "bad token".
pub fn rejected_search() -> Harness {
    let harness = acme();
    Harness {
        search: Arc::new(FakeSearch {
            failure: Some((401, "bad token".to_string())),
            ..FakeSearch::default()
        }),
        ..harness
    }
}

/// ACME with every section present but a completion model that always fails.
pub fn acme_with_failing_model() -> Harness {
    let mut harness = acme();
    let mut texts = HashMap::new();
    texts.insert(
        SectionItem::Business,
        Some("Acme Corporation makes anvils.".to_string()),
    );
    texts.insert(
        SectionItem::RiskFactors,
        Some("Demand for anvils is cyclical.".to_string()),
    );
    texts.insert(
        SectionItem::ManagementDiscussion,
        Some("Revenue grew on anvil demand.".to_string()),
    );
    texts.insert(
        SectionItem::FinancialStatements,
        Some("Total Revenue: $48,210 million\nNet Income: $7,332 million".to_string()),
    );
    harness.sections = Arc::new(FakeSections {
        texts,
        ..FakeSections::default()
    });
    harness.model = Arc::new(FakeModel::failing());
    harness
}
