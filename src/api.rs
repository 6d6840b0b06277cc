use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::core::config::AppConfig;
use crate::core::error::{PipelineError, PipelineResult};
use crate::core::service::TemplateService;
use crate::edgar::filing::normalize_ticker;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub ticker: Option<String>,
    /// Accepted for compatibility with the web client; not used.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn pipeline_failure(err: &PipelineError) -> ApiError {
    let status = match err {
        PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            details: err.details(),
        }),
    )
}

/// Shared by every request. A service that could not be built (missing
/// keys) is kept as its error so the server still answers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<PipelineResult<TemplateService>>,
}

impl AppState {
    pub fn new(service: TemplateService) -> Self {
        Self {
            service: Arc::new(Ok(service)),
        }
    }

    pub fn unconfigured(err: PipelineError) -> Self {
        Self {
            service: Arc::new(Err(err)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config
            .credentials()
            .and_then(|credentials| TemplateService::from_config(config, &credentials))
        {
            Ok(service) => Self::new(service),
            Err(e) => {
                warn!("Template generation is unavailable: {}", e);
                Self::unconfigured(e)
            }
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

/// The CORS layer answers every OPTIONS request itself with 200; browsers
/// and the web client expect 204.
async fn preflight_status(method: Method, mut response: Response) -> Response {
    if method == Method::OPTIONS && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

async fn method_not_allowed() -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

async fn generate_template(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();

    let request: GenerateRequest = if body.is_empty() {
        GenerateRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!("[{}] Unreadable request body: {}", request_id, e);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Invalid request body".to_string(),
                        details: Some(e.to_string()),
                    }),
                )
                    .into_response();
            }
        }
    };

    let ticker = match normalize_ticker(request.ticker.as_deref().unwrap_or_default()) {
        Ok(ticker) => ticker,
        Err(e) => return pipeline_failure(&e).into_response(),
    };
    debug!(
        "[{}] Request for {} (user: {})",
        request_id,
        ticker,
        request.user_id.as_deref().unwrap_or("-")
    );

    let service = match &*state.service {
        Ok(service) => service,
        Err(e) => {
            error!("[{}] {}", request_id, e);
            return pipeline_failure(e).into_response();
        }
    };

    info!("[{}] Generating template for {}", request_id, ticker);
    match service.generate(&ticker).await {
        Ok(response) => {
            info!("[{}] Template generated for {}", request_id, ticker);
            Json(response).into_response()
        }
        Err(e) => {
            error!("[{}] Template generation failed for {}: {}", request_id, ticker, e);
            pipeline_failure(&e).into_response()
        }
    }
}

fn generate_routes() -> MethodRouter<AppState> {
    post(generate_template).fallback(method_not_allowed)
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", generate_routes())
        .route("/generate-ai-template", generate_routes())
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(middleware::map_response(preflight_status))
        .with_state(state)
}
