use thiserror::Error;

/// Failure taxonomy of the template pipeline.
///
/// Only `Configuration`, `InvalidRequest`, `NotFound` and failures of the
/// filing search are fatal for a request. Section extraction and
/// summarisation errors are turned into degraded stages by their callers.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("No SEC filings found for ticker: {ticker}")]
    NotFound { ticker: String },

    #[error("{service} error: {status}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned an unreadable response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl PipelineError {
    /// Extra diagnostic text for the error response body.
    pub fn details(&self) -> Option<String> {
        match self {
            PipelineError::Upstream { body, .. } if !body.is_empty() => Some(body.clone()),
            PipelineError::Configuration(_) | PipelineError::Transport { .. } => Some(
                "Please check that your SEC API key and OpenAI API key are properly configured."
                    .to_string(),
            ),
            PipelineError::NotFound { .. } => {
                Some("Check the ticker spelling; only 10-K and 10-Q filings are searched.".to_string())
            }
            _ => None,
        }
    }

    /// Statuses worth another attempt: rate limiting and server-side failures.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Upstream { status, .. } => *status == 429 || *status >= 500,
            PipelineError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_ticker() {
        let err = PipelineError::NotFound {
            ticker: "ZZZZ".to_string(),
        };
        assert_eq!(err.to_string(), "No SEC filings found for ticker: ZZZZ");
        assert!(!err.is_transient());
    }

    #[test]
    fn upstream_details_carry_body() {
        let err = PipelineError::Upstream {
            service: "SEC API",
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "SEC API error: 503");
        assert_eq!(err.details().as_deref(), Some("maintenance"));
        assert!(err.is_transient());

        let client_side = PipelineError::Upstream {
            service: "SEC API",
            status: 401,
            body: String::new(),
        };
        assert!(!client_side.is_transient());
        assert!(client_side.details().is_none());
    }
}
