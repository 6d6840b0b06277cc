use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::time::Duration;

use super::error::PipelineError;

pub const DEFAULT_SEC_API_URL: &str = "https://api.sec-api.io";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_USER_AGENT: &str = "software@example.com";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sec_api_key: Option<String>,
    pub openai_key: Option<String>,
    pub openai_model: String,
    pub sec_api_url: String,
    pub openai_api_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
    pub max_concurrent: usize,
    pub bind_addr: SocketAddr,
}

/// Both upstream credentials, present and non-empty.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub sec_api_key: String,
    pub openai_key: String,
}

impl AppConfig {
    /// Reads the process environment once. Missing API keys are not an error
    /// here; they are reported by [`AppConfig::credentials`] so the server can
    /// still start and answer with a configuration error.
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| anyhow!("BIND_ADDR is not a socket address: {}", e))?;

        Ok(Self {
            sec_api_key: non_empty_var("SEC_API_KEY"),
            openai_key: non_empty_var("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            sec_api_url: endpoint_var("SEC_API_URL", DEFAULT_SEC_API_URL)?,
            openai_api_url: endpoint_var("OPENAI_API_URL", DEFAULT_OPENAI_API_URL)?,
            user_agent: std::env::var("USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            request_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 30)?),
            connect_timeout: Duration::from_secs(parse_var("HTTP_CONNECT_TIMEOUT_SECS", 10)?),
            max_retries: parse_var("UPSTREAM_MAX_RETRIES", 2)?,
            max_concurrent: parse_var("UPSTREAM_MAX_CONCURRENT", 4)?,
            bind_addr,
        })
    }

    pub fn credentials(&self) -> Result<Credentials, PipelineError> {
        match (&self.sec_api_key, &self.openai_key) {
            (Some(sec_api_key), Some(openai_key)) => Ok(Credentials {
                sec_api_key: sec_api_key.clone(),
                openai_key: openai_key.clone(),
            }),
            _ => Err(PipelineError::Configuration(
                "SEC API key and OpenAI API key are required. Please configure them in your environment variables."
                    .to_string(),
            )),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sec_api_key: None,
            openai_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            sec_api_url: DEFAULT_SEC_API_URL.to_string(),
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 2,
            max_concurrent: 4,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Base URL without a trailing slash; must be absolute http(s).
fn endpoint_var(key: &str, default: &str) -> Result<String> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| anyhow!("{} is not a valid URL: {}", key, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("{} must use http or https", key));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_keys() {
        let mut config = AppConfig {
            sec_api_key: Some("sec".to_string()),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.credentials(),
            Err(PipelineError::Configuration(_))
        ));

        config.openai_key = Some("oa".to_string());
        let creds = config.credentials().unwrap();
        assert_eq!(creds.sec_api_key, "sec");
        assert_eq!(creds.openai_key, "oa");
    }

    #[test]
    fn default_endpoints_are_valid() {
        assert_eq!(
            endpoint_var("ADVISOR_TEST_UNSET_URL", "https://api.sec-api.io/").unwrap(),
            "https://api.sec-api.io"
        );
        assert!(endpoint_var("ADVISOR_TEST_UNSET_URL", "ftp://example.com").is_err());
        assert!(endpoint_var("ADVISOR_TEST_UNSET_URL", "not a url").is_err());
    }
}
