use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use super::rate_limit::RateLimiter;
use crate::core::config::AppConfig;
use crate::core::error::{PipelineError, PipelineResult};

const BASE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

pub fn build_client(config: &AppConfig) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .build()
}

/// Shared transport for every upstream call: bounded concurrency plus
/// bounded retries for rate limiting, 5xx and timeouts.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
    limiter: RateLimiter,
    max_retries: u32,
}

impl Upstream {
    pub fn new(client: Client, limiter: RateLimiter, max_retries: u32) -> Self {
        Self {
            client,
            limiter,
            max_retries,
        }
    }

    pub fn from_config(config: &AppConfig) -> reqwest::Result<Self> {
        Ok(Self::new(
            build_client(config)?,
            RateLimiter::new(config.max_concurrent),
            config.max_retries,
        ))
    }

    /// Sends the request produced by `build`, rebuilding it for each attempt,
    /// and returns the body of the first successful response.
    pub async fn send<F>(&self, service: &'static str, build: F) -> PipelineResult<String>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = {
                let _permit = self.limiter.acquire().await;
                self.send_once(service, build(&self.client)).await
            };

            match outcome {
                Ok(body) => return Ok(body),
                Err((err, retry_after)) if err.is_transient() && attempt < self.max_retries => {
                    let delay = retry_after.unwrap_or_else(|| backoff(attempt));
                    log::warn!(
                        "{} attempt {} failed ({}), retrying in {:?}",
                        service,
                        attempt + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err((err, _)) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<String, (PipelineError, Option<Duration>)> {
        let response = request
            .send()
            .await
            .map_err(|source| (PipelineError::Transport { service, source }, None))?;

        let status = response.status();
        log::debug!("{} response status: {}", service, status);

        if !status.is_success() {
            let retry_after = retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            return Err((
                PipelineError::Upstream {
                    service,
                    status: status.as_u16(),
                    body,
                },
                retry_after.filter(|_| status == StatusCode::TOO_MANY_REQUESTS),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|source| (PipelineError::Transport { service, source }, None))?;
        log::debug!("{} received {} bytes", service, body.len());
        Ok(body)
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.saturating_pow(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff(0), Duration::from_millis(500));
        assert_eq!(backoff(1), Duration::from_millis(1000));
        assert_eq!(backoff(2), Duration::from_millis(2000));
    }
}
