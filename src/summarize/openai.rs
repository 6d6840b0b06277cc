use serde::{Deserialize, Serialize};

use super::CompletionRequest;
use crate::core::error::{PipelineError, PipelineResult};
use crate::core::types::CompletionModel;
use crate::utils::http::Upstream;

pub const OPENAI_SERVICE: &str = "OpenAI API";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat-completions client; one request per call, no history.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    upstream: Upstream,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(upstream: Upstream, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

/// Content of the first choice, empty when the model returned none.
pub fn parse_chat_response(body: &str) -> PipelineResult<String> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| PipelineError::Decode {
        service: OPENAI_SERVICE,
        message: e.to_string(),
    })?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default())
}

#[async_trait::async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> PipelineResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        let body = self
            .upstream
            .send(OPENAI_SERVICE, |client| {
                client.post(&url).bearer_auth(&self.api_key).json(&payload)
            })
            .await?;
        parse_chat_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_choice() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "Sector: Industrials"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "Sector: Industrials");
    }

    #[test]
    fn no_choices_is_empty_text() {
        assert_eq!(parse_chat_response(r#"{"choices": []}"#).unwrap(), "");
        assert!(parse_chat_response("<html>").is_err());
    }
}
