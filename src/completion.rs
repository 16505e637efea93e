use std::{fmt::Display, future::Future, time::Duration};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Config;

type Result<T, E = CompletionError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum CompletionError {
    /// The request never produced a response (network, TLS, timeout, bad body).
    Transport(reqwest::Error),
    /// The service answered with a non-success status.
    Api { status: StatusCode, body: String },
    /// The service answered, but without any message content.
    EmptyResponse,
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        CompletionError::Transport(e)
    }
}

impl Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionError::Transport(e) => write!(f, "Completion request failed: {}", e),
            CompletionError::Api { status, body } => {
                write!(f, "Completion service returned {}: {}", status, body)
            }
            CompletionError::EmptyResponse => write!(f, "Completion service returned no content"),
        }
    }
}

impl std::error::Error for CompletionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompletionError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// A text completion backend.
///
/// One call is one best-effort request: implementations must not retry.
pub trait CompletionService: Send + Sync {
    fn complete(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, system_instruction: &'a str, user_instruction: &'a str) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: user_instruction,
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

/// Client for an OpenAI compatible `chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_key,
            model,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            &config.openai_base_url,
            config.openai_timeout,
        )
    }
}

impl CompletionService for OpenAiClient {
    async fn complete(&self, system_instruction: &str, user_instruction: &str) -> Result<String> {
        log::debug!("Requesting completion from {} ({})", self.endpoint, self.model);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest::new(
                &self.model,
                system_instruction,
                user_instruction,
            ))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, body });
        }

        let content = response.json::<ChatResponse>().await?.into_content()?;
        log::debug!("Completion: {:?}", content);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_both_instructions() {
        let request = ChatRequest::new("gpt-4o-mini", "be terse", "say hi");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "be terse"},
                    {"role": "user", "content": "say hi"}
                ]
            })
        );
    }

    #[test]
    fn response_content_is_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "first"}},
                    {"index": 1, "message": {"role": "assistant", "content": "second"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.into_content().unwrap(), "first");
    }

    #[test]
    fn response_without_content_is_empty() {
        let no_choices: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            no_choices.into_content(),
            Err(CompletionError::EmptyResponse)
        ));

        let null_content: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            null_content.into_content(),
            Err(CompletionError::EmptyResponse)
        ));
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = OpenAiClient::new(
            "key".to_string(),
            "gpt-4o-mini".to_string(),
            "https://api.openai.com/v1/",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.endpoint, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn api_error_display_includes_status() {
        let error = CompletionError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "quota exceeded".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Completion service returned 429 Too Many Requests: quota exceeded"
        );
    }
}
