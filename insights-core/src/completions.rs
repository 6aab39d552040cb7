//! Chat completion client — wraps the hosted `/chat/completions` endpoint.
//!
//! One prompt in, the first choice's message content out. Default sampling
//! parameters, no retry, no streaming; failures propagate to the caller and
//! abort the current action.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Completion call errors
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing message content in response")]
    MissingContent,

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// ChatClient
// ============================================================================

/// Client for the hosted chat-completion API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ChatClient {
    pub fn new(api_key: String, model: String) -> Result<Self, CompletionError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
    ) -> Result<Self, CompletionError> {
        if api_key.is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
        })
    }

    /// Submit a prompt as a single user message and return the first
    /// completion's text content.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "Completion API error");

            return Err(CompletionError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::MissingContent)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> ChatClient {
        ChatClient::with_base_url("test-api-key".to_string(), "gpt-3.5-turbo".to_string(), base_url)
            .expect("Failed to create client")
    }

    fn mock_completion_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": text },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_complete_sends_prompt_and_returns_first_choice() {
        let mock_server = MockServer::start().await;
        let client = test_client(mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(body_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{ "role": "user", "content": "analyze this repo" }]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(mock_completion_response("Popular project.")),
            )
            .mount(&mock_server)
            .await;

        let result = client.complete("analyze this repo").await;

        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result.err());
        assert_eq!(result.unwrap(), "Popular project.");
    }

    #[tokio::test]
    async fn test_complete_propagates_api_error() {
        let mock_server = MockServer::start().await;
        let client = test_client(mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "You exceeded your current quota", "type": "insufficient_quota" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client.complete("analyze this repo").await;

        // No retry policy: a single failed call aborts the action.
        match result {
            Err(CompletionError::Api { code, message }) => {
                assert_eq!(code, 429);
                assert!(message.contains("quota"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_errors_on_empty_choices() {
        let mock_server = MockServer::start().await;
        let client = test_client(mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let result = client.complete("analyze this repo").await;

        assert!(matches!(result, Err(CompletionError::MissingContent)));
    }

    #[test]
    fn test_client_fails_with_missing_api_key() {
        let result = ChatClient::new(String::new(), "gpt-3.5-turbo".to_string());
        assert!(matches!(result, Err(CompletionError::MissingApiKey)));
    }
}
