use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::Config;
use crate::error::ServiceError;
use crate::models::GenerationRequest;

const API_VERSION: &str = "2023-06-01";

/// Anything that can turn a request into raw model text. Swapped for a stub in tests.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError>;
}

// Shortens base64 payloads so request logs stay readable
fn truncate_base64_in_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let Value::String(s) = val {
                        if s.len() > 100 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=') {
                            *s = format!("{}...[truncated {} chars]", &s[..50], s.len() - 50);
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(truncate_base64_in_json),
        _ => {}
    }
}

fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| trimmed.chars().take(500).collect())
}

pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    pub fn build_payload(&self, request: &GenerationRequest) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": request.system,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": request.image.media_type.as_str(),
                            "data": request.image.data,
                        }
                    },
                    {"type": "text", "text": request.instruction}
                ]
            }]
        })
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::Auth("ANTHROPIC_API_KEY is not set".into()))?;

        let url = format!("{}/v1/messages", self.base_url);
        let payload = self.build_payload(request);

        let mut logged = payload.clone();
        truncate_base64_in_json(&mut logged);
        info!("📤 Request to {} (styles: {}): {}", url, request.style_tags.join(", "), logged);

        let response = self.client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let body = response.text().await.map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("❌ API Error response: {}", body);
            let message = format!("HTTP {}: {}", status, error_message(&body));
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Auth(message),
                _ => ServiceError::Remote(message),
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| ServiceError::Remote(format!("unreadable response envelope: {}", e)))?;

        let text = first_text(&parsed).ok_or_else(|| ServiceError::Remote("no text content in response".into()))?;
        info!("✅ Model returned {} chars (stop_reason: {})", text.len(), parsed.stop_reason.as_deref().unwrap_or("unknown"));
        Ok(text.trim().to_string())
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

fn first_text(resp: &MessagesResponse) -> Option<&str> {
    resp.content.iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text.as_str()),
        ContentBlock::Other => None,
    })
}
