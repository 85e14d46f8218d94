use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::constants::{DEFAULT_CHAT_MAX_TOKENS, DEFAULT_CHAT_MODEL, DEFAULT_CHAT_TEMPERATURE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body accepted by `POST /api/chat`. Missing tuning fields take defaults.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChatProxyRequest {
    pub model: Option<String>,
    #[validate(length(min = 1, message = "messages must not be empty"))]
    pub messages: Vec<ChatMessage>,
    #[validate(range(min = 1, max = 4096))]
    pub max_tokens: Option<u32>,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f32>,
}

/// Request forwarded to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatCompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            messages,
            max_tokens: DEFAULT_CHAT_MAX_TOKENS,
            temperature: DEFAULT_CHAT_TEMPERATURE,
        }
    }
}

impl From<ChatProxyRequest> for ChatCompletionRequest {
    fn from(req: ChatProxyRequest) -> Self {
        ChatCompletionRequest {
            model: req
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            messages: req.messages,
            max_tokens: req.max_tokens.unwrap_or(DEFAULT_CHAT_MAX_TOKENS),
            temperature: req.temperature.unwrap_or(DEFAULT_CHAT_TEMPERATURE),
        }
    }
}
