//! OpenAI-compatible reasoning backend.
//!
//! Works with OpenAI, OpenRouter, DashScope, Ollama, vLLM, and any other
//! endpoint that speaks the `/v1/chat/completions` wire format, including
//! tool use / function calling.

use async_trait::async_trait;
use reagent_core::backend::{Reasoning, ReasoningBackend};
use reagent_core::error::BackendError;
use reagent_core::message::{Conversation, Message, MessageToolCall, Role};
use reagent_core::tool::ToolDefinition;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// An OpenAI-compatible reasoning backend.
pub struct OpenAiCompatBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| BackendError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            client,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Convert conversation messages to the OpenAI API format, with the
    /// system prompt injected as the first message.
    fn to_api_messages(conversation: &Conversation, system_prompt: &str) -> Vec<serde_json::Value> {
        let mut api_messages = Vec::with_capacity(conversation.len() + 1);
        if !system_prompt.is_empty() {
            api_messages.push(json!({ "role": "system", "content": system_prompt }));
        }
        for m in &conversation.messages {
            api_messages.push(Self::to_api_message(m));
        }
        api_messages
    }

    fn to_api_message(m: &Message) -> serde_json::Value {
        let role = match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        };
        let mut msg = json!({ "role": role, "content": m.content });
        if !m.tool_calls.is_empty() {
            msg["tool_calls"] = json!(
                m.tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": { "name": tc.name, "arguments": tc.arguments }
                        })
                    })
                    .collect::<Vec<_>>()
            );
        }
        if let Some(id) = &m.tool_call_id {
            msg["tool_call_id"] = json!(id);
        }
        msg
    }

    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters
                    }
                })
            })
            .collect()
    }
}

#[async_trait]
impl ReasoningBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reason(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Reasoning, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": Self::to_api_messages(conversation, system_prompt),
            "temperature": self.temperature,
            "stream": false,
        });
        if !tools.is_empty() {
            body["tools"] = json!(Self::to_api_tools(tools));
        }

        debug!(backend = %self.name, model = %self.model, "sending reasoning request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(e.to_string())
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(BackendError::RateLimited {
                retry_after_secs: retry_after_secs(response.headers()),
            });
        }
        if status == 401 || status == 403 {
            return Err(BackendError::AuthenticationFailed(
                "invalid API key or insufficient permissions".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "backend returned error");
            return Err(BackendError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(format!("failed to parse: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::MalformedResponse("no choices in response".into()))?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        Ok(Reasoning {
            reply: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Seconds to wait per the `Retry-After` response header, or the default
/// when the header is absent or not delay-seconds form.
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

// ── Wire format ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Deserialize)]
struct ApiToolCall {
    id: String,
    function: ApiFunction,
}

#[derive(Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_is_the_first_api_message() {
        let mut conv = Conversation::new();
        conv.push(Message::user("hello"));

        let api = OpenAiCompatBackend::to_api_messages(&conv, "You are helpful.");
        assert_eq!(api.len(), 2);
        assert_eq!(api[0]["role"], "system");
        assert_eq!(api[1]["role"], "user");
    }

    #[test]
    fn assistant_tool_calls_are_carried_on_the_wire() {
        let mut msg = Message::assistant("using a tool");
        msg.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: r#"{"query":"rust"}"#.into(),
        }];

        let api = OpenAiCompatBackend::to_api_message(&msg);
        assert_eq!(api["tool_calls"][0]["function"]["name"], "web_search");
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("call_9", "file_read", "contents");
        let api = OpenAiCompatBackend::to_api_message(&msg);
        assert_eq!(api["role"], "tool");
        assert_eq!(api["tool_call_id"], "call_9");
    }

    #[test]
    fn retry_after_header_overrides_the_default() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert_eq!(retry_after_secs(&headers), 30);
    }

    #[test]
    fn missing_or_http_date_retry_after_falls_back() {
        let headers = reqwest::header::HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), DEFAULT_RETRY_AFTER_SECS);

        // HTTP-date form is not delay-seconds; keep the default.
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::RETRY_AFTER,
            "Wed, 21 Oct 2026 07:28:00 GMT".parse().unwrap(),
        );
        assert_eq!(retry_after_secs(&headers), DEFAULT_RETRY_AFTER_SECS);
    }

    #[test]
    fn response_parses_tool_calls() {
        let raw = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "doTerminate", "arguments": "{}" }
                    }]
                }
            }]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        let choice = &parsed.choices[0];
        let calls = choice.message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "doTerminate");
    }
}
