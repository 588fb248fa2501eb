// ABOUTME: OpenAI Responses API client implementing the LlmClient trait
// ABOUTME: Validates wire shapes at this boundary and converts them to tagged response items
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # `OpenAI` Responses Client
//!
//! Concrete [`LlmClient`] over the `OpenAI` Responses API
//! (`POST /v1/responses`). Also works against compatible endpoints by
//! overriding the base URL.
//!
//! ## Configuration
//!
//! - `OPENAI_API_KEY`: API key (required; the assistant is disabled without it)
//! - `JELT_LLM_MODEL`: model identifier (default: `gpt-4o-mini`)
//! - `JELT_LLM_BASE_URL`: API base URL (default: `https://api.openai.com/v1`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use super::{FunctionDeclaration, InputItem, LlmClient, LlmResponse, ResponseItem, ToolCall};
use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult};

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Request timeout
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Responses API request body
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a [InputItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool<'a>>>,
}

/// Function tool definition in Responses API format
#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a serde_json::Value>,
    strict: bool,
}

/// Responses API response body
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<ApiOutputItem>,
}

/// One output item; unknown item types are tolerated and skipped
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ApiOutputItem {
    /// Assistant message containing text parts
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Vec<ApiContentPart>,
    },
    /// Function call requested by the model
    #[serde(rename = "function_call")]
    FunctionCall {
        name: String,
        arguments: String,
        #[serde(default)]
        call_id: Option<String>,
    },
    /// Anything else (reasoning items, refusals, future types)
    #[serde(other)]
    Unknown,
}

/// One content part of a message item
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ApiContentPart {
    /// Text segment
    #[serde(rename = "output_text")]
    OutputText { text: String },
    /// Anything else
    #[serde(other)]
    Unknown,
}

/// API error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the Responses API client
#[derive(Debug, Clone)]
pub struct OpenAiResponsesConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Base URL of the API
    pub base_url: String,
}

impl OpenAiResponsesConfig {
    /// Build from the engine's [`LlmConfig`]
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is set.
    pub fn from_llm_config(config: &LlmConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::config("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
        })
    }
}

// ============================================================================
// Client Implementation
// ============================================================================

/// `OpenAI` Responses API client
pub struct OpenAiResponsesClient {
    config: OpenAiResponsesConfig,
    client: Client,
}

impl OpenAiResponsesClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: OpenAiResponsesConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create a client from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `OPENAI_API_KEY` is not set.
    pub fn from_env() -> AppResult<Self> {
        Self::new(OpenAiResponsesConfig::from_llm_config(&LlmConfig::from_env())?)
    }

    fn api_url(&self) -> String {
        format!("{}/responses", self.config.base_url.trim_end_matches('/'))
    }

    fn convert_tools<'a>(tools: &'a [FunctionDeclaration]) -> Vec<ApiTool<'a>> {
        tools
            .iter()
            .map(|decl| ApiTool {
                tool_type: "function",
                name: &decl.name,
                description: &decl.description,
                parameters: decl.parameters.as_ref(),
                strict: true,
            })
            .collect()
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<ApiErrorResponse>(body)
            .map_or_else(|_| body.chars().take(300).collect(), |e| e.error.message);
        AppError::external_service("OpenAI", format!("API error ({status}): {message}"))
    }

    /// First 500 characters of a response body, safe on multi-byte content
    fn body_preview(body: &str) -> String {
        body.chars().take(500).collect()
    }

    /// Convert wire output items to tagged response items, collecting text
    fn convert_output(output: Vec<ApiOutputItem>) -> LlmResponse {
        let mut items = Vec::with_capacity(output.len());
        let mut text_segments: Vec<String> = Vec::new();

        for item in output {
            match item {
                ApiOutputItem::Message { content } => {
                    for part in content {
                        match part {
                            ApiContentPart::OutputText { text } => {
                                text_segments.push(text.clone());
                                items.push(ResponseItem::OutputText(text));
                            }
                            ApiContentPart::Unknown => {}
                        }
                    }
                }
                ApiOutputItem::FunctionCall {
                    name,
                    arguments,
                    call_id,
                } => {
                    items.push(ResponseItem::FunctionCall(ToolCall {
                        name,
                        arguments,
                        call_id,
                    }));
                }
                ApiOutputItem::Unknown => {
                    debug!("Skipping unrecognized output item type");
                }
            }
        }

        LlmResponse {
            items,
            output_text: text_segments.join(""),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiResponsesClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(skip(self, tools, input), fields(model = %model, input_len = input.len()))]
    async fn create_response(
        &self,
        model: &str,
        tools: &[FunctionDeclaration],
        input: &[InputItem],
    ) -> AppResult<LlmResponse> {
        let request = ResponsesRequest {
            model,
            input,
            tools: if tools.is_empty() {
                None
            } else {
                Some(Self::convert_tools(tools))
            },
        };

        debug!(tool_count = tools.len(), "Sending request to Responses API");

        let response = self
            .client
            .post(self.api_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to OpenAI: {e}");
                if e.is_connect() {
                    AppError::external_service(
                        "OpenAI",
                        format!("Cannot connect to {}", self.config.base_url),
                    )
                } else {
                    AppError::external_service("OpenAI", format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service("OpenAI", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            warn!(status = %status, "OpenAI API returned an error");
            return Err(Self::parse_error_response(status, &body));
        }

        let parsed: ResponsesResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse Responses API body: {e} - {}",
                Self::body_preview(&body)
            );
            AppError::external_service("OpenAI", format!("Failed to parse response: {e}"))
        })?;

        Ok(Self::convert_output(parsed.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_output_text_only() {
        let output = vec![ApiOutputItem::Message {
            content: vec![ApiContentPart::OutputText {
                text: "Hola, ¿en qué te ayudo?".into(),
            }],
        }];
        let response = OpenAiResponsesClient::convert_output(output);
        assert_eq!(response.output_text, "Hola, ¿en qué te ayudo?");
        assert!(response.tool_calls().is_empty());
    }

    #[test]
    fn test_convert_output_with_function_call() {
        let output = vec![
            ApiOutputItem::Unknown,
            ApiOutputItem::FunctionCall {
                name: "get_low_stock_articles".into(),
                arguments: "{\"limit\":5}".into(),
                call_id: Some("call_abc".into()),
            },
        ];
        let response = OpenAiResponsesClient::convert_output(output);
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_low_stock_articles");
        assert_eq!(calls[0].call_id.as_deref(), Some("call_abc"));
        assert!(response.output_text.is_empty());
    }

    #[test]
    fn test_body_preview_respects_char_boundaries() {
        // 200 three-byte chars: 600 bytes, byte 500 lands mid-character
        let body = "€".repeat(200);
        let preview = OpenAiResponsesClient::body_preview(&body);
        assert_eq!(preview.chars().count(), 200);

        let long = "a".repeat(800);
        assert_eq!(OpenAiResponsesClient::body_preview(&long).len(), 500);
    }

    #[test]
    fn test_parse_wire_output_item() {
        let json = r#"{"type":"function_call","name":"create_category","arguments":"{}","call_id":"c1"}"#;
        let item: ApiOutputItem = serde_json::from_str(json).unwrap();
        assert!(matches!(item, ApiOutputItem::FunctionCall { .. }));

        let json = r#"{"type":"reasoning","summary":[]}"#;
        let item: ApiOutputItem = serde_json::from_str(json).unwrap();
        assert!(matches!(item, ApiOutputItem::Unknown));
    }
}
