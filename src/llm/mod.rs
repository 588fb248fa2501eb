// ABOUTME: LLM client abstraction for pluggable language-model integration
// ABOUTME: Message, tool-call and tool-schema types plus the LlmClient trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # LLM Client Interface
//!
//! The contract an external language model must satisfy to drive the
//! assistant's tool-calling loop. Tool-call and text items are tagged
//! variants rather than loose JSON; adapters validate wire shapes at this
//! boundary so the loop never inspects untyped objects.
//!
//! ## Example: driving a client
//!
//! ```rust,no_run
//! use jelt_assistant::llm::{ChatMessage, InputItem, LlmClient};
//!
//! async fn example(client: &dyn LlmClient) {
//!     let input = vec![InputItem::from(ChatMessage::user("¿Qué artículos tienen bajo stock?"))];
//!     let response = client.create_response("gpt-4o-mini", &[], &input).await;
//! }
//! ```

mod openai;

pub use openai::{OpenAiResponsesClient, OpenAiResponsesConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls and storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a stored role string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Tool Types
// ============================================================================

/// A structured request to invoke one named tool
///
/// Arguments are kept as the raw JSON string the model produced; the
/// dispatcher parses them tolerantly. `call_id` correlates the eventual
/// tool output with this call across loop rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// Arguments as a raw JSON object string
    pub arguments: String,
    /// Correlation id assigned by the model, if any
    pub call_id: Option<String>,
}

impl ToolCall {
    /// Create a tool call with no correlation id (deterministic dispatch)
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
            call_id: None,
        }
    }
}

/// Declaration of one callable tool, sent to the model with every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// Parameters schema (JSON Schema format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

// ============================================================================
// Input / Output Items
// ============================================================================

/// One item of the input list sent to the model
///
/// Serializes to the Responses API item format: plain role/content messages,
/// echoed tool calls, and synthesized tool outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    /// An ordinary conversation message
    Message {
        /// Sender role
        role: MessageRole,
        /// Message text
        content: String,
    },
    /// A tool call previously requested by the model, echoed back
    FunctionCall {
        /// Tool name
        name: String,
        /// Raw JSON arguments string
        arguments: String,
        /// Correlation id
        #[serde(skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
    },
    /// The result of executing a tool call
    FunctionCallOutput {
        /// Correlation id of the originating call
        #[serde(skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
        /// Tool result serialized as JSON text
        output: String,
    },
}

impl From<ChatMessage> for InputItem {
    fn from(message: ChatMessage) -> Self {
        Self::Message {
            role: message.role,
            content: message.content,
        }
    }
}

impl From<&ToolCall> for InputItem {
    fn from(call: &ToolCall) -> Self {
        Self::FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            call_id: call.call_id.clone(),
        }
    }
}

/// One item of the model's response
#[derive(Debug, Clone)]
pub enum ResponseItem {
    /// A text segment of the final answer
    OutputText(String),
    /// A tool invocation the model wants executed
    FunctionCall(ToolCall),
}

/// A complete model response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// All response items in model order
    pub items: Vec<ResponseItem>,
    /// Concatenated text of all text segments
    pub output_text: String,
}

impl LlmResponse {
    /// The tool calls requested in this response, in model order
    #[must_use]
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ResponseItem::FunctionCall(call) => Some(call),
                ResponseItem::OutputText(_) => None,
            })
            .collect()
    }
}

// ============================================================================
// Client Trait
// ============================================================================

/// External language-model client
///
/// Implement this trait to plug a model into the assistant. The engine
/// drives it through a bounded tool-calling loop; each call is one round.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Unique client identifier (e.g. "openai")
    fn name(&self) -> &'static str;

    /// Send the input list plus tool schema, returning the model's response
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// understood.
    async fn create_response(
        &self,
        model: &str,
        tools: &[FunctionDeclaration],
        input: &[InputItem],
    ) -> AppResult<LlmResponse>;
}
