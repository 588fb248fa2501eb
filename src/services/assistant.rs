// ABOUTME: Assistant chat orchestration over conversations, pending actions and the LLM
// ABOUTME: Deterministic creation flows short-circuit; everything else runs the bounded tool loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # Assistant Service
//!
//! One entry point, [`AssistantService::chat`], processes a user turn:
//!
//! 1. Guard rails: a missing LLM client or an unauthenticated turn returns a
//!    fixed reply without touching storage.
//! 2. The turn's conversation is resolved (or created) and the user message
//!    persisted.
//! 3. With no pending action, a recognized creation phrase stages one and
//!    asks for its required fields.
//! 4. With a pending action, a short answer merges into the staged payload;
//!    a complete payload dispatches the creation tool directly. The LLM is
//!    never consulted for these turns.
//! 5. Otherwise the recent history plus the new message go through a bounded
//!    tool-calling loop against the model.
//! 6. The assistant reply is persisted with the tools it used.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::AssistantPrompts;
use crate::database::{ConversationStore, MAX_HISTORY_MESSAGES};
use crate::errors::AppResult;
use crate::llm::{ChatMessage, InputItem, LlmClient, MessageRole, ResponseItem, ToolCall};
use crate::models::PendingAction;
use crate::services::pending;
use crate::tools::{assistant_tools, ToolDispatcher};

/// Maximum LLM rounds per turn; each round may request several tools
pub const MAX_TOOL_ROUNDS: usize = 3;

// ============================================================================
// Turn Types
// ============================================================================

/// One incoming user turn
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// The user's message text
    pub message: String,
    /// Authenticated user, when the surrounding layer established one
    pub user_id: Option<Uuid>,
    /// Conversation to continue; `None` starts a new one
    pub conversation_id: Option<String>,
}

/// The assistant's answer to one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    /// Reply text shown to the user
    pub reply: String,
    /// Distinct tools used this turn, in first-use order
    pub used_tools: Vec<String>,
    /// Conversation the turn was recorded in; `None` when nothing persisted
    pub conversation_id: Option<String>,
}

impl ChatOutcome {
    fn detached(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            used_tools: Vec::new(),
            conversation_id: None,
        }
    }
}

struct LoopResult {
    reply: String,
    used_tools: Vec<String>,
}

// ============================================================================
// Service
// ============================================================================

/// Conversation and tool-orchestration engine
pub struct AssistantService {
    store: ConversationStore,
    dispatcher: ToolDispatcher,
    llm: Option<Arc<dyn LlmClient>>,
    model: String,
    prompts: AssistantPrompts,
}

impl AssistantService {
    /// Create the service
    ///
    /// Pass `llm: None` to run with the assistant disabled; deterministic
    /// guard replies still work, nothing else does.
    #[must_use]
    pub fn new(
        store: ConversationStore,
        dispatcher: ToolDispatcher,
        llm: Option<Arc<dyn LlmClient>>,
        model: impl Into<String>,
        prompts: AssistantPrompts,
    ) -> Self {
        Self {
            store,
            dispatcher,
            llm,
            model: model.into(),
            prompts,
        }
    }

    /// Process one user turn
    ///
    /// # Errors
    ///
    /// Returns an error when storage, a repository or the model fails.
    /// Domain-level outcomes (disabled assistant, missing fields, exhausted
    /// rounds) are regular replies, not errors.
    #[instrument(skip(self, turn), fields(conversation_id = ?turn.conversation_id))]
    pub async fn chat(&self, turn: ChatTurn) -> AppResult<ChatOutcome> {
        let Some(llm) = self.llm.as_ref() else {
            return Ok(ChatOutcome::detached(self.prompts.disabled_reply.clone()));
        };

        let Some(user_id) = turn.user_id else {
            return Ok(ChatOutcome::detached(
                self.prompts.not_authenticated_reply.clone(),
            ));
        };

        let user_key = user_id.to_string();
        let conversation = self
            .store
            .get_or_create_conversation(&user_key, turn.conversation_id.as_deref())
            .await?;

        self.store
            .add_message(&conversation.id, MessageRole::User, &turn.message, None)
            .await?;

        // Creation phrases resolve deterministically; the model never sees them
        if conversation.pending.is_none() {
            if let Some(action) = pending::detect_create_intent(&turn.message) {
                let staged = PendingAction::start(action);
                let reply = pending::build_missing_fields_question(action, &staged.required);
                self.store.set_pending(&conversation.id, Some(&staged)).await?;
                return self
                    .finish_turn(&conversation.id, reply, Vec::new())
                    .await;
            }
        }

        if let Some(staged) = conversation.pending.as_ref() {
            if let Some(merged) =
                pending::merge_pending_payload(&staged.payload, &turn.message, &staged.required)
            {
                let missing = pending::compute_missing_fields(staged.action, &merged);

                if missing.is_empty() {
                    let call = ToolCall::new(
                        staged.action.as_str(),
                        serde_json::Value::Object(merged).to_string(),
                    );
                    let result = self.dispatcher.execute(&call, user_id).await?;
                    self.store.set_pending(&conversation.id, None).await?;

                    let reply = pending::build_reply_from_tool(staged.action, &result);
                    let used = vec![staged.action.as_str().to_owned()];
                    return self.finish_turn(&conversation.id, reply, used).await;
                }

                let updated = PendingAction {
                    action: staged.action,
                    payload: merged,
                    required: missing.clone(),
                };
                self.store.set_pending(&conversation.id, Some(&updated)).await?;

                let reply = pending::build_missing_fields_question(staged.action, &missing);
                return self
                    .finish_turn(&conversation.id, reply, Vec::new())
                    .await;
            }
        }

        let input = self.build_llm_input(&conversation.id, &turn.message).await?;
        let result = self.run_llm_with_tools(llm.as_ref(), input, user_id).await?;

        self.finish_turn(&conversation.id, result.reply, result.used_tools)
            .await
    }

    /// Persist the assistant reply and close out the turn
    async fn finish_turn(
        &self,
        conversation_id: &str,
        reply: String,
        used_tools: Vec<String>,
    ) -> AppResult<ChatOutcome> {
        self.store
            .add_message(
                conversation_id,
                MessageRole::Assistant,
                &reply,
                Some(&used_tools),
            )
            .await?;

        Ok(ChatOutcome {
            reply,
            used_tools,
            conversation_id: Some(conversation_id.to_owned()),
        })
    }

    /// Assemble system instructions, recent history and the new user message
    async fn build_llm_input(
        &self,
        conversation_id: &str,
        user_message: &str,
    ) -> AppResult<Vec<InputItem>> {
        let history = self
            .store
            .get_recent_messages(conversation_id, MAX_HISTORY_MESSAGES)
            .await?;

        debug!(
            conversation_id,
            history_count = history.len(),
            "assistant input context"
        );

        // The turn's user message was already persisted; drop its trailing
        // copy so it appears exactly once in the input
        let mut history = history;
        if history
            .last()
            .is_some_and(|m| m.role == MessageRole::User.as_str() && m.content == user_message)
        {
            history.pop();
        }

        let mut input = Vec::with_capacity(history.len() + 2);
        input.push(InputItem::from(ChatMessage::system(
            self.prompts.system_instructions.clone(),
        )));

        for message in history {
            let Some(role) = MessageRole::parse(&message.role) else {
                warn!(role = %message.role, "Skipping message with unknown role");
                continue;
            };
            input.push(InputItem::Message {
                role,
                content: message.content,
            });
        }

        input.push(InputItem::from(ChatMessage::user(user_message)));
        Ok(input)
    }

    /// Drive the bounded tool-calling loop against the model
    ///
    /// Each round sends the accumulated input; requested tools run
    /// sequentially and their outputs join the input for the next round. A
    /// round with no tool calls ends the loop with the model's text. When
    /// the round budget runs out, the fixed fallback reply is returned and
    /// no tools are reported.
    async fn run_llm_with_tools(
        &self,
        llm: &dyn LlmClient,
        mut input: Vec<InputItem>,
        user_id: Uuid,
    ) -> AppResult<LoopResult> {
        let tools = assistant_tools();
        let mut used_tools: Vec<String> = Vec::new();

        for round in 0..MAX_TOOL_ROUNDS {
            let response = llm.create_response(&self.model, &tools, &input).await?;
            let calls: Vec<ToolCall> = response.tool_calls().into_iter().cloned().collect();

            if calls.is_empty() {
                return Ok(LoopResult {
                    reply: response.output_text,
                    used_tools,
                });
            }

            debug!(round, call_count = calls.len(), "Model requested tools");

            // Echo the model's output back before appending tool results
            for item in &response.items {
                match item {
                    ResponseItem::OutputText(text) => {
                        input.push(InputItem::Message {
                            role: MessageRole::Assistant,
                            content: text.clone(),
                        });
                    }
                    ResponseItem::FunctionCall(call) => input.push(InputItem::from(call)),
                }
            }

            for call in &calls {
                if !used_tools.iter().any(|t| t == &call.name) {
                    used_tools.push(call.name.clone());
                }

                let normalized = normalize_call(call);
                let output = self.dispatcher.execute(&normalized, user_id).await?;

                input.push(InputItem::FunctionCallOutput {
                    call_id: call.call_id.clone(),
                    output: output.to_string(),
                });
            }
        }

        warn!("Tool round budget exhausted without a final answer");
        Ok(LoopResult {
            reply: self.prompts.exhausted_reply.clone(),
            used_tools: Vec::new(),
        })
    }
}

/// Replace malformed argument JSON with a parse-error marker object
///
/// The dispatcher then runs the tool on defaults (queries) or reports the
/// missing fields (creations) instead of failing the whole turn.
fn normalize_call(call: &ToolCall) -> ToolCall {
    if call.arguments.trim().is_empty() {
        return ToolCall {
            arguments: "{}".to_owned(),
            ..call.clone()
        };
    }

    match serde_json::from_str::<serde_json::Value>(&call.arguments) {
        Ok(serde_json::Value::Object(_)) => call.clone(),
        _ => ToolCall {
            arguments: json!({ "__parse_error": true, "raw": call.arguments }).to_string(),
            ..call.clone()
        },
    }
}
