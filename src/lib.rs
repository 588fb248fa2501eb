// ABOUTME: Main library entry point for the Jelt inventory assistant engine
// ABOUTME: Conversation persistence, deterministic creation flows and the LLM tool loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

#![deny(unsafe_code)]

//! # Jelt Assistant
//!
//! The conversation and tool-orchestration engine behind the Jelt inventory
//! assistant. Users ask inventory questions in Spanish; the engine keeps a
//! persistent multi-turn conversation per user, resolves entity-creation
//! requests deterministically, and drives an LLM through a bounded
//! tool-calling loop for everything else.
//!
//! ## Features
//!
//! - **Persistent conversations**: SQLite-backed history with a per-turn
//!   context window and at most one staged pending action
//! - **Deterministic creation flows**: fixed Spanish phrase lists stage
//!   `create_category` / `create_stockroom` / `create_supplier` actions and
//!   collect their required fields without any model call
//! - **Bounded tool loop**: up to three model rounds per turn, dispatching
//!   thirteen inventory tools scoped to the authenticated user
//! - **Pluggable model**: any [`llm::LlmClient`] implementation works; an
//!   `OpenAI` Responses API client ships in the crate
//!
//! ## Architecture
//!
//! - **`config`**: environment-driven LLM settings and the fixed prompts
//! - **`database`**: conversation and message storage
//! - **`models`** / **`repositories`**: flattened domain records and the
//!   trait seams to the surrounding application's inventory storage
//! - **`llm`**: the model client boundary and its `OpenAI` implementation
//! - **`tools`**: tool schema and the dispatcher that executes calls
//! - **`services`**: the orchestrating chat service and its deterministic
//!   pending-action helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use jelt_assistant::config::{AssistantPrompts, LlmConfig};
//! use jelt_assistant::database::ConversationStore;
//! use jelt_assistant::errors::AppResult;
//! use jelt_assistant::llm::{LlmClient, OpenAiResponsesClient};
//! use jelt_assistant::services::{AssistantService, ChatTurn};
//! use jelt_assistant::tools::ToolDispatcher;
//!
//! async fn example(
//!     pool: sqlx::SqlitePool,
//!     dispatcher: ToolDispatcher,
//!     user_id: uuid::Uuid,
//! ) -> AppResult<()> {
//!     let config = LlmConfig::from_env();
//!     let llm: Option<Arc<dyn LlmClient>> = if config.is_enabled() {
//!         Some(Arc::new(OpenAiResponsesClient::from_env()?))
//!     } else {
//!         None
//!     };
//!
//!     let store = ConversationStore::new(pool);
//!     store.migrate().await?;
//!
//!     let service = AssistantService::new(
//!         store,
//!         dispatcher,
//!         llm,
//!         config.model,
//!         AssistantPrompts::default(),
//!     );
//!
//!     let outcome = service
//!         .chat(ChatTurn {
//!             message: "¿Qué artículos tienen bajo stock?".into(),
//!             user_id: Some(user_id),
//!             conversation_id: None,
//!         })
//!         .await?;
//!     println!("{}", outcome.reply);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;
pub mod tools;
