// ABOUTME: Database layer for assistant conversation persistence
// ABOUTME: SQLite-backed store for conversations, messages and pending actions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! Conversation persistence

mod conversations;

pub use conversations::{
    ConversationMessage, ConversationRecord, ConversationStore, MAX_HISTORY_MESSAGES,
};
