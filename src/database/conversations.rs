// ABOUTME: Database operations for assistant conversations and messages
// ABOUTME: Handles per-user conversation CRUD, message history and pending-action state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::llm::MessageRole;
use crate::models::{PendingAction, PendingActionKind};

/// How many recent messages are loaded as LLM context per turn
/// (six user/assistant exchange pairs)
pub const MAX_HISTORY_MESSAGES: i64 = 12;

// ============================================================================
// Record Types
// ============================================================================

/// Stored representation of an assistant conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Unique conversation ID
    pub id: String,
    /// User who owns the conversation; conversations are never shared
    pub user_id: String,
    /// In-progress action awaiting fields, if any
    pub pending: Option<PendingAction>,
    /// When the conversation was created (ISO 8601)
    pub created_at: String,
    /// When the conversation was last updated (ISO 8601)
    pub updated_at: String,
}

/// Stored representation of one conversation message
///
/// Messages are immutable once created and ordered by creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message ID
    pub id: String,
    /// Conversation this message belongs to
    pub conversation_id: String,
    /// Role of the sender (system, user, assistant)
    pub role: String,
    /// Message content
    pub content: String,
    /// Names of tools used to produce this message, if any
    pub used_tools: Option<Vec<String>>,
    /// When the message was created (ISO 8601)
    pub created_at: String,
}

// ============================================================================
// Conversation Store
// ============================================================================

/// Conversation database operations
pub struct ConversationStore {
    pool: SqlitePool,
}

impl ConversationStore {
    /// Create a new store over a SQLite pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the conversation tables if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS assistant_conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                pending_action TEXT,
                pending_payload TEXT,
                pending_required TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversations table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS assistant_messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL
                    REFERENCES assistant_conversations(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                used_tools TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create messages table: {e}")))?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_assistant_messages_conversation
            ON assistant_messages(conversation_id, created_at)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create message index: {e}")))?;

        Ok(())
    }

    // ========================================================================
    // Conversation Operations
    // ========================================================================

    /// Create a new conversation for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_conversation(&self, user_id: &str) -> AppResult<ConversationRecord> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO assistant_conversations
                (id, user_id, pending_action, pending_payload, pending_required, created_at, updated_at)
            VALUES ($1, $2, NULL, NULL, NULL, $3, $3)
            ",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?;

        Ok(ConversationRecord {
            id,
            user_id: user_id.to_owned(),
            pending: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a conversation by ID, scoped to its owning user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_conversation(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<Option<ConversationRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, pending_action, pending_payload, pending_required,
                   created_at, updated_at
            FROM assistant_conversations
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?;

        row.map(|r| {
            Ok(ConversationRecord {
                id: r.get("id"),
                user_id: r.get("user_id"),
                pending: Self::decode_pending(
                    r.get("pending_action"),
                    r.get("pending_payload"),
                    r.get("pending_required"),
                )?,
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
        })
        .transpose()
    }

    /// Resolve the conversation for a turn
    ///
    /// A supplied ID that does not exist or belongs to another user falls
    /// back to a fresh conversation rather than failing the turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_or_create_conversation(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
    ) -> AppResult<ConversationRecord> {
        if let Some(id) = conversation_id {
            if let Some(conversation) = self.get_conversation(id, user_id).await? {
                return Ok(conversation);
            }
        }
        self.create_conversation(user_id).await
    }

    /// Set or clear the conversation's pending action
    ///
    /// Clearing nulls all three pending columns in a single statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn set_pending(
        &self,
        conversation_id: &str,
        pending: Option<&PendingAction>,
    ) -> AppResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let (action, payload, required) = match pending {
            Some(p) => (
                Some(p.action.as_str()),
                Some(
                    serde_json::to_string(&p.payload)
                        .map_err(|e| AppError::internal(format!("Failed to encode payload: {e}")))?,
                ),
                Some(
                    serde_json::to_string(&p.required)
                        .map_err(|e| AppError::internal(format!("Failed to encode required: {e}")))?,
                ),
            ),
            None => (None, None, None),
        };

        sqlx::query(
            r"
            UPDATE assistant_conversations
            SET pending_action = $1, pending_payload = $2, pending_required = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(action)
        .bind(payload)
        .bind(required)
        .bind(&now)
        .bind(conversation_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to set pending action: {e}")))?;

        Ok(())
    }

    // ========================================================================
    // Message Operations
    // ========================================================================

    /// Append a message to a conversation
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn add_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str,
        used_tools: Option<&[String]>,
    ) -> AppResult<ConversationMessage> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let used_tools_json = used_tools
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AppError::internal(format!("Failed to encode used tools: {e}")))?;

        // Message append and conversation touch commit together
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO assistant_messages (id, conversation_id, role, content, used_tools, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&id)
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&used_tools_json)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add message: {e}")))?;

        sqlx::query(
            r"
            UPDATE assistant_conversations
            SET updated_at = $1
            WHERE id = $2
            ",
        )
        .bind(&now)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to touch conversation: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit message: {e}")))?;

        Ok(ConversationMessage {
            id,
            conversation_id: conversation_id.to_owned(),
            role: role.as_str().to_owned(),
            content: content.to_owned(),
            used_tools: used_tools.map(<[String]>::to_vec),
            created_at: now,
        })
    }

    /// Get the last N messages of a conversation in chronological order
    ///
    /// Fetched newest-first then reversed, so the window always holds the
    /// most recent messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_recent_messages(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> AppResult<Vec<ConversationMessage>> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, used_tools, created_at
            FROM assistant_messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recent messages: {e}")))?;

        let mut messages = rows
            .into_iter()
            .map(Self::row_to_message)
            .collect::<AppResult<Vec<_>>>()?;
        messages.reverse();

        Ok(messages)
    }

    /// Get all messages of a conversation in chronological order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_messages(&self, conversation_id: &str) -> AppResult<Vec<ConversationMessage>> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, used_tools, created_at
            FROM assistant_messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        rows.into_iter().map(Self::row_to_message).collect()
    }

    // ========================================================================
    // Row Decoding
    // ========================================================================

    fn row_to_message(row: sqlx::sqlite::SqliteRow) -> AppResult<ConversationMessage> {
        let used_tools: Option<String> = row.get("used_tools");
        let used_tools = used_tools
            .map(|json| serde_json::from_str::<Vec<String>>(&json))
            .transpose()
            .map_err(|e| AppError::internal(format!("Corrupt used_tools column: {e}")))?;

        Ok(ConversationMessage {
            id: row.get("id"),
            conversation_id: row.get("conversation_id"),
            role: row.get("role"),
            content: row.get("content"),
            used_tools,
            created_at: row.get("created_at"),
        })
    }

    fn decode_pending(
        action: Option<String>,
        payload: Option<String>,
        required: Option<String>,
    ) -> AppResult<Option<PendingAction>> {
        let Some(action) = action else {
            return Ok(None);
        };

        let kind = PendingActionKind::parse(&action)
            .ok_or_else(|| AppError::internal(format!("Unknown pending action: {action}")))?;

        let payload = payload
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| AppError::internal(format!("Corrupt pending_payload column: {e}")))?
            .unwrap_or_default();

        let required = required
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| AppError::internal(format!("Corrupt pending_required column: {e}")))?
            .unwrap_or_default();

        Ok(Some(PendingAction {
            action: kind,
            payload,
            required,
        }))
    }
}
