// ABOUTME: End-to-end tests for the assistant chat service
// ABOUTME: Covers guard replies, deterministic creation flows and the bounded tool loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{
    migrated_store, sample_article, service_with, text_response, tool_call_response, FakeHistory,
    InMemoryInventory, ScriptedLlm,
};
use jelt_assistant::database::ConversationStore;
use jelt_assistant::llm::InputItem;
use jelt_assistant::models::PendingActionKind;
use jelt_assistant::services::ChatTurn;
use uuid::Uuid;

fn turn(message: &str, user_id: Option<Uuid>, conversation_id: Option<String>) -> ChatTurn {
    ChatTurn {
        message: message.to_owned(),
        user_id,
        conversation_id,
    }
}

// ============================================================================
// Guard Rail Tests
// ============================================================================

#[tokio::test]
async fn test_disabled_assistant_replies_without_persisting() {
    let (store, pool) = migrated_store().await;
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        None,
    );

    let outcome = service
        .chat(turn("hola", Some(Uuid::new_v4()), None))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "El asistente de IA está deshabilitado.");
    assert!(outcome.used_tools.is_empty());
    assert!(outcome.conversation_id.is_none());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assistant_conversations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_unauthenticated_turn_replies_without_persisting() {
    let (store, pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );

    let outcome = service.chat(turn("hola", None, None)).await.unwrap();

    assert_eq!(outcome.reply, "No estás autenticado.");
    assert!(outcome.conversation_id.is_none());
    assert_eq!(llm.call_count(), 0);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assistant_messages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// ============================================================================
// Deterministic Creation Flow Tests
// ============================================================================

#[tokio::test]
async fn test_stockroom_creation_phrase_stages_pending_and_asks() {
    let (store, pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );
    let user_id = Uuid::new_v4();

    let outcome = service
        .chat(turn("Crea un almacén", Some(user_id), None))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "¿Cuál es el nombre del almacén que deseas crear?");
    assert!(outcome.used_tools.is_empty());
    let conversation_id = outcome.conversation_id.expect("turn should persist");

    // the model was never consulted
    assert_eq!(llm.call_count(), 0);

    let inspector = ConversationStore::new(pool);
    let conversation = inspector
        .get_conversation(&conversation_id, &user_id.to_string())
        .await
        .unwrap()
        .unwrap();
    let pending = conversation.pending.expect("pending should be staged");
    assert_eq!(pending.action, PendingActionKind::CreateStockroom);
    assert_eq!(pending.required, ["name"]);
}

#[tokio::test]
async fn test_short_follow_up_completes_stockroom_creation() {
    let (store, pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let inventory = Arc::new(InMemoryInventory::default());
    let service = service_with(
        store,
        inventory.clone(),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );
    let user_id = Uuid::new_v4();

    let first = service
        .chat(turn("Crea un almacén", Some(user_id), None))
        .await
        .unwrap();
    let conversation_id = first.conversation_id.unwrap();

    let second = service
        .chat(turn("Bodega Norte", Some(user_id), Some(conversation_id.clone())))
        .await
        .unwrap();

    assert_eq!(second.reply, "He creado el almacén \"Bodega Norte\".");
    assert_eq!(second.used_tools, ["create_stockroom"]);
    assert_eq!(second.conversation_id.as_deref(), Some(conversation_id.as_str()));
    assert_eq!(llm.call_count(), 0);

    let stockrooms = inventory.stockrooms.lock().unwrap().clone();
    assert_eq!(stockrooms.len(), 1);
    assert_eq!(stockrooms[0].name, "Bodega Norte");

    let inspector = ConversationStore::new(pool);
    let conversation = inspector
        .get_conversation(&conversation_id, &user_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert!(conversation.pending.is_none(), "pending should be cleared");
}

#[tokio::test]
async fn test_supplier_flow_merges_name_and_nit() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let inventory = Arc::new(InMemoryInventory::default());
    let service = service_with(
        store,
        inventory.clone(),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );
    let user_id = Uuid::new_v4();

    let first = service
        .chat(turn("Registra un proveedor", Some(user_id), None))
        .await
        .unwrap();
    assert_eq!(
        first.reply,
        "Para crear el proveedor necesito el nombre y el NIT. ¿Me los indicas?"
    );
    let conversation_id = first.conversation_id.unwrap();

    let second = service
        .chat(turn("Acme 900111222", Some(user_id), Some(conversation_id)))
        .await
        .unwrap();

    assert_eq!(second.reply, "He creado el proveedor \"Acme\".");
    assert_eq!(second.used_tools, ["create_supplier"]);

    let suppliers = inventory.suppliers.lock().unwrap().clone();
    assert_eq!(suppliers[0].name, "Acme");
    assert_eq!(suppliers[0].nit, "900111222");
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_category_flow_asks_exact_question() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm),
    );

    let outcome = service
        .chat(turn("crear categoría", Some(Uuid::new_v4()), None))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "¿Cuál es el nombre de la categoría que deseas crear?");
}

#[tokio::test]
async fn test_long_follow_up_falls_through_to_llm() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![text_response(
        "Claro, te muestro el inventario.",
    )]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );
    let user_id = Uuid::new_v4();

    let first = service
        .chat(turn("Crea un almacén", Some(user_id), None))
        .await
        .unwrap();
    let conversation_id = first.conversation_id.unwrap();

    // not a short answer; the staged action stays and the model answers
    let second = service
        .chat(turn(
            "mejor olvídalo y dime qué artículos tienen bajo stock en este momento",
            Some(user_id),
            Some(conversation_id),
        ))
        .await
        .unwrap();

    assert_eq!(second.reply, "Claro, te muestro el inventario.");
    assert_eq!(llm.call_count(), 1);
}

// ============================================================================
// Tool Loop Tests
// ============================================================================

#[tokio::test]
async fn test_tool_loop_executes_and_feeds_back_results() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![
        tool_call_response("get_low_stock_articles", r#"{"limit": 5}"#, "call_1"),
        text_response("Tienes 1 artículo con bajo stock: Amoxicilina 500mg."),
    ]));
    let inventory = Arc::new(InMemoryInventory::with_articles(vec![sample_article(
        "AMX-500",
        "Amoxicilina 500mg",
        10,
        Some(30),
    )]));
    let service = service_with(
        store,
        inventory,
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );

    let outcome = service
        .chat(turn(
            "¿Qué artículos tienen bajo stock?",
            Some(Uuid::new_v4()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Tienes 1 artículo con bajo stock: Amoxicilina 500mg.");
    assert_eq!(outcome.used_tools, ["get_low_stock_articles"]);
    assert_eq!(llm.call_count(), 2);

    // second round carries the echoed call and its output
    let second_input = llm.request(1);
    assert!(second_input.iter().any(|item| matches!(
        item,
        InputItem::FunctionCall { name, .. } if name == "get_low_stock_articles"
    )));
    let output = second_input
        .iter()
        .find_map(|item| match item {
            InputItem::FunctionCallOutput { call_id, output } => {
                Some((call_id.clone(), output.clone()))
            }
            _ => None,
        })
        .expect("tool output should be echoed");
    assert_eq!(output.0.as_deref(), Some("call_1"));
    assert!(output.1.contains("AMX-500"));
}

#[tokio::test]
async fn test_first_llm_input_has_system_and_single_user_message() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![text_response("Hola.")]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );

    service
        .chat(turn("hola", Some(Uuid::new_v4()), None))
        .await
        .unwrap();

    let input = llm.request(0);
    let user_messages = input
        .iter()
        .filter(|item| matches!(
            item,
            InputItem::Message { role, content } if role.as_str() == "user" && content == "hola"
        ))
        .count();
    assert_eq!(user_messages, 1, "the turn's message must appear exactly once");
    assert!(matches!(
        &input[0],
        InputItem::Message { role, .. } if role.as_str() == "system"
    ));
}

#[tokio::test]
async fn test_exhausted_rounds_fall_back_with_no_used_tools() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![
        tool_call_response("get_stock_distribution", "{}", "call_1"),
        tool_call_response("get_stock_distribution", "{}", "call_2"),
        tool_call_response("get_stock_distribution", "{}", "call_3"),
    ]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );

    let outcome = service
        .chat(turn(
            "distribución de stock por bodega",
            Some(Uuid::new_v4()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(
        outcome.reply,
        "No pude completar la respuesta con las herramientas disponibles. Intenta reformular tu pregunta."
    );
    assert!(outcome.used_tools.is_empty());
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn test_malformed_tool_arguments_do_not_fail_the_turn() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![
        tool_call_response("create_category", "{broken json", "call_1"),
        text_response("Me falta el nombre de la categoría."),
    ]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );

    let outcome = service
        .chat(turn("crea la categoría de siempre", Some(Uuid::new_v4()), None))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Me falta el nombre de la categoría.");

    // the model saw a missing-fields error, not a crash
    let second_input = llm.request(1);
    let output = second_input
        .iter()
        .find_map(|item| match item {
            InputItem::FunctionCallOutput { output, .. } => Some(output.clone()),
            _ => None,
        })
        .unwrap();
    assert!(output.contains("Missing required fields: name"));
}

// ============================================================================
// Conversation Continuity Tests
// ============================================================================

#[tokio::test]
async fn test_history_reaches_the_model_on_later_turns() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![
        text_response("Hola, ¿en qué te ayudo?"),
        text_response("Sigo aquí."),
    ]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm.clone()),
    );
    let user_id = Uuid::new_v4();

    let first = service.chat(turn("hola", Some(user_id), None)).await.unwrap();
    let conversation_id = first.conversation_id.unwrap();

    service
        .chat(turn("¿sigues ahí?", Some(user_id), Some(conversation_id)))
        .await
        .unwrap();

    let input = llm.request(1);
    assert!(input.iter().any(|item| matches!(
        item,
        InputItem::Message { content, .. } if content == "Hola, ¿en qué te ayudo?"
    )));
    assert!(input.iter().any(|item| matches!(
        item,
        InputItem::Message { content, .. } if content == "hola"
    )));
}

#[tokio::test]
async fn test_unknown_conversation_id_starts_fresh() {
    let (store, _pool) = migrated_store().await;
    let llm = Arc::new(ScriptedLlm::new(vec![text_response("Hola.")]));
    let service = service_with(
        store,
        Arc::new(InMemoryInventory::default()),
        Arc::new(FakeHistory::default()),
        Some(llm),
    );

    let outcome = service
        .chat(turn(
            "hola",
            Some(Uuid::new_v4()),
            Some("missing-conversation".to_owned()),
        ))
        .await
        .unwrap();

    let conversation_id = outcome.conversation_id.unwrap();
    assert_ne!(conversation_id, "missing-conversation");
}
