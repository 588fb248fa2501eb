// ABOUTME: Deterministic intent detection and field merging for creation flows
// ABOUTME: Pure string functions; no storage or model access happens here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # Pending-Action Helpers
//!
//! The deterministic side of the assistant: phrase-list intent detection,
//! short-answer field merging, missing-field computation and the fixed
//! Spanish replies for creation flows. None of this touches the LLM; a
//! recognized creation phrase or follow-up answer is resolved without a
//! single model call.

use serde_json::{Map, Value};

use crate::models::PendingActionKind;

/// Phrases that start a category creation flow
const CATEGORY_PHRASES: &[&str] = &[
    "crea una categoría",
    "crear una categoría",
    "crear categoría",
    "crea categoría",
    "registra una categoría",
    "registrar categoría",
];

/// Phrases that start a stockroom creation flow
const STOCKROOM_PHRASES: &[&str] = &[
    "crea un almacén",
    "crear un almacén",
    "crear almacén",
    "crea un stockroom",
    "crear stockroom",
    "registra un almacén",
    "registrar almacén",
    "crea una bodega",
    "crear una bodega",
    "crear bodega",
    "registra una bodega",
    "registrar bodega",
];

/// Phrases that start a supplier creation flow
const SUPPLIER_PHRASES: &[&str] = &[
    "crea un proveedor",
    "crear un proveedor",
    "crear proveedor",
    "registra un proveedor",
    "registrar proveedor",
    "registra proveedor",
];

/// Detect a creation intent from a user message
///
/// Matching is case-insensitive substring search over fixed phrase lists.
/// Category wins over stockroom, stockroom over supplier, when a message
/// somehow matches more than one list.
#[must_use]
pub fn detect_create_intent(text: &str) -> Option<PendingActionKind> {
    let t = text.to_lowercase();

    if CATEGORY_PHRASES.iter().any(|p| t.contains(p)) {
        return Some(PendingActionKind::CreateCategory);
    }
    if STOCKROOM_PHRASES.iter().any(|p| t.contains(p)) {
        return Some(PendingActionKind::CreateStockroom);
    }
    if SUPPLIER_PHRASES.iter().any(|p| t.contains(p)) {
        return Some(PendingActionKind::CreateSupplier);
    }

    None
}

/// Whether a message is short enough to treat as a bare field answer
///
/// At most four whitespace-separated tokens. Empty or whitespace-only
/// messages are not answers.
#[must_use]
pub fn is_short_answer(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return false;
    }
    t.split_whitespace().count() <= 4
}

/// Try to merge a short user answer into a pending payload
///
/// One missing field takes the whole trimmed reply. Two missing fields
/// (supplier name + NIT) take the last token as NIT and the rest as the
/// name, so "Acme Labs 900123456" resolves in one reply. Returns `None`
/// when the message cannot be interpreted deterministically, which hands
/// the turn to the LLM.
#[must_use]
pub fn merge_pending_payload(
    payload: &Map<String, Value>,
    user_message: &str,
    required: &[String],
) -> Option<Map<String, Value>> {
    if required.len() == 1 && is_short_answer(user_message) {
        let mut merged = payload.clone();
        merged.insert(
            required[0].clone(),
            Value::String(user_message.trim().to_owned()),
        );
        return Some(merged);
    }

    if required.len() == 2 && is_short_answer(user_message) {
        let parts: Vec<&str> = user_message.trim().split_whitespace().collect();
        if parts.len() >= 2 {
            let mut merged = payload.clone();
            let (name_parts, nit) = parts.split_at(parts.len() - 1);
            merged.insert("name".to_owned(), Value::String(name_parts.join(" ")));
            merged.insert("nit".to_owned(), Value::String(nit[0].to_owned()));
            return Some(merged);
        }
    }

    None
}

/// Fields of the action's schema still missing from the payload
///
/// A field counts as present only when its value is a non-empty string
/// after trimming.
#[must_use]
pub fn compute_missing_fields(action: PendingActionKind, payload: &Map<String, Value>) -> Vec<String> {
    action
        .required_fields()
        .iter()
        .filter(|field| {
            !payload
                .get(**field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty())
        })
        .map(ToString::to_string)
        .collect()
}

/// The question to ask for the missing fields of a pending action
#[must_use]
pub fn build_missing_fields_question(action: PendingActionKind, missing: &[String]) -> String {
    let has = |field: &str| missing.iter().any(|m| m == field);

    match action {
        PendingActionKind::CreateCategory if has("name") => {
            "¿Cuál es el nombre de la categoría que deseas crear?".to_owned()
        }
        PendingActionKind::CreateStockroom if has("name") => {
            "¿Cuál es el nombre del almacén que deseas crear?".to_owned()
        }
        PendingActionKind::CreateSupplier if has("name") && has("nit") => {
            "Para crear el proveedor necesito el nombre y el NIT. ¿Me los indicas?".to_owned()
        }
        PendingActionKind::CreateSupplier if has("name") => {
            "¿Cuál es el nombre del proveedor?".to_owned()
        }
        PendingActionKind::CreateSupplier if has("nit") => {
            "¿Cuál es el NIT del proveedor?".to_owned()
        }
        _ => format!("Necesito estos datos para continuar: {}.", missing.join(", ")),
    }
}

/// Confirmation (or failure) reply after dispatching a completed action
#[must_use]
pub fn build_reply_from_tool(action: PendingActionKind, result: &Value) -> String {
    if let Some(error) = result.get("error").and_then(Value::as_str) {
        return format!("No pude completar la acción: {error}");
    }

    match action {
        PendingActionKind::CreateCategory => {
            let name = result
                .pointer("/category/name")
                .and_then(Value::as_str)
                .unwrap_or("la categoría");
            format!("He creado la categoría \"{name}\".")
        }
        PendingActionKind::CreateStockroom => {
            let name = result
                .pointer("/stockroom/name")
                .and_then(Value::as_str)
                .unwrap_or("el almacén");
            format!("He creado el almacén \"{name}\".")
        }
        PendingActionKind::CreateSupplier => {
            let name = result
                .pointer("/supplier/name")
                .and_then(Value::as_str)
                .unwrap_or("el proveedor");
            if result.get("created") == Some(&Value::Bool(false)) {
                format!("El proveedor \"{name}\" ya existía y quedó actualizado si aplicaba.")
            } else {
                format!("He creado el proveedor \"{name}\".")
            }
        }
    }
}
