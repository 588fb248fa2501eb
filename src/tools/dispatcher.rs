// ABOUTME: Tool dispatcher mapping LLM tool calls to repository operations
// ABOUTME: Flattens domain records into the JSON shapes fed back to the model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # Tool Dispatcher
//!
//! Executes one tool call against the domain repositories and returns the
//! result as a JSON value. Domain-level failures (missing fields, unknown
//! tool, article not found) come back as an `{"error": ...}` value so the
//! model can recover in the next round; only infrastructure failures
//! propagate as `Err`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::llm::ToolCall;
use crate::models::{ArticleRecord, StockMovementRecord};
use crate::repositories::{
    ArticleFilter, ArticleLookup, HistoryRepository, InventoryRepository, LowStockQuery,
    MovementQuery, NewCategory, NewStockroom, NewSupplier, ReorderQuery, SalesQuery,
    StockoutQuery, TopSellersQuery,
};

/// Executes tool calls against the inventory and history repositories
///
/// Every call carries the authenticated user's id; repositories never see
/// another user's entities through this dispatcher.
#[derive(Clone)]
pub struct ToolDispatcher {
    inventory: Arc<dyn InventoryRepository>,
    history: Arc<dyn HistoryRepository>,
}

impl ToolDispatcher {
    /// Create a dispatcher over the given repositories
    #[must_use]
    pub fn new(inventory: Arc<dyn InventoryRepository>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { inventory, history }
    }

    /// Execute one tool call for the given user
    ///
    /// # Errors
    ///
    /// Returns an error when a repository operation fails or the arguments
    /// cannot be decoded into the tool's parameter shape.
    #[instrument(skip(self, call), fields(tool = %call.name))]
    pub async fn execute(&self, call: &ToolCall, user_id: Uuid) -> AppResult<Value> {
        debug!("Executing assistant tool");

        match call.name.as_str() {
            "get_article_stock_by_sku" | "get_article_stock_by_name" => {
                let query: ArticleLookup = parse_args(call)?;
                let articles = self
                    .inventory
                    .find_articles_by_sku_or_name(user_id, &query)
                    .await?;
                Ok(json!({
                    "items": articles.iter().map(article_full_json).collect::<Vec<_>>(),
                }))
            }

            "get_low_stock_articles" => {
                let query: LowStockQuery = parse_args(call)?;
                let articles = self.inventory.find_low_stock_articles(user_id, &query).await?;
                Ok(json!({
                    "items": articles
                        .iter()
                        .map(|a| json!({
                            "id": a.id,
                            "sku": a.sku,
                            "name": a.name,
                            "stock": a.stock,
                            "reorder_point": a.reorder_point,
                            "id_stockroom": a.stockroom_id,
                        }))
                        .collect::<Vec<_>>(),
                }))
            }

            "get_stock_distribution" => {
                let rows = self.inventory.stock_distribution_by_stockroom(user_id).await?;
                Ok(json!({
                    "stockrooms": rows
                        .iter()
                        .map(|r| json!({
                            "stockroom_id": r.stockroom_id,
                            "stockroom_name": r.stockroom_name,
                            "total_stock": r.total_stock,
                        }))
                        .collect::<Vec<_>>(),
                }))
            }

            "suggest_reorder_quantity" => {
                let query: ReorderQuery = parse_args(call)?;
                let Some(suggestion) = self.inventory.reorder_suggestion(user_id, &query).await?
                else {
                    return Ok(json!({
                        "error": "Artículo no encontrado para calcular sugerencia de reorden.",
                    }));
                };
                Ok(json!({
                    "article": {
                        "id": suggestion.article.id,
                        "sku": suggestion.article.sku,
                        "name": suggestion.article.name,
                    },
                    "metrics": to_value(&suggestion.metrics)?,
                }))
            }

            "filter_articles_by_category_or_supplier" => {
                let query: ArticleFilter = parse_args(call)?;
                let articles = self
                    .inventory
                    .find_articles_by_category_or_supplier(user_id, &query)
                    .await?;
                Ok(json!({
                    "items": articles
                        .iter()
                        .map(|a| json!({
                            "id": a.id,
                            "sku": a.sku,
                            "name": a.name,
                            "stock": a.stock,
                            "reorder_point": a.reorder_point,
                            "category": a.category.as_ref().map(|c| json!({"id": c.id, "name": c.name})),
                            "supplier": a.supplier.as_ref().map(|s| json!({"id": s.id, "name": s.name})),
                            "stockroom": a.stockroom.as_ref().map(|s| json!({"id": s.id, "name": s.name})),
                        }))
                        .collect::<Vec<_>>(),
                }))
            }

            "get_sales_summary" => {
                let query: SalesQuery = parse_args(call)?;
                let summary = self.history.sales_summary(user_id, &query).await?;
                to_value(&summary)
            }

            "get_top_selling_articles" => {
                let query: TopSellersQuery = parse_args(call)?;
                let items = self.history.top_selling_articles(user_id, &query).await?;
                Ok(json!({ "items": to_value(&items)? }))
            }

            "get_stock_movements" => {
                let query: MovementQuery = parse_args(call)?;
                let page = self.history.list_movements(user_id, &query).await?;
                Ok(json!({
                    "count": page.count,
                    "items": page.items.iter().map(movement_json).collect::<Vec<_>>(),
                }))
            }

            "predict_stockout_date" => {
                let query: StockoutQuery = parse_args(call)?;
                if query.article_id.is_none() {
                    return Ok(json!({ "error": "articleId is required" }));
                }
                let forecast = self.history.predict_stockout_date(user_id, &query).await?;
                match forecast {
                    Some(f) => to_value(&f),
                    None => Ok(Value::Null),
                }
            }

            "create_category" => {
                let args: Value = parse_args(call)?;
                if !has_text(&args, "name") {
                    return Ok(json!({ "error": "Missing required fields: name" }));
                }
                let category: NewCategory = from_args(args)?;
                let created = self
                    .inventory
                    .create_category_for_user(user_id, &category)
                    .await?;
                Ok(json!({
                    "created": true,
                    "category": {
                        "id": created.id,
                        "name": created.name,
                        "description": created.description,
                    },
                }))
            }

            "create_stockroom" => {
                let args: Value = parse_args(call)?;
                if !has_text(&args, "name") {
                    return Ok(json!({ "error": "Missing required fields: name" }));
                }
                let stockroom: NewStockroom = from_args(args)?;
                let created = self
                    .inventory
                    .create_stockroom_for_user(user_id, &stockroom)
                    .await?;
                Ok(json!({
                    "created": true,
                    "stockroom": {
                        "id": created.id,
                        "name": created.name,
                        "address": created.address,
                    },
                }))
            }

            "create_supplier" => {
                let args: Value = parse_args(call)?;
                if !has_text(&args, "name") || !has_text(&args, "nit") {
                    return Ok(json!({ "error": "Missing required fields: name, nit" }));
                }
                let supplier: NewSupplier = from_args(args)?;
                let result = self.inventory.create_supplier(user_id, &supplier).await?;
                Ok(json!({
                    "created": result.created,
                    "supplier": {
                        "id": result.supplier.id,
                        "name": result.supplier.name,
                        "nit": result.supplier.nit,
                        "address": result.supplier.address,
                        "phone": result.supplier.phone,
                    },
                }))
            }

            unknown => Ok(json!({ "error": format!("Tool not implemented: {unknown}") })),
        }
    }
}

// ============================================================================
// Argument and Result Helpers
// ============================================================================

/// Parse the raw arguments string into a typed parameter struct
///
/// Empty arguments decode as the type's defaults.
fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> AppResult<T> {
    let raw = if call.arguments.trim().is_empty() {
        "{}"
    } else {
        call.arguments.as_str()
    };
    serde_json::from_str(raw).map_err(|e| {
        AppError::invalid_input(format!("Invalid arguments for {}: {e}", call.name))
    })
}

fn from_args<T: DeserializeOwned>(args: Value) -> AppResult<T> {
    serde_json::from_value(args)
        .map_err(|e| AppError::invalid_input(format!("Invalid creation payload: {e}")))
}

fn to_value<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::internal(format!("Failed to encode tool result: {e}")))
}

/// Whether `args[field]` holds a non-empty string
fn has_text(args: &Value, field: &str) -> bool {
    args.get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn article_full_json(a: &ArticleRecord) -> Value {
    json!({
        "id": a.id,
        "sku": a.sku,
        "name": a.name,
        "stock": a.stock,
        "reorder_point": a.reorder_point,
        "lead_time": a.lead_time,
        "stockroom": a.stockroom.as_ref().map(|s| json!({
            "id": s.id,
            "name": s.name,
            "address": s.address,
        })),
        "category": a.category.as_ref().map(|c| json!({"id": c.id, "name": c.name})),
        "supplier": a.supplier.as_ref().map(|s| json!({"id": s.id, "name": s.name})),
    })
}

fn movement_json(m: &StockMovementRecord) -> Value {
    json!({
        "id": m.id,
        "type": m.movement_type,
        "quantity": m.quantity,
        "moved_at": m.moved_at,
        "reference": m.reference,
        "article": m.article.as_ref().map(|a| json!({"id": a.id, "sku": a.sku, "name": a.name})),
        "stockroom": m.stockroom.as_ref().map(|s| json!({"id": s.id, "name": s.name})),
    })
}
