// ABOUTME: Flattened domain record types crossing the repository boundary
// ABOUTME: Stable subsets of storage entities, safe to serialize toward the LLM and clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # Domain Records
//!
//! Plain records returned by the external domain repositories. These carry a
//! stable subset of each storage entity's fields; full storage rows never
//! cross into the tool/LLM layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Pending Actions
// ============================================================================

/// The closed set of creation actions the assistant can stage
///
/// Wire names double as tool names, so a completed pending action can be
/// dispatched directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingActionKind {
    /// Stage a `create_category` call
    CreateCategory,
    /// Stage a `create_stockroom` call
    CreateStockroom,
    /// Stage a `create_supplier` call
    CreateSupplier,
}

impl PendingActionKind {
    /// Wire/tool name of this action
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCategory => "create_category",
            Self::CreateStockroom => "create_stockroom",
            Self::CreateSupplier => "create_supplier",
        }
    }

    /// Parse a stored wire name
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create_category" => Some(Self::CreateCategory),
            "create_stockroom" => Some(Self::CreateStockroom),
            "create_supplier" => Some(Self::CreateSupplier),
            _ => None,
        }
    }

    /// Required-field schema for this action
    #[must_use]
    pub const fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::CreateCategory | Self::CreateStockroom => &["name"],
            Self::CreateSupplier => &["name", "nit"],
        }
    }
}

/// An in-progress structured action awaiting missing fields
///
/// At most one per conversation. `required` is always the subset of the
/// action's schema for which `payload` holds no non-empty string value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    /// Which creation action is staged
    pub action: PendingActionKind,
    /// Partially collected field values
    pub payload: serde_json::Map<String, serde_json::Value>,
    /// Field names still missing
    pub required: Vec<String>,
}

impl PendingAction {
    /// Start a pending action with an empty payload and the full schema
    #[must_use]
    pub fn start(action: PendingActionKind) -> Self {
        Self {
            action,
            payload: serde_json::Map::new(),
            required: action
                .required_fields()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

// ============================================================================
// Entity References (embedded summaries)
// ============================================================================

/// Minimal article reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRef {
    /// Article id
    pub id: Uuid,
    /// Stock-keeping unit
    pub sku: String,
    /// Article name
    pub name: String,
}

/// Minimal category reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category id
    pub id: Uuid,
    /// Category name
    pub name: String,
}

/// Minimal supplier reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierRef {
    /// Supplier id
    pub id: Uuid,
    /// Supplier name
    pub name: String,
}

/// Minimal stockroom reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockroomBrief {
    /// Stockroom id
    pub id: Uuid,
    /// Stockroom name
    pub name: String,
}

/// Stockroom reference with address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockroomRef {
    /// Stockroom id
    pub id: Uuid,
    /// Stockroom name
    pub name: String,
    /// Street address, if recorded
    pub address: Option<String>,
}

// ============================================================================
// Primary Records
// ============================================================================

/// Article with joined category/supplier/stockroom summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article id
    pub id: Uuid,
    /// Stock-keeping unit
    pub sku: String,
    /// Article name
    pub name: String,
    /// Units on hand
    pub stock: i64,
    /// Reorder point threshold, if configured
    pub reorder_point: Option<i64>,
    /// Supplier lead time in days, if configured
    pub lead_time: Option<i64>,
    /// Stockroom id the article lives in
    pub stockroom_id: Option<Uuid>,
    /// Joined stockroom summary
    pub stockroom: Option<StockroomRef>,
    /// Joined category summary
    pub category: Option<CategoryRef>,
    /// Joined supplier summary
    pub supplier: Option<SupplierRef>,
}

impl ArticleRecord {
    /// Whether the article sits at or below its reorder point
    ///
    /// Articles with no configured reorder point are never low-stock.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.reorder_point.is_some_and(|rp| rp > 0 && self.stock <= rp)
    }
}

/// Category record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Category id
    pub id: Uuid,
    /// Category name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
}

/// Stockroom record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockroomRecord {
    /// Stockroom id
    pub id: Uuid,
    /// Stockroom name
    pub name: String,
    /// Street address
    pub address: Option<String>,
}

/// Supplier record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierRecord {
    /// Supplier id
    pub id: Uuid,
    /// Supplier name
    pub name: String,
    /// Tax identification number
    pub nit: String,
    /// Street address
    pub address: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
}

/// Result of a find-or-create supplier operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCreation {
    /// `false` when the supplier already existed
    pub created: bool,
    /// The created or pre-existing supplier
    pub supplier: SupplierRecord,
}

// ============================================================================
// Aggregates and Analytics
// ============================================================================

/// Total stock held at one stockroom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockroomStock {
    /// Stockroom id
    pub stockroom_id: Uuid,
    /// Stockroom name
    pub stockroom_name: String,
    /// Sum of stock across articles in the stockroom
    pub total_stock: i64,
}

/// Sales aggregate over an optional date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Number of sale transactions
    pub transactions: i64,
    /// Total units sold
    pub units_sold: i64,
    /// Earliest sale timestamp in range
    pub first_sale_at: Option<DateTime<Utc>>,
    /// Latest sale timestamp in range
    pub last_sale_at: Option<DateTime<Utc>>,
}

/// One row of the top-selling ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopSeller {
    /// Article id
    #[serde(rename = "articleId")]
    pub article_id: Uuid,
    /// Stock-keeping unit
    pub sku: String,
    /// Article name
    pub name: String,
    /// Units sold inside the window
    pub units_sold: i64,
}

/// One stock movement row with joined references
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovementRecord {
    /// Movement id
    pub id: Uuid,
    /// Movement type: IN, OUT or ADJUSTMENT
    #[serde(rename = "type")]
    pub movement_type: String,
    /// Units moved
    pub quantity: i64,
    /// When the movement happened
    pub moved_at: DateTime<Utc>,
    /// External reference (order, invoice)
    pub reference: Option<String>,
    /// Joined article summary
    pub article: Option<ArticleRef>,
    /// Joined stockroom summary
    pub stockroom: Option<StockroomBrief>,
}

/// Page of stock movements with the total match count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementPage {
    /// Total matching rows (not just this page)
    pub count: i64,
    /// Rows in this page, newest first
    pub items: Vec<StockMovementRecord>,
}

/// Reorder-quantity suggestion produced by the external
/// safety-stock/reorder-point calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    /// The article the suggestion is for
    pub article: ArticleRef,
    /// Calculation inputs and outputs
    pub metrics: ReorderMetrics,
}

/// Metrics behind a reorder suggestion
///
/// Serialized field names match the report vocabulary the assistant
/// presents to Spanish-speaking users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderMetrics {
    /// Current units on hand
    #[serde(rename = "stock_actual")]
    pub stock: i64,
    /// Average daily demand
    #[serde(rename = "demanda_promedio_diaria")]
    pub demand_daily_avg: f64,
    /// Standard deviation of daily demand
    #[serde(rename = "desviacion_demanda_diaria")]
    pub demand_daily_std: f64,
    /// Supplier lead time in days
    #[serde(rename = "lead_time_dias")]
    pub lead_time_days: f64,
    /// Target service level (0.0 - 1.0)
    #[serde(rename = "nivel_servicio")]
    pub service_level: f64,
    /// Z-score for the service level
    #[serde(rename = "z_score")]
    pub z_score: f64,
    /// Expected demand during the lead time
    #[serde(rename = "demanda_esperada_en_lead_time")]
    pub expected_demand_lead_time: f64,
    /// Demand deviation during the lead time
    #[serde(rename = "desviacion_en_lead_time")]
    pub demand_std_lead_time: f64,
    /// Safety stock
    #[serde(rename = "stock_seguridad")]
    pub safety_stock: f64,
    /// Currently configured reorder point
    #[serde(rename = "reorder_point_actual")]
    pub current_reorder_point: Option<i64>,
    /// Recommended reorder point
    #[serde(rename = "reorder_point_recomendado")]
    pub recommended_reorder_point: f64,
    /// Suggested quantity to reorder now
    #[serde(rename = "cantidad_reorden_sugerida")]
    pub suggested_quantity: f64,
}

/// Stockout-date forecast for an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockoutForecast {
    /// Article id
    #[serde(rename = "articleId")]
    pub article_id: Uuid,
    /// Stock-keeping unit
    pub sku: String,
    /// Article name
    pub name: String,
    /// Current units on hand
    pub stock: i64,
    /// Average units sold per day inside the window
    pub avg_daily_units: f64,
    /// Sampling window in days, when a forecast was possible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_days: Option<i64>,
    /// Estimated stockout timestamp; `None` when sales are too sparse
    pub estimated_stockout_at: Option<DateTime<Utc>>,
    /// Days until stockout at the current rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_stockout: Option<f64>,
    /// Explanation when no forecast could be made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
