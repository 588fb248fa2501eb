// ABOUTME: Repository trait seams for the external inventory and history storage
// ABOUTME: Every operation is scoped to the owning user; implementations live outside this crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # Domain Repositories
//!
//! The assistant engine never touches inventory storage directly. These
//! traits are the seam to the surrounding application's persistence layer;
//! the engine only consumes flattened [`crate::models`] records through
//! them. All methods are implicitly scoped to `user_id` — an implementation
//! must never return another user's entities.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{
    ArticleRecord, CategoryRecord, MovementPage, ReorderSuggestion, SalesSummary,
    StockoutForecast, StockroomRecord, StockroomStock, SupplierCreation, TopSeller,
};

// ============================================================================
// Query Parameter Types
// ============================================================================
//
// Field names deserialize directly from tool-call arguments, so they use the
// camelCase vocabulary of the tool schema.

/// Article lookup by SKU and/or partial name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticleLookup {
    /// Exact SKU match
    pub sku: Option<String>,
    /// Case-insensitive partial name match
    pub name: Option<String>,
}

/// Low-stock listing parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LowStockQuery {
    /// Maximum articles to return
    pub limit: i64,
    /// Restrict to one stockroom
    pub stockroom_id: Option<Uuid>,
}

impl Default for LowStockQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            stockroom_id: None,
        }
    }
}

/// Article filtering by category and/or supplier
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleFilter {
    /// Category id filter
    pub category_id: Option<Uuid>,
    /// Partial category name filter
    pub category_name: Option<String>,
    /// Supplier id filter
    pub supplier_id: Option<Uuid>,
    /// Partial supplier name filter
    pub supplier_name: Option<String>,
    /// Keep only articles at or below their reorder point
    pub low_stock_only: bool,
    /// Maximum articles to return
    pub limit: i64,
}

impl Default for ArticleFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            category_name: None,
            supplier_id: None,
            supplier_name: None,
            low_stock_only: false,
            limit: 50,
        }
    }
}

/// Reorder-suggestion target; one of id or SKU must be given
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReorderQuery {
    /// Article id
    pub article_id: Option<Uuid>,
    /// Article SKU
    pub sku: Option<String>,
}

/// Sales aggregation filters; dates pass through as the caller supplied them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesQuery {
    /// Restrict to one article
    pub article_id: Option<Uuid>,
    /// Restrict to one stockroom
    pub stockroom_id: Option<Uuid>,
    /// Range start (`YYYY-MM-DD` or ISO 8601)
    pub from: Option<String>,
    /// Range end (`YYYY-MM-DD` or ISO 8601)
    pub to: Option<String>,
}

/// Top-selling ranking parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopSellersQuery {
    /// Restrict to one stockroom
    pub stockroom_id: Option<Uuid>,
    /// Window in days
    pub days: i64,
    /// Maximum rows to return
    pub limit: i64,
}

impl Default for TopSellersQuery {
    fn default() -> Self {
        Self {
            stockroom_id: None,
            days: 30,
            limit: 10,
        }
    }
}

/// Stock-movement listing filters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementQuery {
    /// Restrict to one article
    pub article_id: Option<Uuid>,
    /// Restrict to one stockroom
    pub stockroom_id: Option<Uuid>,
    /// Movement type: IN, OUT or ADJUSTMENT
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
    /// Range start (`YYYY-MM-DD` or ISO 8601)
    pub from: Option<String>,
    /// Range end (`YYYY-MM-DD` or ISO 8601)
    pub to: Option<String>,
    /// Maximum rows to return
    pub limit: i64,
}

impl Default for MovementQuery {
    fn default() -> Self {
        Self {
            article_id: None,
            stockroom_id: None,
            movement_type: None,
            from: None,
            to: None,
            limit: 50,
        }
    }
}

/// Stockout-forecast parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StockoutQuery {
    /// Article to forecast; required by the tool contract
    pub article_id: Option<Uuid>,
    /// Restrict the sales window to one stockroom
    pub stockroom_id: Option<Uuid>,
    /// Sampling window in days
    pub days: i64,
}

impl Default for StockoutQuery {
    fn default() -> Self {
        Self {
            article_id: None,
            stockroom_id: None,
            days: 30,
        }
    }
}

// ============================================================================
// Creation Payloads
// ============================================================================

/// Fields for a new category
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    /// Category name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields for a new stockroom
#[derive(Debug, Clone, Deserialize)]
pub struct NewStockroom {
    /// Stockroom name
    pub name: String,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
}

/// Fields for a new supplier
#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplier {
    /// Supplier name
    pub name: String,
    /// Tax identification number
    pub nit: String,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
}

// ============================================================================
// Repository Traits
// ============================================================================

/// Queries and commands over articles, categories, suppliers and stockrooms
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Find articles by exact SKU and/or partial name, joined summaries included
    async fn find_articles_by_sku_or_name(
        &self,
        user_id: Uuid,
        query: &ArticleLookup,
    ) -> AppResult<Vec<ArticleRecord>>;

    /// List articles at or below their reorder point
    async fn find_low_stock_articles(
        &self,
        user_id: Uuid,
        query: &LowStockQuery,
    ) -> AppResult<Vec<ArticleRecord>>;

    /// Total stock per stockroom for the user
    async fn stock_distribution_by_stockroom(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<StockroomStock>>;

    /// Reorder-quantity suggestion from the safety-stock/reorder-point
    /// calculation; `None` when no matching article exists
    async fn reorder_suggestion(
        &self,
        user_id: Uuid,
        query: &ReorderQuery,
    ) -> AppResult<Option<ReorderSuggestion>>;

    /// Filter articles by category and/or supplier
    async fn find_articles_by_category_or_supplier(
        &self,
        user_id: Uuid,
        query: &ArticleFilter,
    ) -> AppResult<Vec<ArticleRecord>>;

    /// Create a category owned by the user
    async fn create_category_for_user(
        &self,
        user_id: Uuid,
        category: &NewCategory,
    ) -> AppResult<CategoryRecord>;

    /// Create a stockroom owned by the user
    async fn create_stockroom_for_user(
        &self,
        user_id: Uuid,
        stockroom: &NewStockroom,
    ) -> AppResult<StockroomRecord>;

    /// Create a supplier, or return the existing one with the same NIT
    async fn create_supplier(
        &self,
        user_id: Uuid,
        supplier: &NewSupplier,
    ) -> AppResult<SupplierCreation>;
}

/// Queries over sales history and stock movements
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Aggregate sales over an optional article/stockroom/date-range filter
    async fn sales_summary(&self, user_id: Uuid, query: &SalesQuery) -> AppResult<SalesSummary>;

    /// Ranking of best-selling articles inside a day window
    async fn top_selling_articles(
        &self,
        user_id: Uuid,
        query: &TopSellersQuery,
    ) -> AppResult<Vec<TopSeller>>;

    /// Page of stock movements, newest first
    async fn list_movements(
        &self,
        user_id: Uuid,
        query: &MovementQuery,
    ) -> AppResult<MovementPage>;

    /// Stockout-date forecast from recent sales velocity; `None` when the
    /// article does not exist
    async fn predict_stockout_date(
        &self,
        user_id: Uuid,
        query: &StockoutQuery,
    ) -> AppResult<Option<StockoutForecast>>;
}
