// ABOUTME: Shared test fixtures for assistant integration tests
// ABOUTME: Scripted LLM client, in-memory repository fakes and store setup helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs, dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use jelt_assistant::config::AssistantPrompts;
use jelt_assistant::database::ConversationStore;
use jelt_assistant::errors::{AppError, AppResult};
use jelt_assistant::llm::{
    FunctionDeclaration, InputItem, LlmClient, LlmResponse, ResponseItem, ToolCall,
};
use jelt_assistant::models::{
    ArticleRecord, ArticleRef, CategoryRecord, MovementPage, ReorderMetrics, ReorderSuggestion,
    SalesSummary, StockoutForecast, StockroomRecord, StockroomStock, SupplierCreation,
    SupplierRecord, TopSeller,
};
use jelt_assistant::repositories::{
    ArticleFilter, ArticleLookup, HistoryRepository, InventoryRepository, LowStockQuery,
    MovementQuery, NewCategory, NewStockroom, NewSupplier, ReorderQuery, SalesQuery,
    StockoutQuery, TopSellersQuery,
};
use jelt_assistant::services::AssistantService;
use jelt_assistant::tools::ToolDispatcher;

// ============================================================================
// Database Setup
// ============================================================================

/// In-memory SQLite pool; one connection so every handle sees the same DB
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite")
}

pub async fn migrated_store() -> (ConversationStore, SqlitePool) {
    let pool = memory_pool().await;
    let store = ConversationStore::new(pool.clone());
    store.migrate().await.expect("migration failed");
    (store, pool)
}

// ============================================================================
// Scripted LLM Client
// ============================================================================

/// LLM client that replays a fixed sequence of responses and records the
/// input it was sent on every call
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<LlmResponse>>,
    pub requests: Mutex<Vec<Vec<InputItem>>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> Vec<InputItem> {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn create_response(
        &self,
        _model: &str,
        _tools: &[FunctionDeclaration],
        input: &[InputItem],
    ) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(input.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::external_service("scripted", "no scripted response left"))
    }
}

pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        items: vec![ResponseItem::OutputText(text.to_owned())],
        output_text: text.to_owned(),
    }
}

pub fn tool_call_response(name: &str, arguments: &str, call_id: &str) -> LlmResponse {
    LlmResponse {
        items: vec![ResponseItem::FunctionCall(ToolCall {
            name: name.to_owned(),
            arguments: arguments.to_owned(),
            call_id: Some(call_id.to_owned()),
        })],
        output_text: String::new(),
    }
}

// ============================================================================
// Repository Fakes
// ============================================================================

pub fn sample_article(sku: &str, name: &str, stock: i64, reorder_point: Option<i64>) -> ArticleRecord {
    ArticleRecord {
        id: Uuid::new_v4(),
        sku: sku.to_owned(),
        name: name.to_owned(),
        stock,
        reorder_point,
        lead_time: Some(7),
        stockroom_id: None,
        stockroom: None,
        category: None,
        supplier: None,
    }
}

/// Inventory fake over plain vectors; creations append, queries filter
#[derive(Default)]
pub struct InMemoryInventory {
    pub articles: Vec<ArticleRecord>,
    pub distribution: Vec<StockroomStock>,
    pub categories: Mutex<Vec<CategoryRecord>>,
    pub stockrooms: Mutex<Vec<StockroomRecord>>,
    pub suppliers: Mutex<Vec<SupplierRecord>>,
    pub seen_user_ids: Mutex<Vec<Uuid>>,
}

impl InMemoryInventory {
    pub fn with_articles(articles: Vec<ArticleRecord>) -> Self {
        Self {
            articles,
            ..Self::default()
        }
    }

    fn record_user(&self, user_id: Uuid) {
        self.seen_user_ids.lock().unwrap().push(user_id);
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventory {
    async fn find_articles_by_sku_or_name(
        &self,
        user_id: Uuid,
        query: &ArticleLookup,
    ) -> AppResult<Vec<ArticleRecord>> {
        self.record_user(user_id);
        Ok(self
            .articles
            .iter()
            .filter(|a| {
                query.sku.as_deref().is_some_and(|sku| a.sku == sku)
                    || query.name.as_deref().is_some_and(|name| {
                        a.name.to_lowercase().contains(&name.to_lowercase())
                    })
            })
            .cloned()
            .collect())
    }

    async fn find_low_stock_articles(
        &self,
        user_id: Uuid,
        query: &LowStockQuery,
    ) -> AppResult<Vec<ArticleRecord>> {
        self.record_user(user_id);
        Ok(self
            .articles
            .iter()
            .filter(|a| a.is_low_stock())
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn stock_distribution_by_stockroom(&self, user_id: Uuid) -> AppResult<Vec<StockroomStock>> {
        self.record_user(user_id);
        Ok(self.distribution.clone())
    }

    async fn reorder_suggestion(
        &self,
        user_id: Uuid,
        query: &ReorderQuery,
    ) -> AppResult<Option<ReorderSuggestion>> {
        self.record_user(user_id);
        let article = self.articles.iter().find(|a| {
            query.article_id.is_some_and(|id| a.id == id)
                || query.sku.as_deref().is_some_and(|sku| a.sku == sku)
        });
        Ok(article.map(|a| ReorderSuggestion {
            article: ArticleRef {
                id: a.id,
                sku: a.sku.clone(),
                name: a.name.clone(),
            },
            metrics: sample_metrics(a.stock),
        }))
    }

    async fn find_articles_by_category_or_supplier(
        &self,
        user_id: Uuid,
        query: &ArticleFilter,
    ) -> AppResult<Vec<ArticleRecord>> {
        self.record_user(user_id);
        Ok(self
            .articles
            .iter()
            .filter(|a| !query.low_stock_only || a.is_low_stock())
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn create_category_for_user(
        &self,
        user_id: Uuid,
        category: &NewCategory,
    ) -> AppResult<CategoryRecord> {
        self.record_user(user_id);
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            name: category.name.clone(),
            description: category.description.clone(),
        };
        self.categories.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn create_stockroom_for_user(
        &self,
        user_id: Uuid,
        stockroom: &NewStockroom,
    ) -> AppResult<StockroomRecord> {
        self.record_user(user_id);
        let record = StockroomRecord {
            id: Uuid::new_v4(),
            name: stockroom.name.clone(),
            address: stockroom.address.clone(),
        };
        self.stockrooms.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn create_supplier(
        &self,
        user_id: Uuid,
        supplier: &NewSupplier,
    ) -> AppResult<SupplierCreation> {
        self.record_user(user_id);
        let mut suppliers = self.suppliers.lock().unwrap();
        if let Some(existing) = suppliers.iter().find(|s| s.nit == supplier.nit) {
            return Ok(SupplierCreation {
                created: false,
                supplier: existing.clone(),
            });
        }
        let record = SupplierRecord {
            id: Uuid::new_v4(),
            name: supplier.name.clone(),
            nit: supplier.nit.clone(),
            address: supplier.address.clone(),
            phone: supplier.phone.clone(),
        };
        suppliers.push(record.clone());
        Ok(SupplierCreation {
            created: true,
            supplier: record,
        })
    }
}

pub fn sample_metrics(stock: i64) -> ReorderMetrics {
    ReorderMetrics {
        stock,
        demand_daily_avg: 4.0,
        demand_daily_std: 1.5,
        lead_time_days: 7.0,
        service_level: 0.95,
        z_score: 1.65,
        expected_demand_lead_time: 28.0,
        demand_std_lead_time: 3.97,
        safety_stock: 6.55,
        current_reorder_point: Some(30),
        recommended_reorder_point: 34.55,
        suggested_quantity: 20.0,
    }
}

/// History fake returning canned aggregates
#[derive(Default)]
pub struct FakeHistory {
    pub summary: Option<SalesSummary>,
    pub top_sellers: Vec<TopSeller>,
    pub movements: Option<MovementPage>,
    pub forecast: Option<StockoutForecast>,
    pub seen_user_ids: Mutex<Vec<Uuid>>,
}

impl FakeHistory {
    fn record_user(&self, user_id: Uuid) {
        self.seen_user_ids.lock().unwrap().push(user_id);
    }
}

#[async_trait]
impl HistoryRepository for FakeHistory {
    async fn sales_summary(&self, user_id: Uuid, _query: &SalesQuery) -> AppResult<SalesSummary> {
        self.record_user(user_id);
        Ok(self.summary.clone().unwrap_or(SalesSummary {
            transactions: 0,
            units_sold: 0,
            first_sale_at: None,
            last_sale_at: None,
        }))
    }

    async fn top_selling_articles(
        &self,
        user_id: Uuid,
        _query: &TopSellersQuery,
    ) -> AppResult<Vec<TopSeller>> {
        self.record_user(user_id);
        Ok(self.top_sellers.clone())
    }

    async fn list_movements(&self, user_id: Uuid, _query: &MovementQuery) -> AppResult<MovementPage> {
        self.record_user(user_id);
        Ok(self.movements.clone().unwrap_or(MovementPage {
            count: 0,
            items: Vec::new(),
        }))
    }

    async fn predict_stockout_date(
        &self,
        user_id: Uuid,
        _query: &StockoutQuery,
    ) -> AppResult<Option<StockoutForecast>> {
        self.record_user(user_id);
        Ok(self.forecast.clone())
    }
}

// ============================================================================
// Service Assembly
// ============================================================================

pub fn dispatcher(
    inventory: Arc<InMemoryInventory>,
    history: Arc<FakeHistory>,
) -> ToolDispatcher {
    ToolDispatcher::new(inventory, history)
}

pub fn service_with(
    store: ConversationStore,
    inventory: Arc<InMemoryInventory>,
    history: Arc<FakeHistory>,
    llm: Option<Arc<dyn LlmClient>>,
) -> AssistantService {
    AssistantService::new(
        store,
        dispatcher(inventory, history),
        llm,
        "gpt-4o-mini",
        AssistantPrompts::default(),
    )
}
