// ABOUTME: Tool schema declarations advertised to the LLM on every request
// ABOUTME: One declaration per dispatchable tool; names stay in lockstep with the dispatcher
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # Assistant Tool Schema
//!
//! The function declarations sent to the model with every request.
//! Descriptions are in Spanish because that is the language the model
//! answers in. Every name returned here has a matching arm in
//! [`ToolDispatcher::execute`](dispatcher::ToolDispatcher::execute).

mod dispatcher;

pub use dispatcher::ToolDispatcher;

use serde_json::json;

use crate::llm::FunctionDeclaration;

/// All tool declarations, in presentation order
#[must_use]
pub fn assistant_tools() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration {
            name: "get_article_stock_by_sku".into(),
            description: "Obtiene información de stock de un artículo por su SKU exacto. \
                          Úsalo cuando el usuario pregunte por la existencia o stock de un \
                          artículo identificado por SKU."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "sku": {
                        "type": "string",
                        "description": "SKU exacto del artículo."
                    }
                },
                "required": ["sku"],
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "get_article_stock_by_name".into(),
            description: "Obtiene información de stock de artículos por nombre (búsqueda \
                          parcial). Úsalo cuando el usuario pregunte por un artículo por su \
                          nombre y no tenga el SKU."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Nombre (o parte del nombre) del artículo."
                    }
                },
                "required": ["name"],
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "get_low_stock_articles".into(),
            description: "Lista artículos con stock igual o por debajo del punto de reorden. \
                          Úsalo cuando el usuario pregunte por próximos productos a agotarse."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Máximo de artículos a devolver.",
                        "default": 20
                    },
                    "stockroomId": {
                        "type": "string",
                        "description": "Id del almacén (UUID). Si no se envía, se consideran todos."
                    }
                },
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "get_stock_distribution".into(),
            description: "Devuelve un resumen de la distribución de stock por almacén. Úsalo \
                          cuando el usuario pregunte por stock por ubicación, bodega o depósito."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "suggest_reorder_quantity".into(),
            description: "Sugiere una cantidad de reorden para un artículo usando demanda \
                          promedio diaria, variabilidad de la demanda (desviación estándar), \
                          lead time y nivel de servicio para calcular demanda esperada en el \
                          lead time, stock de seguridad y punto de reorden recomendado."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "articleId": {
                        "type": "string",
                        "description": "Id del artículo (UUID)."
                    },
                    "sku": {
                        "type": "string",
                        "description": "SKU del artículo. Opcional si se usa articleId."
                    }
                },
                "required": [],
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "filter_articles_by_category_or_supplier".into(),
            description: "Filtra artículos por categoría o proveedor. Puede usarse también \
                          para ver solo artículos con bajo stock."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "categoryId": {
                        "type": "string",
                        "description": "Id de la categoría (UUID)."
                    },
                    "categoryName": {
                        "type": "string",
                        "description": "Nombre (o parte del nombre) de la categoría. Se usa búsqueda aproximada."
                    },
                    "supplierId": {
                        "type": "string",
                        "description": "Id del proveedor (UUID)."
                    },
                    "supplierName": {
                        "type": "string",
                        "description": "Nombre (o parte del nombre) del proveedor. Se usa búsqueda aproximada."
                    },
                    "lowStockOnly": {
                        "type": "boolean",
                        "description": "Si es true, se devuelven solo artículos con stock por debajo o igual al punto de reorden.",
                        "default": false
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Máximo de artículos a devolver.",
                        "default": 50
                    }
                },
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "get_sales_summary".into(),
            description: "Obtiene un resumen de ventas (unidades y transacciones) en un rango \
                          de fechas para un artículo y/o almacén. Úsalo para preguntas sobre \
                          ventas o consumo histórico."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "articleId": { "type": "string", "description": "Id del artículo (UUID)." },
                    "stockroomId": { "type": "string", "description": "Id del almacén (UUID)." },
                    "from": { "type": "string", "description": "Fecha ISO inicio (YYYY-MM-DD o ISO8601)." },
                    "to": { "type": "string", "description": "Fecha ISO fin (YYYY-MM-DD o ISO8601)." }
                },
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "get_top_selling_articles".into(),
            description: "Devuelve los artículos más vendidos en una ventana de tiempo (por \
                          defecto últimos 30 días). Útil para ranking de ventas."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "stockroomId": { "type": "string", "description": "Id del almacén (UUID). Opcional." },
                    "days": { "type": "integer", "description": "Ventana en días (por defecto 30).", "default": 30 },
                    "limit": { "type": "integer", "description": "Máximo de artículos.", "default": 10 }
                },
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "get_stock_movements".into(),
            description: "Lista movimientos de inventario (IN/OUT/ADJUSTMENT) para auditoría \
                          y explicación de variaciones de stock."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "articleId": { "type": "string", "description": "Id del artículo (UUID)." },
                    "stockroomId": { "type": "string", "description": "Id del almacén (UUID)." },
                    "type": {
                        "type": "string",
                        "enum": ["IN", "OUT", "ADJUSTMENT"],
                        "description": "Tipo de movimiento."
                    },
                    "from": { "type": "string", "description": "Fecha ISO inicio (YYYY-MM-DD o ISO8601)." },
                    "to": { "type": "string", "description": "Fecha ISO fin (YYYY-MM-DD o ISO8601)." },
                    "limit": { "type": "integer", "description": "Máximo de registros.", "default": 50 }
                },
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "predict_stockout_date".into(),
            description: "Estima la fecha de quiebre de stock usando el stock actual del \
                          artículo y el promedio diario de ventas en una ventana (por defecto \
                          30 días)."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "articleId": { "type": "string", "description": "Id del artículo (UUID). Requerido." },
                    "stockroomId": { "type": "string", "description": "Id del almacén (UUID). Opcional." },
                    "days": { "type": "integer", "description": "Ventana en días para calcular promedio.", "default": 30 }
                },
                "required": ["articleId"],
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "create_category".into(),
            description: "Crea una categoría de artículos para el usuario. Requiere el nombre; \
                          la descripción es opcional. Úsalo solo cuando ya tengas el nombre \
                          confirmado por el usuario."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Nombre de la categoría. Obligatorio." },
                    "description": { "type": "string", "description": "Descripción de la categoría. Opcional." }
                },
                "required": ["name"],
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "create_stockroom".into(),
            description: "Crea un almacén (bodega) para el usuario. Requiere el nombre; la \
                          dirección es opcional. Úsalo solo cuando ya tengas el nombre \
                          confirmado por el usuario."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Nombre del almacén. Obligatorio." },
                    "address": { "type": "string", "description": "Dirección del almacén. Opcional." }
                },
                "required": ["name"],
                "additionalProperties": false
            })),
        },
        FunctionDeclaration {
            name: "create_supplier".into(),
            description: "Crea un proveedor. Requiere nombre y NIT; dirección y teléfono son \
                          opcionales. Si ya existe un proveedor con el mismo NIT, se devuelve \
                          el existente."
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Nombre del proveedor. Obligatorio." },
                    "nit": { "type": "string", "description": "NIT del proveedor. Obligatorio." },
                    "address": { "type": "string", "description": "Dirección del proveedor. Opcional." },
                    "phone": { "type": "string", "description": "Teléfono del proveedor. Opcional." }
                },
                "required": ["name", "nit"],
                "additionalProperties": false
            })),
        },
    ]
}
