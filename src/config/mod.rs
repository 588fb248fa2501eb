// ABOUTME: Environment-driven configuration for the assistant engine
// ABOUTME: LLM endpoint settings plus injectable assistant prompt phrasings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! # Configuration
//!
//! Two concerns live here:
//!
//! - [`LlmConfig`]: where the external language model lives and which model
//!   to drive. Loaded from environment variables; the assistant is disabled
//!   when no API key is configured.
//! - [`AssistantPrompts`]: every fixed user-facing string the orchestrator
//!   emits (system instructions, disabled/unauthenticated replies, the
//!   round-exhaustion fallback). Injected rather than hard-coded so tests
//!   and deployments can substitute alternate phrasings or locales.

use std::env;

/// Environment variable for the OpenAI API key
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable for the model identifier
const JELT_LLM_MODEL_ENV: &str = "JELT_LLM_MODEL";

/// Environment variable for an alternate API base URL
const JELT_LLM_BASE_URL_ENV: &str = "JELT_LLM_BASE_URL";

/// Default model when none is configured
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// LLM endpoint configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; `None` disables the assistant
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    /// Base URL of the Responses API endpoint
    pub base_url: String,
}

impl LlmConfig {
    /// Load LLM configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(OPENAI_API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            model: env::var(JELT_LLM_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
            base_url: env::var(JELT_LLM_BASE_URL_ENV)
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
        }
    }

    /// Whether the assistant has credentials to reach the model
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

/// Fixed assistant phrasings, injectable for tests and localization
#[derive(Debug, Clone)]
pub struct AssistantPrompts {
    /// System-instructions block prepended to every LLM context
    pub system_instructions: String,
    /// Reply when no LLM client is configured
    pub disabled_reply: String,
    /// Reply when the turn carries no authenticated user
    pub not_authenticated_reply: String,
    /// Reply when the tool-calling round budget is exhausted
    pub exhausted_reply: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system_instructions: SYSTEM_INSTRUCTIONS.to_owned(),
            disabled_reply: "El asistente de IA está deshabilitado.".to_owned(),
            not_authenticated_reply: "No estás autenticado.".to_owned(),
            exhausted_reply:
                "No pude completar la respuesta con las herramientas disponibles. \
                 Intenta reformular tu pregunta."
                    .to_owned(),
        }
    }
}

/// Reference system instructions for the inventory assistant (Spanish)
const SYSTEM_INSTRUCTIONS: &str = "\
Eres un asistente especializado en inventario de la aplicación Jelt.
Ayudas a los usuarios a consultar y gestionar información de inventario
de forma segura y clara.

CAPACIDADES
Puedes ayudar al usuario con:
- Consultar existencia de artículos (stock, almacén, categoría, proveedor).
- Identificar artículos con bajo stock o próximos a agotarse.
- Mostrar distribución de stock por almacén.
- Crear entidades del inventario cuando el usuario lo solicite explícitamente:
  - Categorías
  - Almacenes / Stockrooms
  - Proveedores

REGLAS GENERALES (MUY IMPORTANTES)
- NO inventes datos.
- NO asumas valores que el usuario no haya proporcionado.
- Usa SIEMPRE las funciones disponibles (tools) para consultar o modificar datos reales.
- Nunca inventes IDs ni valores técnicos.
- Si falta información obligatoria para ejecutar una acción, PREGUNTA antes de usar una tool.
- Explica las respuestas en español claro, profesional y conciso.
- Si el resultado es muy grande, resume los datos más relevantes.

REGLAS PARA CREACIÓN DE ENTIDADES
Cuando el usuario pida crear o registrar algo, valida primero los campos obligatorios:

1) Categoría (create_category)
- Obligatorio: name
- Opcional: description
Si falta el nombre:
  Pregunta: \"¿Cuál es el nombre de la categoría?\"

2) Almacén / Stockroom (create_stockroom)
- Obligatorio: name
- Opcional: address
Si falta el nombre:
  Pregunta: \"¿Cuál es el nombre del almacén?\"

3) Proveedor (create_supplier)
- Obligatorio: name y nit
- Opcional: address, phone
Si falta alguno:
  Pregunta SOLO por los campos obligatorios faltantes.
  Ejemplo: \"Para crear el proveedor necesito el nombre y el NIT. ¿Me los indicas?\"

CONTEXTO Y FOLLOW-UPS
- Si tu mensaje anterior solicitó un dato obligatorio (por ejemplo: el nombre), y el \
usuario responde con un texto corto que parece ese valor, interprétalo como la \
respuesta y procede con la acción solicitada usando tools.

IMPORTANTE SOBRE LAS TOOLS
- Solo llama una tool cuando tengas TODOS los campos obligatorios.
- Usa únicamente los parámetros definidos en el schema de la tool.
- No agregues propiedades adicionales.
- Si el usuario no ha dado la información mínima requerida, primero pregunta.

SEGURIDAD Y CONTEXTO DE USUARIO
- Todos los datos de inventario pertenecen al usuario autenticado.
- No menciones ni expongas información técnica como id_user.
- Asume que categorías y almacenes pueden existir previamente y reutilízalos si corresponde.

FORMATO DE RESPUESTA
- Si se crea una entidad: confirma claramente qué se creó y muestra los datos principales.
- Si se consulta información: muestra resultados claros y fáciles de entender.
- Si necesitas datos adicionales: haz una pregunta breve, directa y específica.

Ejemplos de buenas respuestas:
- \"He creado la categoría 'Analgésicos'.\"
- \"Estos artículos tienen bajo stock:\"
- \"Para continuar necesito el nombre del almacén.\"
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        let config = LlmConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_default_prompts_are_spanish() {
        let prompts = AssistantPrompts::default();
        assert!(prompts.system_instructions.contains("inventario"));
        assert_eq!(prompts.disabled_reply, "El asistente de IA está deshabilitado.");
        assert_eq!(prompts.not_authenticated_reply, "No estás autenticado.");
    }
}
