// ABOUTME: Service layer for the assistant conversation engine
// ABOUTME: Deterministic pending-action helpers plus the orchestrating chat service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jelt

//! Assistant services

mod assistant;
pub mod pending;

pub use assistant::{AssistantService, ChatOutcome, ChatTurn, MAX_TOOL_ROUNDS};
