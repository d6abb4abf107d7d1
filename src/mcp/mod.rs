// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! MCP (Model Context Protocol) server for the CMS bridge
//!
//! Exposes the Salesforce CMS workspace to AI agents, enabling them to:
//! - List, search and read content items
//! - Create, update, publish and delete content
//! - Validate email block trees before creating them
//! - Read the guides that email creation requires

pub mod resources;
pub mod server;
pub mod tools;
pub mod types;

pub use server::McpServer;
