// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! sfcms - Salesforce CMS bridge library
//!
//! Exposes a Salesforce CMS workspace to language-model agents as MCP tools.
//!
//! ## Layers
//!
//! - [`auth`] - JWT bearer authentication, workspace and channel resolution
//! - [`client`] - one method per CMS Connect API capability
//! - [`clearance`] - single-use tokens gating email creation
//! - [`validate`] - structural checks for email block trees
//! - [`mcp`] - JSON-RPC stdio server and tool catalogue
//!
//! ```rust,ignore
//! use sfcms::{CmsConfig, CmsContext, McpServer};
//!
//! let context = CmsContext::from_config(&CmsConfig::load()?)?;
//! McpServer::new(context).run().await?;
//! ```

pub mod auth;
pub mod clearance;
pub mod cli;
pub mod client;
pub mod clock;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod mcp;
pub mod validate;

// Re-export commonly used items
pub use auth::{SessionInfo, SessionManager};
pub use clearance::{ClearanceGrant, ClearanceRegistry, OperationClass};
pub use client::{CmsClient, ContentDescriptor, ContentSummary, MetadataPatch};
pub use config::{CmsConfig, ServiceIdentity};
pub use context::CmsContext;
pub use error::{CmsError, Result};
pub use mcp::McpServer;
pub use validate::{validate, ContentNode, ValidationReport};
