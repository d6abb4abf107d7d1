// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! sfcms MCP Server - Entry point
//!
//! This binary provides a Model Context Protocol (MCP) server that exposes
//! a Salesforce CMS workspace to AI agents.
//!
//! # Usage
//!
//! The server communicates via stdio (stdin/stdout) using JSON-RPC 2.0.
//! Logs go to stderr; set `RUST_LOG=debug` for request traces.
//!
//! ## Available Tools
//!
//! - `cms_list_content` - List content in the workspace channel
//! - `cms_search_content` - Search content by term
//! - `cms_get_content` - Get content by id or content key
//! - `cms_get_content_types` - List content types
//! - `cms_prepare_email_creation` - Issue a clearance token for email creation
//! - `cms_validate_block_tree` - Check an email block tree
//! - `cms_create_content` - Create content (email needs a clearance token)
//! - `cms_update_content_body` - Replace a content body
//! - `cms_update_content_metadata` - Change title or API name
//! - `cms_publish_content` - Publish content
//! - `cms_delete_content` - Delete content
//! - `cms_session_info` - Show the resolved workspace and channel
//!
//! # Configuration
//!
//! Required environment: `SF_CLIENT_ID`, `SF_USERNAME`, `SF_PRIVATE_KEY_PATH`,
//! `SF_WORKSPACE_NAME`. See `sfcms::config` for the full list.
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "sfcms": {
//!       "command": "sfcms-mcp",
//!       "env": { "SF_WORKSPACE_NAME": "Marketing" }
//!     }
//!   }
//! }
//! ```

use sfcms::config::CmsConfig;
use sfcms::context::CmsContext;
use sfcms::mcp::McpServer;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let context = match CmsConfig::load().and_then(|config| CmsContext::from_config(&config)) {
        Ok(context) => context,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    let mut server = McpServer::new(context);
    if let Err(e) = server.run().await {
        log::error!("server error: {}", e);
        std::process::exit(1);
    }
}
