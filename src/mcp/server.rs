// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! MCP Server - Main server implementation using stdio transport
//!
//! Requests are handled one at a time: a tool call runs to completion before
//! the next line is read, so the session and clearance registry never see
//! concurrent access.

use super::resources;
use super::tools;
use super::types::*;
use crate::context::CmsContext;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

const INSTRUCTIONS: &str = "Tools for the Salesforce CMS workspace. Before creating \
email content call cms_prepare_email_creation, read the guides it lists, and validate \
the block tree with cms_validate_block_tree.";

/// MCP Server for the CMS bridge
pub struct McpServer {
    context: CmsContext,
    initialized: bool,
}

fn preview(s: &str) -> &str {
    match s.char_indices().nth(100) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

impl McpServer {
    pub fn new(context: CmsContext) -> Self {
        Self {
            context,
            initialized: false,
        }
    }

    pub fn context(&self) -> &CmsContext {
        &self.context
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server using stdio transport
    pub async fn run(&mut self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve line-delimited JSON-RPC until the reader is exhausted
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        log::info!("server starting");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            log::debug!("received: {}", preview(line));

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    log::warn!("parse error: {}", e);
                    Some(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            if let Some(response) = response {
                let response_str = serde_json::to_string(&response)?;
                log::debug!("sending: {}", preview(&response_str));
                writer.write_all(response_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        log::info!("stdin closed, server stopping");
        Ok(())
    }

    /// Handle one request; notifications produce no response
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            if request.method == "notifications/initialized" || request.method == "initialized" {
                self.initialized = true;
            }
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(request.id, json!({ "tools": tools::list_tools() }))
            }
            "tools/call" => self.handle_tools_call(request).await,
            "resources/list" => JsonRpcResponse::success(
                request.id,
                json!({ "resources": resources::list_resources() }),
            ),
            "resources/read" => self.handle_resources_read(request),
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability {
                    list_changed: false,
                }),
                resources: Some(ListChangedCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "sfcms-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(request.id, INVALID_PARAMS, e.to_string()),
        }
    }

    async fn handle_tools_call(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolParams = match serde_json::from_value(request.params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                )
            }
        };

        let result = tools::call_tool(&mut self.context, &params.name, &params.arguments).await;
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(request.id, INVALID_PARAMS, e.to_string()),
        }
    }

    fn handle_resources_read(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: ReadResourceParams = match serde_json::from_value(request.params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                )
            }
        };

        match resources::read_resource(&params.uri) {
            Some(result) => match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(request.id, value),
                Err(e) => JsonRpcResponse::error(request.id, INVALID_PARAMS, e.to_string()),
            },
            None => JsonRpcResponse::error(
                request.id,
                INVALID_PARAMS,
                format!("Unknown resource: {}", params.uri),
            ),
        }
    }
}
