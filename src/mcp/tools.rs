// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! MCP Tools - Expose the CMS API as MCP tools

use super::types::*;
use crate::clearance::OperationClass;
use crate::client::{ContentDescriptor, MetadataPatch, EMAIL_CONTENT_TYPE};
use crate::context::CmsContext;
use crate::error::{CmsError, Result};
use crate::validate::{validate, ContentNode};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

const DEFAULT_LIMIT: usize = 20;

/// Get the list of available tools
pub fn list_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "cms_list_content".to_string(),
            description: "List content items published to the workspace channel".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of items (default: 20, max: 250)"
                    }
                },
                "required": []
            }),
        },
        Tool {
            name: "cms_search_content".to_string(),
            description: "Full-text search over content in the workspace channel".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search term"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 20)"
                    }
                },
                "required": ["query"]
            }),
        },
        Tool {
            name: "cms_get_content".to_string(),
            description: "Get full detail of a content item by id or content key".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content_id": {
                        "type": "string",
                        "description": "Managed content id or content key"
                    }
                },
                "required": ["content_id"]
            }),
        },
        Tool {
            name: "cms_get_content_types".to_string(),
            description: "List the content types available in the org".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        Tool {
            name: "cms_prepare_email_creation".to_string(),
            description: format!(
                "Required before creating {} content. Returns a single-use clearance token \
                 and the guides to read first.",
                EMAIL_CONTENT_TYPE
            ),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        Tool {
            name: "cms_validate_block_tree".to_string(),
            description: "Check an email block tree for id and nesting errors before creating it"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tree": {
                        "type": "object",
                        "description": "Root node: { id, definition, attributes?, children[] }"
                    }
                },
                "required": ["tree"]
            }),
        },
        Tool {
            name: "cms_create_content".to_string(),
            description: format!(
                "Create a content item. {} content needs a clearance_token from \
                 cms_prepare_email_creation.",
                EMAIL_CONTENT_TYPE
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content_type": {
                        "type": "string",
                        "description": "Content type developer name, e.g. sfdc_cms__email"
                    },
                    "title": {
                        "type": "string",
                        "description": "Content title"
                    },
                    "body": {
                        "type": "object",
                        "description": "Content body fields"
                    },
                    "api_name": {
                        "type": "string",
                        "description": "Optional API name (external key)"
                    },
                    "space_id": {
                        "type": "string",
                        "description": "Target space or folder id (defaults to the workspace)"
                    },
                    "clearance_token": {
                        "type": "string",
                        "description": "Token from cms_prepare_email_creation (email only)"
                    }
                },
                "required": ["content_type", "title"]
            }),
        },
        Tool {
            name: "cms_update_content_body".to_string(),
            description: "Replace the body of a content item".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content_id": { "type": "string", "description": "Managed content id" },
                    "body": { "type": "object", "description": "New content body" }
                },
                "required": ["content_id", "body"]
            }),
        },
        Tool {
            name: "cms_update_content_metadata".to_string(),
            description: "Change the title or API name of a content item".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content_id": { "type": "string", "description": "Managed content id" },
                    "title": { "type": "string", "description": "New title" },
                    "api_name": { "type": "string", "description": "New API name" }
                },
                "required": ["content_id"]
            }),
        },
        Tool {
            name: "cms_publish_content".to_string(),
            description: "Publish a content item".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content_id": { "type": "string", "description": "Managed content id" }
                },
                "required": ["content_id"]
            }),
        },
        Tool {
            name: "cms_delete_content".to_string(),
            description: "Delete a content item".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content_id": { "type": "string", "description": "Managed content id" }
                },
                "required": ["content_id"]
            }),
        },
        Tool {
            name: "cms_session_info".to_string(),
            description: "Authenticate if needed and show the resolved workspace and channel"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ]
}

// ============================================================================
// Argument helpers
// ============================================================================

fn required_str<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
    optional_str(arguments, key)
        .ok_or_else(|| CmsError::InvalidArgument(format!("`{}` is required", key)))
}

fn optional_str<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn limit_arg(arguments: &HashMap<String, Value>) -> usize {
    arguments
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_LIMIT)
}

/// Object argument; a JSON-encoded string is accepted as well
fn object_arg(arguments: &HashMap<String, Value>, key: &str) -> Result<Option<Map<String, Value>>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            _ => Err(CmsError::InvalidArgument(format!(
                "`{}` must be a JSON object",
                key
            ))),
        },
        Some(_) => Err(CmsError::InvalidArgument(format!(
            "`{}` must be a JSON object",
            key
        ))),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult> {
    Ok(CallToolResult::text(serde_json::to_string_pretty(value)?))
}

/// Render an error for the client, with remote status and body when present
pub fn error_result(err: &CmsError) -> CallToolResult {
    let mut text = format!("Error: {}", err);
    if let Some(status) = err.status() {
        text.push_str(&format!("\nStatus: {}", status));
    }
    if let Some(body) = err.body().filter(|b| !b.is_empty()) {
        text.push_str(&format!("\nResponse body: {}", body));
    }
    CallToolResult::error(text)
}

// ============================================================================
// Dispatch
// ============================================================================

/// Execute a tool call
pub async fn call_tool(
    ctx: &mut CmsContext,
    name: &str,
    arguments: &HashMap<String, Value>,
) -> CallToolResult {
    log::info!("tool call: {}", name);
    match dispatch(ctx, name, arguments).await {
        Ok(result) => result,
        Err(e) => {
            log::warn!("{} failed: {}", name, e);
            error_result(&e)
        }
    }
}

async fn dispatch(
    ctx: &mut CmsContext,
    name: &str,
    arguments: &HashMap<String, Value>,
) -> Result<CallToolResult> {
    match name {
        "cms_list_content" => {
            let items = ctx.client.list(limit_arg(arguments)).await?;
            if items.is_empty() {
                return Ok(CallToolResult::text("No content found."));
            }
            json_result(&items)
        }
        "cms_search_content" => {
            let query = required_str(arguments, "query")?;
            let items = ctx.client.search(query, limit_arg(arguments)).await?;
            if items.is_empty() {
                return Ok(CallToolResult::text(format!(
                    "No content matches \"{}\".",
                    query
                )));
            }
            json_result(&items)
        }
        "cms_get_content" => {
            let id = required_str(arguments, "content_id")?;
            json_result(&ctx.client.get(id).await?)
        }
        "cms_get_content_types" => json_result(&ctx.client.get_types().await?),
        "cms_prepare_email_creation" => {
            let grant = ctx.prepare(OperationClass::EmailCreation);
            let reading = grant
                .required_reading
                .iter()
                .map(|uri| format!("  - {}", uri))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(CallToolResult::text(format!(
                "Clearance token: {}\nExpires at: {}\n\n\
                 Read these resources before building the email:\n{}\n\n\
                 Then validate the block tree with cms_validate_block_tree and pass the token \
                 as `clearance_token` to cms_create_content. The token works once.",
                grant.token,
                grant.expires_at.to_rfc3339(),
                reading
            )))
        }
        "cms_validate_block_tree" => {
            let tree = object_arg(arguments, "tree")?
                .ok_or_else(|| CmsError::InvalidArgument("`tree` is required".to_string()))?;
            let root: ContentNode = serde_json::from_value(Value::Object(tree))
                .map_err(|e| CmsError::InvalidArgument(format!("`tree` is malformed: {}", e)))?;
            Ok(CallToolResult::text(validate(&root).to_string()))
        }
        "cms_create_content" => {
            let descriptor = ContentDescriptor {
                space_id: optional_str(arguments, "space_id").map(String::from),
                content_type: required_str(arguments, "content_type")?.to_string(),
                title: required_str(arguments, "title")?.to_string(),
                body: object_arg(arguments, "body")?.unwrap_or_default(),
                api_name: optional_str(arguments, "api_name").map(String::from),
            };
            let token = optional_str(arguments, "clearance_token");
            json_result(&ctx.gated_create(token, &descriptor).await?)
        }
        "cms_update_content_body" => {
            let id = required_str(arguments, "content_id")?;
            let body = object_arg(arguments, "body")?
                .ok_or_else(|| CmsError::InvalidArgument("`body` is required".to_string()))?;
            json_result(&ctx.client.update_body(id, body).await?)
        }
        "cms_update_content_metadata" => {
            let id = required_str(arguments, "content_id")?;
            let patch = MetadataPatch {
                title: optional_str(arguments, "title").map(String::from),
                api_name: optional_str(arguments, "api_name").map(String::from),
            };
            json_result(&ctx.client.update_metadata(id, &patch).await?)
        }
        "cms_publish_content" => {
            let id = required_str(arguments, "content_id")?;
            ctx.client.publish(id).await?;
            Ok(CallToolResult::text(format!("Published {}", id)))
        }
        "cms_delete_content" => {
            let id = required_str(arguments, "content_id")?;
            ctx.client.delete(id).await?;
            Ok(CallToolResult::text(format!("Deleted {}", id)))
        }
        "cms_session_info" => {
            ctx.client.session_mut().ensure_authenticated().await?;
            json_result(&ctx.client.session().info())
        }
        _ => Ok(CallToolResult::error(format!("Unknown tool: {}", name))),
    }
}
