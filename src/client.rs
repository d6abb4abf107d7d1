// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! CMS Connect API client
//!
//! One method per remote capability. Each call refreshes the session first
//! when needed and reports failures with the step that failed.

use crate::auth::SessionManager;
use crate::error::{CmsError, Result};
use crate::http::{HttpRequest, Method};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Content type tag of email content; the only type behind a clearance gate
pub const EMAIL_CONTENT_TYPE: &str = "sfdc_cms__email";
/// Body field that carries the block tree of email content
pub const BLOCK_TREE_FIELD: &str = "sfdc_cms:block";

const MAX_PAGE_SIZE: usize = 250;

// =============================================================================
// Types
// =============================================================================

/// One item from a list or search page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSummary {
    pub id: String,
    pub content_key: Option<String>,
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub url_name: Option<String>,
    pub published_date: Option<String>,
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        .map(String::from)
}

impl ContentSummary {
    /// Read an item from whichever field names the endpoint used.
    ///
    /// Returns `None` when no identifier can be found.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = first_str(value, &["managedContentId", "contentId", "id", "Id"])?;
        // contentType is a string on some endpoints and an object on others
        let content_type = first_str(value, &["contentType", "type"]).or_else(|| {
            value
                .get("contentType")
                .and_then(|t| first_str(t, &["fullyQualifiedName", "developerName", "name"]))
        });
        Some(Self {
            id,
            content_key: first_str(value, &["contentKey", "managedContentKey"]),
            title: first_str(value, &["title", "name", "Name"]),
            content_type,
            url_name: first_str(value, &["contentUrlName", "urlName", "apiName"]),
            published_date: first_str(value, &["publishedDate", "lastPublishedDate"]),
        })
    }

    /// Parse a page of items; accepts a bare array or the usual wrappers
    pub fn parse_page(value: &Value) -> Vec<Self> {
        let items = match value {
            Value::Array(items) => Some(items),
            _ => ["items", "contents", "results", "records"]
                .iter()
                .find_map(|k| value.get(*k).and_then(Value::as_array)),
        };
        items
            .map(|items| items.iter().filter_map(Self::from_value).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeInfo {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "DeveloperName")]
    pub developer_name: String,
    #[serde(rename = "MasterLabel", default)]
    pub label: Option<String>,
}

/// Everything needed to create a content item
#[derive(Debug, Clone, Default)]
pub struct ContentDescriptor {
    /// Target space or folder; defaults to the session workspace
    pub space_id: Option<String>,
    pub content_type: String,
    pub title: String,
    pub body: Map<String, Value>,
    /// Caller-chosen external key
    pub api_name: Option<String>,
}

impl ContentDescriptor {
    pub fn is_email(&self) -> bool {
        self.content_type == EMAIL_CONTENT_TYPE
    }

    /// Build the create request body
    pub fn envelope(&self, default_space: &str) -> Value {
        let mut body = self.body.clone();
        if self.is_email() {
            let has_title = body
                .get("title")
                .and_then(Value::as_str)
                .is_some_and(|t| !t.trim().is_empty());
            if !has_title {
                body.insert("title".to_string(), Value::String(self.title.clone()));
            }
        }

        let mut envelope = json!({
            "contentSpaceOrFolderId": self.space_id.as_deref().unwrap_or(default_space),
            "contentType": self.content_type,
            "title": self.title,
            "contentBody": body,
        });
        if let Some(api_name) = &self.api_name {
            envelope["apiName"] = Value::String(api_name.clone());
        }
        envelope
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "apiName", skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
}

impl MetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.api_name.is_none()
    }
}

// =============================================================================
// Client
// =============================================================================

pub struct CmsClient {
    session: SessionManager,
}

fn page_size(limit: usize) -> usize {
    limit.clamp(1, MAX_PAGE_SIZE)
}

impl CmsClient {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionManager {
        &mut self.session
    }

    async fn execute(
        &mut self,
        step: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        self.session
            .ensure_authenticated()
            .await
            .map_err(|e| e.context(step))?;

        let url = format!("{}{}", self.session.api_base()?, path);
        let mut request = HttpRequest::new(method, url).bearer(self.session.bearer()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self
            .session
            .transport()
            .send(request)
            .await
            .map_err(|e| e.context(step))?;

        if response.status == 404 {
            return Err(CmsError::NotFound(format!(
                "{} (HTTP 404): {}",
                step, response.body
            )));
        }
        if !response.is_success() {
            return Err(CmsError::Remote {
                step: step.to_string(),
                status: response.status,
                body: response.body,
            });
        }
        response.json().map_err(|e| e.context(step))
    }

    async fn channel_path(&mut self, step: &str) -> Result<String> {
        self.session
            .ensure_authenticated()
            .await
            .map_err(|e| e.context(step))?;
        Ok(format!(
            "/connect/cms/delivery/channels/{}/contents",
            urlencoding::encode(self.session.channel_id()?)
        ))
    }

    pub async fn list(&mut self, limit: usize) -> Result<Vec<ContentSummary>> {
        let path = format!(
            "{}/query?pageSize={}",
            self.channel_path("list content").await?,
            page_size(limit)
        );
        let page = self.execute("list content", Method::Get, &path, None).await?;
        Ok(ContentSummary::parse_page(&page))
    }

    pub async fn search(&mut self, term: &str, limit: usize) -> Result<Vec<ContentSummary>> {
        let path = format!(
            "{}/search?queryTerm={}&pageSize={}",
            self.channel_path("search content").await?,
            urlencoding::encode(term),
            page_size(limit)
        );
        let page = self.execute("search content", Method::Get, &path, None).await?;
        Ok(ContentSummary::parse_page(&page))
    }

    /// Resolve a content key to its internal id via search
    async fn resolve_key(&mut self, key: &str) -> Result<Option<String>> {
        let items = self.search(key, 10).await?;
        Ok(items
            .into_iter()
            .find(|item| item.content_key.as_deref() == Some(key))
            .map(|item| item.id))
    }

    /// Fetch full detail for a content id or content key
    pub async fn get(&mut self, id_or_key: &str) -> Result<Value> {
        let id = match self.resolve_key(id_or_key).await {
            Ok(Some(id)) => {
                log::debug!("content key {} resolved to {}", id_or_key, id);
                id
            }
            Ok(None) => id_or_key.to_string(),
            Err(e) => {
                log::debug!("key lookup for {} failed: {}", id_or_key, e);
                id_or_key.to_string()
            }
        };
        let path = format!("/connect/cms/contents/{}", urlencoding::encode(&id));
        self.execute("get content", Method::Get, &path, None).await
    }

    pub async fn create(&mut self, descriptor: &ContentDescriptor) -> Result<Value> {
        self.session
            .ensure_authenticated()
            .await
            .map_err(|e| e.context("create content"))?;
        let envelope = descriptor.envelope(self.session.workspace_id()?);
        log::info!(
            "creating {} content \"{}\"",
            descriptor.content_type,
            descriptor.title
        );
        self.execute(
            "create content",
            Method::Post,
            "/connect/cms/contents",
            Some(envelope),
        )
        .await
    }

    pub async fn update_body(&mut self, id: &str, body: Map<String, Value>) -> Result<Value> {
        let path = format!("/connect/cms/contents/{}", urlencoding::encode(id));
        self.execute(
            "update content body",
            Method::Patch,
            &path,
            Some(json!({ "contentBody": body })),
        )
        .await
    }

    pub async fn update_metadata(&mut self, id: &str, patch: &MetadataPatch) -> Result<Value> {
        if patch.is_empty() {
            return Err(CmsError::InvalidArgument(
                "metadata update needs a title or apiName".to_string(),
            ));
        }
        let path = format!("/connect/cms/contents/{}", urlencoding::encode(id));
        let body = serde_json::to_value(patch)?;
        self.execute("update content metadata", Method::Patch, &path, Some(body))
            .await
    }

    pub async fn get_types(&mut self) -> Result<Vec<ContentTypeInfo>> {
        let step = "get content types";
        self.session
            .ensure_authenticated()
            .await
            .map_err(|e| e.context(step))?;
        self.session
            .query(
                "SELECT Id, DeveloperName, MasterLabel FROM ManagedContentType ORDER BY DeveloperName",
            )
            .await
            .map_err(|e| match e {
                CmsError::Remote { status, body, .. } => CmsError::Remote {
                    step: step.to_string(),
                    status,
                    body,
                },
                other => other.context(step),
            })
    }

    pub async fn publish(&mut self, id: &str) -> Result<bool> {
        self.execute(
            "publish content",
            Method::Post,
            "/connect/cms/contents/publish",
            Some(json!({ "contentIds": [id] })),
        )
        .await?;
        log::info!("published {}", id);
        Ok(true)
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let path = format!("/connect/cms/contents/{}", urlencoding::encode(id));
        self.execute("delete content", Method::Delete, &path, None)
            .await?;
        log::info!("deleted {}", id);
        Ok(true)
    }
}
