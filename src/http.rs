// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! HTTP collaborator for the CMS API
//!
//! Everything that talks to the network goes through [`HttpTransport`], so
//! the session manager and client can be exercised against fakes.

use crate::error::{CmsError, Result};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body (204) reads as `null`
    pub fn json(&self) -> Result<serde_json::Value> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Issues one request and returns status plus body, or fails at the
/// transport level. Non-2xx statuses are *not* errors here.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("sfcms/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build a configured HTTP client
pub fn build_http_client(config: &HttpClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| CmsError::Http(format!("Failed to build HTTP client: {}", e)))
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        log::debug!("{} {}", request.method, request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Patch => self.client.patch(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        builder = builder.header("Accept", "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| CmsError::Http(format!("{} {}: {}", request.method, request.url, e)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CmsError::Http(format!("reading response body: {}", e)))?;

        log::debug!("{} {} -> {}", request.method, request.url, status);
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_parses_as_null() {
        let response = HttpResponse::new(204, "");
        assert!(response.is_success());
        assert_eq!(response.json().unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_non_success_status() {
        assert!(!HttpResponse::new(404, "[]").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
    }
}
