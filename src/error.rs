// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Error types for sfcms

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Clearance required: {0}")]
    Clearance(String),

    #[error("Block tree validation failed: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{step} failed with HTTP {status}")]
    Remote {
        step: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CmsError {
    /// Remote status code, when the failure came back from the CMS API
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw remote response body, when there is one
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Remote { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }

    /// Prefix the message with the step that failed.
    ///
    /// Remote errors already carry their step and are returned unchanged.
    pub fn context(self, step: &str) -> Self {
        match self {
            Self::Config(m) => Self::Config(format!("{}: {}", step, m)),
            Self::Authentication(m) => Self::Authentication(format!("{}: {}", step, m)),
            Self::NotFound(m) => Self::NotFound(format!("{}: {}", step, m)),
            Self::Http(m) => Self::Http(format!("{}: {}", step, m)),
            Self::JsonError(e) => Self::Http(format!("{}: malformed response: {}", step, e)),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_exposes_status_and_body() {
        let err = CmsError::Remote {
            step: "publish content".to_string(),
            status: 409,
            body: "[{\"errorCode\":\"ALREADY_PUBLISHED\"}]".to_string(),
        };
        assert_eq!(err.status(), Some(409));
        assert!(err.body().unwrap().contains("ALREADY_PUBLISHED"));
        assert_eq!(err.to_string(), "publish content failed with HTTP 409");
    }

    #[test]
    fn test_context_prefixes_step() {
        let err = CmsError::Http("connection reset".to_string()).context("list content");
        assert_eq!(err.to_string(), "HTTP error: list content: connection reset");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_context_keeps_remote_unchanged() {
        let err = CmsError::Remote {
            step: "get content".to_string(),
            status: 500,
            body: String::new(),
        }
        .context("other step");
        assert!(err.to_string().starts_with("get content"));
    }
}
