// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Process configuration
//!
//! Values come from `<config_dir>/sfcms/config.json` when it exists, then
//! environment variables override them:
//!
//! | Variable               | Field               |
//! |------------------------|---------------------|
//! | `SF_CLIENT_ID`         | `client_id`         |
//! | `SF_USERNAME`          | `username`          |
//! | `SF_PRIVATE_KEY_PATH`  | `private_key_path`  |
//! | `SF_WORKSPACE_NAME`    | `workspace_name`    |
//! | `SF_API_VERSION`       | `api_version`       |
//! | `SF_SANDBOX`           | `sandbox`           |
//! | `SF_LOGIN_URL`         | `login_url`         |
//! | `SF_HTTP_TIMEOUT_SECS` | `http_timeout_secs` |

use crate::error::{CmsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LOGIN_URL_PRODUCTION: &str = "https://login.salesforce.com";
pub const LOGIN_URL_SANDBOX: &str = "https://test.salesforce.com";

fn default_api_version() -> String {
    "60.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Connected app consumer key, used as the JWT issuer
    pub client_id: Option<String>,
    /// User the server acts as, used as the JWT subject
    pub username: Option<String>,
    /// PEM-encoded RSA key registered with the connected app
    pub private_key_path: Option<PathBuf>,
    /// Display name of the CMS workspace to operate in
    pub workspace_name: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub sandbox: bool,
    /// Token endpoint host override (e.g. a My Domain URL)
    pub login_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            username: None,
            private_key_path: None,
            workspace_name: None,
            api_version: default_api_version(),
            sandbox: false,
            login_url: None,
            http_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fully populated identity, produced by [`CmsConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub client_id: String,
    pub username: String,
    pub private_key_path: PathBuf,
    pub workspace_name: String,
    pub api_version: String,
    /// JWT audience: the production or sandbox login host
    pub audience: String,
    /// Host that receives the token exchange
    pub login_url: String,
}

impl ServiceIdentity {
    pub fn token_url(&self) -> String {
        format!("{}/services/oauth2/token", self.login_url.trim_end_matches('/'))
    }
}

impl CmsConfig {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`CmsConfig::load`], reading an explicit file instead of the
    /// default location. An explicit file must exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CmsError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| CmsError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Get the configuration file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sfcms").join("config.json"))
    }

    /// Overlay values from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SF_CLIENT_ID") {
            self.client_id = Some(v);
        }
        if let Some(v) = get("SF_USERNAME") {
            self.username = Some(v);
        }
        if let Some(v) = get("SF_PRIVATE_KEY_PATH") {
            self.private_key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("SF_WORKSPACE_NAME") {
            self.workspace_name = Some(v);
        }
        if let Some(v) = get("SF_API_VERSION") {
            self.api_version = v.trim_start_matches('v').to_string();
        }
        if let Some(v) = get("SF_SANDBOX") {
            self.sandbox = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = get("SF_LOGIN_URL") {
            self.login_url = Some(v);
        }
        if let Some(v) = get("SF_HTTP_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.http_timeout_secs = secs,
                Err(_) => log::warn!("ignoring non-numeric SF_HTTP_TIMEOUT_SECS={}", v),
            }
        }
    }

    /// JWT audience for the configured environment
    pub fn audience(&self) -> &'static str {
        if self.sandbox {
            LOGIN_URL_SANDBOX
        } else {
            LOGIN_URL_PRODUCTION
        }
    }

    /// Check that every required value is present.
    ///
    /// Reports all missing variables at once.
    pub fn validate(&self) -> Result<ServiceIdentity> {
        let mut missing = Vec::new();
        if self.client_id.is_none() {
            missing.push("SF_CLIENT_ID");
        }
        if self.username.is_none() {
            missing.push("SF_USERNAME");
        }
        if self.private_key_path.is_none() {
            missing.push("SF_PRIVATE_KEY_PATH");
        }
        if self.workspace_name.is_none() {
            missing.push("SF_WORKSPACE_NAME");
        }
        if !missing.is_empty() {
            return Err(CmsError::Config(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )));
        }
        if self.api_version.is_empty() {
            return Err(CmsError::Config("SF_API_VERSION is empty".to_string()));
        }

        let audience = self.audience().to_string();
        Ok(ServiceIdentity {
            client_id: self.client_id.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            private_key_path: self.private_key_path.clone().unwrap_or_default(),
            workspace_name: self.workspace_name.clone().unwrap_or_default(),
            api_version: self.api_version.clone(),
            login_url: self
                .login_url
                .clone()
                .unwrap_or_else(|| audience.clone()),
            audience,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn configured(pairs: &[(&str, &str)]) -> CmsConfig {
        let vars = env(pairs);
        let mut config = CmsConfig::default();
        config.apply_overrides(|k| vars.get(k).cloned());
        config
    }

    #[test]
    fn test_missing_values_are_all_reported() {
        let err = configured(&[("SF_USERNAME", "ops@example.com")])
            .validate()
            .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, CmsError::Config(_)));
        assert!(msg.contains("SF_CLIENT_ID"));
        assert!(msg.contains("SF_PRIVATE_KEY_PATH"));
        assert!(msg.contains("SF_WORKSPACE_NAME"));
        assert!(!msg.contains("SF_USERNAME"));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let config = configured(&[("SF_CLIENT_ID", "  ")]);
        assert!(config.client_id.is_none());
    }

    #[test]
    fn test_production_identity() {
        let identity = configured(&[
            ("SF_CLIENT_ID", "3MVG9abc"),
            ("SF_USERNAME", "ops@example.com"),
            ("SF_PRIVATE_KEY_PATH", "/etc/sfcms/server.key"),
            ("SF_WORKSPACE_NAME", "Marketing"),
            ("SF_API_VERSION", "v61.0"),
        ])
        .validate()
        .unwrap();
        assert_eq!(identity.audience, LOGIN_URL_PRODUCTION);
        assert_eq!(identity.api_version, "61.0");
        assert_eq!(
            identity.token_url(),
            "https://login.salesforce.com/services/oauth2/token"
        );
    }

    #[test]
    fn test_sandbox_with_login_override() {
        let identity = configured(&[
            ("SF_CLIENT_ID", "3MVG9abc"),
            ("SF_USERNAME", "ops@example.com.uat"),
            ("SF_PRIVATE_KEY_PATH", "server.key"),
            ("SF_WORKSPACE_NAME", "Marketing"),
            ("SF_SANDBOX", "true"),
            ("SF_LOGIN_URL", "https://acme--uat.sandbox.my.salesforce.com/"),
        ])
        .validate()
        .unwrap();
        assert_eq!(identity.audience, LOGIN_URL_SANDBOX);
        assert_eq!(
            identity.token_url(),
            "https://acme--uat.sandbox.my.salesforce.com/services/oauth2/token"
        );
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"client_id":"from-file","workspace_name":"Docs","http_timeout_secs":5}"#,
        )
        .unwrap();

        let mut config = CmsConfig::from_file(&path).unwrap();
        assert_eq!(config.api_version, "60.0");
        assert_eq!(config.http_timeout_secs, 5);

        let vars = env(&[("SF_CLIENT_ID", "from-env")]);
        config.apply_overrides(|k| vars.get(k).cloned());
        assert_eq!(config.client_id.as_deref(), Some("from-env"));
        assert_eq!(config.workspace_name.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CmsConfig::from_file(&path),
            Err(CmsError::Config(_))
        ));
    }
}
