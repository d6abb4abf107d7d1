// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Credential and session management
//!
//! Authenticates with the OAuth 2.0 JWT bearer flow: a short-lived RS256
//! assertion signed with the connected app's private key is exchanged for a
//! bearer token. The session then resolves the CMS workspace (by display
//! name) and a delivery channel for it.
//!
//! Nothing here refreshes in the background. Every remote operation calls
//! [`SessionManager::ensure_authenticated`] first.

use crate::clock::Clock;
use crate::config::ServiceIdentity;
use crate::error::{CmsError, Result};
use crate::http::{HttpRequest, HttpTransport};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Configuration
// =============================================================================

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_MINUTES: i64 = 5;
/// The token endpoint does not report a lifetime unless the org enables it
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;
/// Upper bound on a reported token lifetime
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    /// Connected app consumer key
    pub iss: String,
    /// Username
    pub sub: String,
    /// Login host
    pub aud: String,
    /// Expiration
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub instance_url: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub issued_at: Option<String>,
    /// Number or numeric string; absent on most orgs
    #[serde(default)]
    pub expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    /// Reported lifetime in seconds, capped at one day
    pub fn lifetime_secs(&self) -> Option<i64> {
        match self.expires_in.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|secs| *secs > 0)
        .map(|secs| secs.min(MAX_TOKEN_LIFETIME_SECS))
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse<T> {
    #[serde(rename = "totalSize", default)]
    pub total_size: Option<u64>,
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, Default)]
struct Session {
    access_token: Option<String>,
    instance_url: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    workspace_id: Option<String>,
    channel_id: Option<String>,
}

/// Read-only view of the current session, safe to print
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    pub username: String,
    pub workspace_name: String,
    pub instance_url: Option<String>,
    pub workspace_id: Option<String>,
    pub channel_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct SessionManager {
    identity: ServiceIdentity,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    session: Session,
}

/// Sign a JWT bearer assertion with an RSA private key in PEM form
pub fn sign_assertion(private_key_pem: &[u8], claims: &AssertionClaims) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(private_key_pem)
        .map_err(|e| CmsError::Config(format!("private key is not a valid RSA PEM: {}", e)))?;
    encode(&Header::new(Algorithm::RS256), claims, &key)
        .map_err(|e| CmsError::Authentication(format!("signing assertion: {}", e)))
}

/// Quote a value for use inside a SOQL string literal
pub fn soql_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

impl SessionManager {
    pub fn new(
        identity: ServiceIdentity,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            transport,
            clock,
            session: Session::default(),
        }
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Exchange a fresh assertion for a token and resolve workspace + channel
    pub async fn authenticate(&mut self) -> Result<()> {
        let key_path = &self.identity.private_key_path;
        let key = std::fs::read(key_path).map_err(|e| {
            CmsError::Config(format!(
                "cannot read private key {}: {}",
                key_path.display(),
                e
            ))
        })?;

        let now = self.clock.now();
        let claims = AssertionClaims {
            iss: self.identity.client_id.clone(),
            sub: self.identity.username.clone(),
            aud: self.identity.audience.clone(),
            exp: (now + Duration::minutes(ASSERTION_LIFETIME_MINUTES)).timestamp(),
        };
        let assertion = sign_assertion(&key, &claims)?;

        log::info!(
            "authenticating {} against {}",
            self.identity.username,
            self.identity.login_url
        );
        let token = self.exchange(&assertion).await?;
        let lifetime = token.lifetime_secs().unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        self.session = Session {
            access_token: Some(token.access_token),
            instance_url: Some(token.instance_url.trim_end_matches('/').to_string()),
            expires_at: Some(now + Duration::seconds(lifetime)),
            workspace_id: None,
            channel_id: None,
        };

        // a session without a workspace must not look fresh
        let workspace_id = match self.resolve_workspace().await {
            Ok(id) => id,
            Err(e) => {
                self.session = Session::default();
                return Err(match e {
                    CmsError::NotFound(_) => e,
                    other => {
                        CmsError::Authentication(format!("resolving workspace: {}", other))
                    }
                });
            }
        };
        let channel_id = self.resolve_channel(&workspace_id).await;
        log::info!("workspace {} uses channel {}", workspace_id, channel_id);

        self.session.workspace_id = Some(workspace_id);
        self.session.channel_id = Some(channel_id);
        Ok(())
    }

    async fn exchange(&self, assertion: &str) -> Result<TokenResponse> {
        let request = HttpRequest::post(self.identity.token_url())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)]);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| CmsError::Authentication(format!("token exchange: {}", e)))?;

        if !response.is_success() {
            return Err(CmsError::Authentication(format!(
                "token endpoint returned {}: {}",
                response.status, response.body
            )));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| CmsError::Authentication(format!("malformed token response: {}", e)))
    }

    /// True when a token is held and is not within the refresh margin
    pub fn is_fresh(&self) -> bool {
        match (&self.session.access_token, self.session.expires_at) {
            (Some(_), Some(expires_at)) => {
                self.clock.now() < expires_at - Duration::seconds(REFRESH_MARGIN_SECS)
            }
            _ => false,
        }
    }

    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        if self.is_fresh() {
            return Ok(());
        }
        if self.session.access_token.is_some() {
            log::info!("session token expiring, re-authenticating");
        }
        self.authenticate().await
    }

    async fn resolve_workspace(&self) -> Result<String> {
        let soql = format!(
            "SELECT Id, Name FROM ManagedContentSpace WHERE Name = {} LIMIT 1",
            soql_quote(&self.identity.workspace_name)
        );
        let records: Vec<IdRecord> = self.query(&soql).await?;
        records
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| {
                CmsError::NotFound(format!(
                    "no CMS workspace named \"{}\"",
                    self.identity.workspace_name
                ))
            })
    }

    /// Look up a delivery channel for the workspace.
    ///
    /// Best-effort: any failure falls back to the workspace id itself.
    pub async fn resolve_channel(&self, workspace_id: &str) -> String {
        let soql = format!(
            "SELECT Id, Name FROM ManagedContentChannel WHERE ManagedContentSpaceId = {} LIMIT 1",
            soql_quote(workspace_id)
        );
        match self.query::<IdRecord>(&soql).await {
            Ok(records) => match records.into_iter().next() {
                Some(record) => record.id,
                None => {
                    log::debug!("no channel for workspace {}, using its id", workspace_id);
                    workspace_id.to_string()
                }
            },
            Err(e) => {
                log::warn!("channel lookup failed ({}), using workspace id", e);
                workspace_id.to_string()
            }
        }
    }

    /// Run a SOQL query with the current token. Does not refresh.
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>> {
        let url = format!("{}/query?q={}", self.api_base()?, urlencoding::encode(soql));
        let request = HttpRequest::get(url).bearer(self.bearer()?);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(CmsError::Remote {
                step: "query".to_string(),
                status: response.status,
                body: response.body,
            });
        }
        let parsed: QueryResponse<T> = serde_json::from_str(&response.body)?;
        Ok(parsed.records)
    }

    pub fn bearer(&self) -> Result<&str> {
        self.session
            .access_token
            .as_deref()
            .ok_or_else(|| CmsError::Authentication("no active session".to_string()))
    }

    /// `<instance>/services/data/v<version>`
    pub fn api_base(&self) -> Result<String> {
        let instance = self
            .session
            .instance_url
            .as_deref()
            .ok_or_else(|| CmsError::Authentication("no active session".to_string()))?;
        Ok(format!(
            "{}/services/data/v{}",
            instance, self.identity.api_version
        ))
    }

    pub fn workspace_id(&self) -> Result<&str> {
        self.session
            .workspace_id
            .as_deref()
            .ok_or_else(|| CmsError::Authentication("workspace not resolved".to_string()))
    }

    pub fn channel_id(&self) -> Result<&str> {
        self.session
            .channel_id
            .as_deref()
            .ok_or_else(|| CmsError::Authentication("channel not resolved".to_string()))
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            authenticated: self.is_fresh(),
            username: self.identity.username.clone(),
            workspace_name: self.identity.workspace_name.clone(),
            instance_url: self.session.instance_url.clone(),
            workspace_id: self.session.workspace_id.clone(),
            channel_id: self.session.channel_id.clone(),
            expires_at: self.session.expires_at,
        }
    }
}
