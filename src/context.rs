// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Process-wide state, constructed once at startup and passed to every tool

use crate::auth::SessionManager;
use crate::clearance::{ClearanceGrant, ClearanceRegistry, OperationClass};
use crate::client::{CmsClient, ContentDescriptor, BLOCK_TREE_FIELD};
use crate::clock::{Clock, SystemClock};
use crate::config::CmsConfig;
use crate::error::Result;
use crate::http::{HttpClientConfig, HttpTransport, ReqwestTransport};
use crate::validate::{validate, ContentNode, ValidationReport};
use serde::Serialize;
use std::sync::Arc;

pub struct CmsContext {
    pub client: CmsClient,
    pub clearance: ClearanceRegistry,
}

/// Result of a gated create
#[derive(Debug, Serialize)]
pub struct CreateOutcome {
    pub created: serde_json::Value,
    /// Advisory report for the block tree, when the body carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

impl CmsContext {
    pub fn new(session: SessionManager, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: CmsClient::new(session),
            clearance: ClearanceRegistry::new(clock),
        }
    }

    /// Build the production context: validated config, reqwest transport, wall clock
    pub fn from_config(config: &CmsConfig) -> Result<Self> {
        let identity = config.validate()?;
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(
            &HttpClientConfig {
                timeout_secs: config.http_timeout_secs,
                ..Default::default()
            },
        )?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let session = SessionManager::new(identity, transport, clock.clone());
        Ok(Self::new(session, clock))
    }

    pub fn prepare(&mut self, operation: OperationClass) -> ClearanceGrant {
        self.clearance.issue(operation)
    }

    /// Create content, enforcing the clearance gate for email.
    ///
    /// The token is consumed before the create request is issued. Other
    /// content types bypass the gate.
    pub async fn gated_create(
        &mut self,
        token: Option<&str>,
        descriptor: &ContentDescriptor,
    ) -> Result<CreateOutcome> {
        let mut validation = None;
        if descriptor.is_email() {
            self.clearance
                .consume(token.unwrap_or_default(), OperationClass::EmailCreation)?;

            if let Some(tree) = descriptor.body.get(BLOCK_TREE_FIELD) {
                let report = match serde_json::from_value::<ContentNode>(tree.clone()) {
                    Ok(root) => validate(&root),
                    Err(e) => ValidationReport {
                        valid: false,
                        violations: vec![format!("block tree is not a node tree: {}", e)],
                        warnings: Vec::new(),
                    },
                };
                if !report.valid {
                    log::warn!(
                        "creating email with {} block tree violation(s)",
                        report.violations.len()
                    );
                }
                validation = Some(report);
            }
        }

        let created = self.client.create(descriptor).await?;
        Ok(CreateOutcome {
            created,
            validation,
        })
    }
}
