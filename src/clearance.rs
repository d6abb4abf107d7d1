// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Single-use clearance tokens
//!
//! Creating email content requires an agent to run a preflight first. The
//! preflight issues a token and points at the guides the agent must read;
//! the create call then consumes the token. A token is either issued,
//! consumed, or expired. Expiry is checked lazily against the injected
//! clock whenever the registry is touched.

use crate::clock::Clock;
use crate::error::{CmsError, Result};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const TOKEN_VALIDITY_MINUTES: i64 = 30;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Operations that sit behind a clearance gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    EmailCreation,
}

impl OperationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailCreation => "email_creation",
        }
    }

    /// Guide resources an agent must read before the operation
    pub fn required_reading(&self) -> &'static [&'static str] {
        match self {
            Self::EmailCreation => &[
                "sfcms://guides/email-structure",
                "sfcms://guides/block-ids",
            ],
        }
    }
}

#[derive(Debug, Clone)]
struct ClearanceToken {
    issued_at: DateTime<Utc>,
    operation: OperationClass,
}

/// Returned by the preflight step
#[derive(Debug, Clone, Serialize)]
pub struct ClearanceGrant {
    pub token: String,
    pub operation: OperationClass,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub required_reading: Vec<String>,
}

pub struct ClearanceRegistry {
    clock: Arc<dyn Clock>,
    validity: Duration,
    tokens: HashMap<String, ClearanceToken>,
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

impl ClearanceRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            validity: Duration::minutes(TOKEN_VALIDITY_MINUTES),
            tokens: HashMap::new(),
        }
    }

    fn evict_expired(&mut self) {
        let cutoff = self.clock.now() - self.validity;
        self.tokens.retain(|_, t| t.issued_at > cutoff);
    }

    pub fn issue(&mut self, operation: OperationClass) -> ClearanceGrant {
        self.evict_expired();
        let issued_at = self.clock.now();
        let token = loop {
            let candidate = format!("clr_{}_{}", issued_at.timestamp_millis(), random_suffix());
            if !self.tokens.contains_key(&candidate) {
                break candidate;
            }
        };
        self.tokens.insert(
            token.clone(),
            ClearanceToken {
                issued_at,
                operation,
            },
        );
        log::debug!("issued clearance token for {}", operation.as_str());

        ClearanceGrant {
            token,
            operation,
            issued_at,
            expires_at: issued_at + self.validity,
            required_reading: operation
                .required_reading()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Whether the token is currently registered for the operation
    pub fn check(&mut self, token: &str, operation: OperationClass) -> bool {
        self.evict_expired();
        self.tokens
            .get(token)
            .is_some_and(|t| t.operation == operation)
    }

    /// Remove the token, failing if it is unknown, used, or expired
    pub fn consume(&mut self, token: &str, operation: OperationClass) -> Result<()> {
        if !self.check(token, operation) {
            return Err(CmsError::Clearance(format!(
                "token is missing, already used, or expired; call cms_prepare_email_creation \
                 to obtain a new one (tokens are valid for {} minutes and single-use)",
                TOKEN_VALIDITY_MINUTES
            )));
        }
        self.tokens.remove(token);
        Ok(())
    }

    /// Number of live tokens
    pub fn len(&mut self) -> usize {
        self.evict_expired();
        self.tokens.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }
}
