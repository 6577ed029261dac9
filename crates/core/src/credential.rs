// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object-store credential set

use crate::secret::Secret;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Expiry timestamp format used in the persisted token blob
pub const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Lifetime assumed when the server omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

const MAX_TOKEN_LIFETIME_SECS: u64 = 10 * 365 * 24 * 3600;

/// Token blob persisted as JSON inside the credential file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: Secret,
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Secret,
    pub expiry: String,
}

impl TokenRecord {
    /// Build a record from a fresh grant, stamping the expiry from `now`
    pub fn from_grant(grant: &TokenGrant, now: DateTime<Utc>) -> Self {
        let lifetime = grant
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .min(MAX_TOKEN_LIFETIME_SECS);
        let expiry = now + Duration::seconds(lifetime as i64);
        Self {
            access_token: grant.access_token.clone(),
            token_type: "Bearer".to_string(),
            refresh_token: grant.refresh_token.clone(),
            expiry: expiry.format(EXPIRY_FORMAT).to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A successful token response from the authorization server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: Secret,
    pub refresh_token: Secret,
    pub expires_in: Option<u64>,
}

/// Client identity and current token for one store backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub client_id: String,
    pub client_secret: Secret,
    pub token: Option<TokenRecord>,
}

impl CredentialSet {
    pub fn has_client(&self) -> bool {
        !self.client_id.trim().is_empty()
    }

    pub fn is_authorized(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| !t.access_token.is_empty())
    }
}
