// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Google OAuth device endpoints over blocking HTTP

use super::{AuthError, AuthServerAdapter};
use async_trait::async_trait;
use fleet_core::config::AuthSettings;
use fleet_core::{DeviceCode, PollResponse, Secret, TokenGrant};
use serde::Deserialize;
use std::time::Duration;

const DEVICE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Google device-flow endpoints
#[derive(Debug, Clone)]
pub struct GoogleDeviceAuth {
    device_code_url: String,
    token_url: String,
    timeout: Duration,
    default_lifetime: Duration,
}

impl GoogleDeviceAuth {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            device_code_url: settings.device_code_url.clone(),
            token_url: settings.token_url.clone(),
            timeout: settings.request_timeout,
            default_lifetime: settings.default_code_lifetime,
        }
    }

    async fn post_form(&self, url: &str, form: Vec<(&'static str, String)>) -> Result<String, AuthError> {
        let url = url.to_string();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || {
            let mut response = ureq::post(&url)
                .config()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .send_form(form)
                .map_err(|e| AuthError::Transport(e.to_string()))?;
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| AuthError::Transport(format!("failed to read response: {}", e)))
        })
        .await
        .map_err(|e| AuthError::Transport(e.to_string()))?
    }
}

#[derive(Deserialize)]
struct CodeBody {
    device_code: Option<String>,
    user_code: Option<String>,
    verification_url: Option<String>,
    verification_uri: Option<String>,
    interval: Option<u64>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, AuthError> {
    serde_json::from_str(body).map_err(|e| AuthError::Malformed(format!("{}: {}", e, body.trim())))
}

/// Parse a device-code response body
pub fn parse_code_response(body: &str, default_lifetime: Duration) -> Result<DeviceCode, AuthError> {
    let parsed: CodeBody = decode(body)?;
    if let Some(error) = parsed.error {
        return Err(AuthError::Rejected {
            error,
            description: parsed.error_description,
        });
    }
    let (Some(device_code), Some(user_code)) = (parsed.device_code, parsed.user_code) else {
        return Err(AuthError::Malformed("missing device_code or user_code".to_string()));
    };
    let verification_url = parsed
        .verification_url
        .or(parsed.verification_uri)
        .ok_or_else(|| AuthError::Malformed("missing verification url".to_string()))?;
    Ok(DeviceCode {
        device_code: Secret::new(device_code),
        user_code,
        verification_url,
        interval: Duration::from_secs(parsed.interval.unwrap_or(5)),
        expires_in: parsed
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(default_lifetime),
    })
}

/// Parse a token-endpoint response body
///
/// A body with neither an error nor a token counts as still pending.
pub fn parse_poll_response(body: &str) -> Result<PollResponse, AuthError> {
    let parsed: TokenBody = decode(body)?;
    if let Some(error) = parsed.error {
        return Ok(PollResponse::from_error(&error));
    }
    match parsed.access_token {
        Some(access_token) => Ok(PollResponse::Token(TokenGrant {
            access_token: Secret::new(access_token),
            refresh_token: Secret::new(parsed.refresh_token.unwrap_or_default()),
            expires_in: parsed.expires_in,
        })),
        None => Ok(PollResponse::Pending),
    }
}

/// Token-endpoint form; `client_secret` is left out when none is configured
fn poll_form(
    client_id: &str,
    client_secret: &Secret,
    device_code: &Secret,
) -> Vec<(&'static str, String)> {
    let mut form = vec![("client_id", client_id.to_string())];
    if !client_secret.expose().is_empty() {
        form.push(("client_secret", client_secret.expose().to_string()));
    }
    form.push(("device_code", device_code.expose().to_string()));
    form.push(("grant_type", DEVICE_GRANT.to_string()));
    form
}

#[async_trait]
impl AuthServerAdapter for GoogleDeviceAuth {
    async fn request_code(&self, client_id: &str, scope: &str) -> Result<DeviceCode, AuthError> {
        let form = vec![
            ("client_id", client_id.to_string()),
            ("scope", scope.to_string()),
        ];
        let body = self.post_form(&self.device_code_url, form).await?;
        parse_code_response(&body, self.default_lifetime)
    }

    async fn poll(
        &self,
        client_id: &str,
        client_secret: &Secret,
        device_code: &Secret,
    ) -> Result<PollResponse, AuthError> {
        let form = poll_form(client_id, client_secret, device_code);
        let body = self.post_form(&self.token_url, form).await?;
        parse_poll_response(&body)
    }
}

#[cfg(test)]
#[path = "google_tests.rs"]
mod tests;
