//! Access-token providers for the files API.
//!
//! The drive backend never fails a call because of authentication. A provider
//! that cannot produce a token yields the empty string; the client then treats
//! every request as returning nothing (fail closed). Each such failure is
//! logged under the `climscen::auth` target and counted, so an empty catalog
//! caused by bad credentials can be told apart from a genuinely empty dataset.
//!
//! # Implementations
//!
//! - [`StaticToken`] - fixed access token (tests, pre-issued tokens)
//! - [`RefreshTokenAuth`] - OAuth2 refresh-token grant with in-memory caching

use crate::error::{DriveError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Tracing target for authentication diagnostics.
pub const AUTH_TARGET: &str = "climscen::auth";

/// Default token lifetime when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Tokens are renewed this long before they actually expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for the files API.
#[async_trait]
pub trait TokenProvider: Debug + Send + Sync {
    /// Current access token, or `""` when none can be obtained.
    async fn access_token(&self) -> String;

    /// Forget any cached token (e.g. after the API rejected it).
    fn invalidate(&self) {}

    /// Number of failed token acquisitions so far.
    fn failures(&self) -> u64 {
        0
    }
}

/// Fixed access token.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> String {
        self.token.clone()
    }
}

/// Settings for the OAuth2 refresh-token grant.
#[derive(Clone)]
pub struct RefreshTokenConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Debug for RefreshTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// OAuth2 refresh-token grant (`grant_type=refresh_token`).
///
/// The access token lives only in memory; a new process always performs a
/// fresh exchange. At most one exchange runs at a time: callers that find the
/// token stale while an exchange is in progress wait for it and share its
/// outcome, success or failure.
pub struct RefreshTokenAuth {
    config: RefreshTokenConfig,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
    /// Held for the duration of an exchange
    refresh: tokio::sync::Mutex<()>,
    /// Completed exchanges, successful or not
    attempts: AtomicU64,
    failures: AtomicU64,
}

impl Debug for RefreshTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenAuth")
            .field("config", &self.config)
            .field("failures", &self.failures.load(Ordering::Relaxed))
            .finish()
    }
}

impl RefreshTokenAuth {
    pub fn new(config: RefreshTokenConfig, http: reqwest::Client) -> Result<Self> {
        if config.token_url.is_empty() {
            return Err(DriveError::invalid_config("token_url is required"));
        }
        if config.refresh_token.is_empty() {
            return Err(DriveError::invalid_config("refresh_token is required"));
        }
        Ok(Self {
            config,
            http,
            cached: RwLock::new(None),
            refresh: tokio::sync::Mutex::new(()),
            attempts: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }

    fn fresh_token(&self) -> Option<String> {
        self.cached
            .read()
            .as_ref()
            .filter(|t| t.is_fresh())
            .map(|t| t.access_token.clone())
    }

    async fn exchange(&self) -> Result<CachedToken> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let desc = body
                .get("error_description")
                .and_then(|v| v.as_str())
                .or_else(|| body.get("error").and_then(|v| v.as_str()))
                .unwrap_or("refresh rejected");
            return Err(DriveError::auth(format!(
                "token refresh failed ({}): {}",
                status, desc
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DriveError::auth(format!("token response invalid JSON: {}", e)))?;

        let access_token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DriveError::auth("token response missing access_token"))?
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(CachedToken {
            access_token,
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenAuth {
    async fn access_token(&self) -> String {
        if let Some(token) = self.fresh_token() {
            return token;
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let _guard = self.refresh.lock().await;
        if self.attempts.load(Ordering::Acquire) != seen {
            // Another caller exchanged while we waited
            return self.fresh_token().unwrap_or_default();
        }

        let outcome = self.exchange().await;
        let token = match outcome {
            Ok(token) => {
                tracing::debug!(target: AUTH_TARGET, "obtained access token");
                let access_token = token.access_token.clone();
                *self.cached.write() = Some(token);
                access_token
            }
            Err(e) => {
                let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    target: AUTH_TARGET,
                    error = %e,
                    failures,
                    "access token unavailable; drive requests will return no data"
                );
                String::new()
            }
        };
        self.attempts.fetch_add(1, Ordering::Release);
        token
    }

    fn invalidate(&self) {
        *self.cached.write() = None;
    }

    fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
