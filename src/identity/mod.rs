//! Identity service session and token lifecycle.
//!
//! [`Identity`] owns the resolved [`Credentials`] and the identity endpoint,
//! performs the Keystone-style token exchange, and caches the bearer token
//! with its expiry. The token and expiry are one value behind a single lock:
//! readers never observe a token paired with the wrong expiry.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::auth::Credentials;
use crate::catalog::{self, Service};
use crate::{Error, Result};

#[derive(Clone, Debug)]
struct TokenState {
    token: String,
    expires: DateTime<Utc>,
}

impl TokenState {
    // Expiry itself still counts as valid.
    fn valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
}

#[derive(Deserialize)]
struct Token {
    id: String,
    expires: DateTime<Utc>,
}

/// An authenticated identity session.
///
/// Construction authenticates immediately; an `Identity` never exists in a
/// half-initialized state. The token is re-acquired on demand through
/// [`Identity::ensure_token`]; [`Identity::authenticate`] remains available
/// for explicit manual refresh.
pub struct Identity {
    credentials: Credentials,
    auth_url: String,
    http: reqwest::Client,
    state: RwLock<Option<TokenState>>,
    reauth: Mutex<()>,
}

impl Identity {
    /// Resolve the identity endpoint for the credential's cloud and region,
    /// then authenticate. Any failure aborts construction.
    pub async fn connect(http: reqwest::Client, credentials: Credentials) -> Result<Self> {
        let template = catalog::template(credentials.cloud(), Service::Identity)?;
        let auth_url = template.resolve(credentials.region());
        Self::connect_to(http, credentials, auth_url).await
    }

    /// Authenticate against an explicit identity base URL.
    ///
    /// Used by gateways and test doubles; [`Identity::connect`] is the
    /// catalog-driven path.
    pub async fn connect_to(
        http: reqwest::Client,
        credentials: Credentials,
        auth_url: impl Into<String>,
    ) -> Result<Self> {
        let identity = Self {
            credentials,
            auth_url: auth_url.into(),
            http,
            state: RwLock::new(None),
            reauth: Mutex::new(()),
        };
        identity.authenticate().await?;
        Ok(identity)
    }

    /// Perform the token exchange and atomically replace the cached token.
    ///
    /// No retry: a rejection surfaces as [`Error::Auth`] carrying the
    /// response status.
    pub async fn authenticate(&self) -> Result<()> {
        let body = serde_json::json!({
            "auth": {
                "passwordCredentials": {
                    "username": self.credentials.user(),
                    "password": self.credentials.password(),
                },
                "tenantId": self.credentials.tenant_id(),
            }
        });

        let url = format!("{}/tokens", self.auth_url);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 400 {
            tracing::warn!(status, "identity service rejected authentication");
            return Err(Error::auth(
                "identity service rejected the credential exchange",
                Some(status),
            ));
        }

        let parsed: TokenResponse = response.json().await?;
        tracing::debug!(expires = %parsed.access.token.expires, "token acquired");

        let mut state = self.state.write().await;
        *state = Some(TokenState {
            token: parsed.access.token.id,
            expires: parsed.access.token.expires,
        });
        Ok(())
    }

    /// Whether the cached token is still valid (`now <= expiry`).
    ///
    /// Pure read; never refreshes.
    pub async fn token_available(&self) -> bool {
        let state = self.state.read().await;
        state
            .as_ref()
            .map(|s| s.valid_at(Utc::now()))
            .unwrap_or(false)
    }

    /// The cached bearer token, whether or not it has expired.
    pub async fn token(&self) -> Result<String> {
        let state = self.state.read().await;
        state
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(|| Error::auth("session has never authenticated", None))
    }

    /// The cached token, re-authenticating first if it is at or past expiry.
    ///
    /// Concurrent callers observing the same expiry are serialized so only
    /// one token exchange reaches the identity service.
    pub async fn ensure_token(&self) -> Result<String> {
        {
            let state = self.state.read().await;
            if let Some(s) = state.as_ref()
                && s.valid_at(Utc::now())
            {
                return Ok(s.token.clone());
            }
        }

        let _guard = self.reauth.lock().await;

        // Another caller may have refreshed while we waited for the guard.
        {
            let state = self.state.read().await;
            if let Some(s) = state.as_ref()
                && s.valid_at(Utc::now())
            {
                return Ok(s.token.clone());
            }
        }

        tracing::debug!("token expired, re-authenticating");
        self.authenticate().await?;
        self.token().await
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The resolved identity base URL.
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("auth_url", &self.auth_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_token_valid_strictly_before_expiry() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let state = TokenState {
            token: "abc".into(),
            expires,
        };
        assert!(state.valid_at(expires - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_token_valid_at_exact_expiry() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let state = TokenState {
            token: "abc".into(),
            expires,
        };
        assert!(state.valid_at(expires));
    }

    #[test]
    fn test_token_invalid_after_expiry() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let state = TokenState {
            token: "abc".into(),
            expires,
        };
        assert!(!state.valid_at(expires + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{"access":{"token":{"id":"abc123","expires":"2099-01-01T00:00:00Z"}}}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access.token.id, "abc123");
        assert_eq!(
            parsed.access.token.expires,
            Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
