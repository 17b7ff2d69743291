//! # kumo
//!
//! Authenticated client core for the ConoHa and Z.com public cloud APIs.
//!
//! GMO's public clouds expose a family of sibling services (compute, block
//! storage, image, network, database, mail, DNS, object storage) under one
//! account/tenant/region model. This crate implements the layer every one of
//! them sits on: credential resolution with strict precedence, the identity
//! token lifecycle, and generic authenticated request dispatch. Per-resource
//! convenience methods live in sibling crates built on [`ServiceClient`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumo::{Cloud, Service};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kumo::Error> {
//!     // Credentials come from env vars or ~/.kumo/config / ~/.conoha/config.
//!     let cloud = Cloud::builder().connect().await?;
//!     let compute = cloud.service(Service::Compute)?;
//!     let servers = compute.get("/servers", Default::default()).await?;
//!     println!("{:?}", servers.get("servers"));
//!     Ok(())
//! }
//! ```
//!
//! ## Explicit credentials
//!
//! ```rust,no_run
//! use kumo::{Cloud, Credentials, PublicCloud};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), kumo::Error> {
//! let creds = Credentials::new("user", "pass", "tenant-id", "tyo1", PublicCloud::Conoha)?;
//! let cloud = Cloud::builder().credentials(creds).connect().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod catalog;
pub mod client;
pub mod identity;

pub use auth::{
    AccountSource, ChainSource, CredentialSource, Credentials, EnvSource, ExplicitSource,
    FileSource,
};
pub use catalog::{EndpointTemplate, PublicCloud, Service};
pub use client::{Body, Cloud, CloudBuilder, JsonObject, RequestOptions, ServiceClient};
pub use identity::Identity;

/// Error type for kumo operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// API returned an error response.
    #[error("API error (HTTP {status}): {message}", status = status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into()))]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Identity service rejected the authentication exchange.
    #[error("Authentication failed{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Auth {
        message: String,
        status: Option<u16>,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-side precondition violated before any network call.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Network connectivity or request failed. No HTTP status was received.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Streaming download failed or the chunk handler aborted.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Identity rejection or a 401/403 from a service endpoint.
    Authentication,
    /// Credential resolution or endpoint lookup failures.
    Configuration,
    /// A service responded with an HTTP error status.
    Api,
    /// Caller-side precondition failures; never reached the network.
    Validation,
    /// DNS/connect/timeout/stream failures with no HTTP status.
    Transport,
    /// Internal errors (IO, JSON, unexpected states).
    Internal,
}

impl Error {
    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Api {
            message: message.into(),
            status,
        }
    }

    pub fn auth(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Auth {
            message: message.into(),
            status,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Auth { .. } => ErrorCategory::Authentication,
            Error::Api {
                status: Some(401 | 403),
                ..
            } => ErrorCategory::Authentication,
            Error::Api { .. } => ErrorCategory::Api,
            Error::Config(_) => ErrorCategory::Configuration,
            Error::Validation(_) => ErrorCategory::Validation,
            Error::Network(_) | Error::Stream(_) => ErrorCategory::Transport,
            Error::Json(_) | Error::Io(_) => ErrorCategory::Internal,
        }
    }

    /// HTTP status attached to this error, if a response was received.
    ///
    /// `None` for transport failures, which is what distinguishes them from a
    /// true 4xx/5xx.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::Auth { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_authentication(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.http_status(), Some(400..=499))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.http_status(), Some(500..=599))
    }
}

/// Result type alias for kumo operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::api("no such server", Some(404));
        assert_eq!(err.to_string(), "API error (HTTP 404): no such server");
        assert_eq!(err.http_status(), Some(404));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_auth_error_category() {
        let err = Error::auth("bad credentials", Some(401));
        assert_eq!(err.category(), ErrorCategory::Authentication);

        let err = Error::api("forbidden", Some(403));
        assert_eq!(err.category(), ErrorCategory::Authentication);
    }

    #[test]
    fn test_config_error_has_no_status() {
        let err = Error::config("no credential source satisfied");
        assert_eq!(err.http_status(), None);
        assert!(err.is_configuration());
    }

    #[test]
    fn test_server_error_range() {
        let err = Error::api("upstream exploded", Some(503));
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Api);
    }
}
