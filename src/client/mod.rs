//! Composition root and authenticated request dispatch.

mod service;

pub use service::{Body, JsonObject, RequestOptions, ServiceClient};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{ChainSource, Credentials, ExplicitSource};
use crate::catalog::{self, EndpointTemplate, Service};
use crate::identity::Identity;
use crate::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide entry point: one shared HTTP transport, one identity session,
/// and a [`ServiceClient`] per resolved service base URL.
#[derive(Clone)]
pub struct Cloud {
    identity: Arc<Identity>,
    http: reqwest::Client,
}

impl Cloud {
    pub fn builder() -> CloudBuilder {
        CloudBuilder::default()
    }

    /// Wrap a pre-built identity session, bypassing credential resolution
    /// entirely.
    pub fn with_identity(identity: Identity) -> Self {
        let http = identity.http().clone();
        Self {
            identity: Arc::new(identity),
            http,
        }
    }

    pub fn identity(&self) -> &Arc<Identity> {
        &self.identity
    }

    /// A client bound to `service`, resolved through the endpoint catalog for
    /// this identity's cloud and region.
    pub fn service(&self, service: Service) -> Result<ServiceClient> {
        let credentials = self.identity.credentials();
        let template = catalog::template(credentials.cloud(), service)?;
        let base_url = template.resolve(credentials.region());
        Ok(ServiceClient::new(
            self.identity.clone(),
            self.http.clone(),
            base_url,
        ))
    }

    /// A client for a resource type carrying its own endpoint template.
    ///
    /// Produces the same base URL as [`Cloud::service`] for an equivalent
    /// (cloud, service, region) triple.
    pub fn service_at(&self, template: &EndpointTemplate) -> ServiceClient {
        let base_url = template.resolve(self.identity.credentials().region());
        ServiceClient::new(self.identity.clone(), self.http.clone(), base_url)
    }

    /// A client bound to an already-concrete base URL. Used by gateways and
    /// test doubles.
    pub fn service_url(&self, base_url: impl Into<String>) -> ServiceClient {
        ServiceClient::new(self.identity.clone(), self.http.clone(), base_url.into())
    }
}

impl std::fmt::Debug for Cloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cloud")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Cloud`].
///
/// Credential inputs map onto the resolution precedence: explicit
/// [`Credentials`] first, then an explicit config path, then an account map,
/// then the environment and default config files.
#[derive(Default)]
pub struct CloudBuilder {
    credentials: Option<Credentials>,
    config_path: Option<PathBuf>,
    account: Option<HashMap<String, String>>,
    http: Option<reqwest::Client>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    identity_url: Option<String>,
}

impl CloudBuilder {
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn account(mut self, account: HashMap<String, String>) -> Self {
        self.account = Some(account);
        self
    }

    /// Inject a pre-built transport instead of constructing one. The same
    /// instance is shared by the identity session and every service client.
    pub fn http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Read timeout for every request. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Connect timeout. Defaults to 10 seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Override the identity base URL instead of resolving it from the
    /// catalog. Used by gateways and test doubles.
    pub fn identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = Some(url.into());
        self
    }

    /// Resolve credentials, authenticate, and return the connected root.
    pub async fn connect(self) -> Result<Cloud> {
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .build()
                .map_err(Error::Network)?,
        };

        let mut chain = ChainSource::new(Vec::new());
        if let Some(credentials) = self.credentials {
            chain = chain.with(ExplicitSource::new(credentials));
        } else {
            chain = ChainSource::standard(self.config_path, self.account);
        }
        let credentials = chain.resolve_credentials().await?;

        let identity = match self.identity_url {
            Some(url) => Identity::connect_to(http.clone(), credentials, url).await?,
            None => Identity::connect(http.clone(), credentials).await?,
        };

        Ok(Cloud {
            identity: Arc::new(identity),
            http,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = Cloud::builder();
        assert!(builder.credentials.is_none());
        assert!(builder.http.is_none());
        assert!(builder.identity_url.is_none());
    }

    #[tokio::test]
    async fn test_connect_without_sources_is_configuration_error() {
        // Isolate from the ambient environment and home directory by feeding
        // an account map that is invalid: resolution must fail fast.
        let err = Cloud::builder()
            .account(HashMap::new())
            .connect()
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
