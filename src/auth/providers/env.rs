//! Environment-variable credential source.

use async_trait::async_trait;

use crate::auth::{CredentialSource, Credentials};
use crate::catalog::PublicCloud;
use crate::Result;

pub const PRIMARY_NAMESPACE: &str = "KUMO";
pub const SECONDARY_NAMESPACE: &str = "CONOHA";

/// Source reading one namespaced env-var set.
///
/// A namespace is satisfied only when every required variable is present;
/// a partial set skips the namespace entirely, never a partial merge.
pub struct EnvSource {
    namespace: String,
    require_cloud: bool,
}

impl EnvSource {
    /// `KUMO_*`: all five variables required, including `KUMO_PUBLIC_CLOUD`.
    pub fn primary() -> Self {
        Self::new(PRIMARY_NAMESPACE, true)
    }

    /// `CONOHA_*`: the four core variables; the provider key defaults to
    /// `conoha` when `CONOHA_PUBLIC_CLOUD` is absent.
    pub fn secondary() -> Self {
        Self::new(SECONDARY_NAMESPACE, false)
    }

    pub fn new(namespace: impl Into<String>, require_cloud: bool) -> Self {
        Self {
            namespace: namespace.into(),
            require_cloud,
        }
    }

    fn var(&self, suffix: &str) -> Option<String> {
        std::env::var(format!("{}_{}", self.namespace, suffix)).ok()
    }
}

#[async_trait]
impl CredentialSource for EnvSource {
    fn name(&self) -> &str {
        &self.namespace
    }

    async fn resolve(&self) -> Result<Option<Credentials>> {
        let user = self.var("API_USER");
        let pass = self.var("API_PASS");
        let tenant = self.var("TENANT_ID");
        let region = self.var("REGION");
        let cloud_var = self.var("PUBLIC_CLOUD");

        if self.require_cloud && cloud_var.is_none() {
            return Ok(None);
        }

        let (Some(user), Some(pass), Some(tenant), Some(region)) = (user, pass, tenant, region)
        else {
            return Ok(None);
        };

        // The set is satisfied; an unparseable provider key is now fatal.
        let cloud = match cloud_var {
            Some(value) => value.parse::<PublicCloud>()?,
            None => PublicCloud::default(),
        };

        Ok(Some(Credentials::new(user, pass, tenant, region, cloud)?))
    }
}
