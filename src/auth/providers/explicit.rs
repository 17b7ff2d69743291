//! Explicit credential sources.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::auth::{CredentialSource, Credentials};
use crate::catalog::PublicCloud;
use crate::{Error, Result};

/// Source wrapping pre-built [`Credentials`]. Always resolves.
pub struct ExplicitSource {
    credentials: Credentials,
}

impl ExplicitSource {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialSource for ExplicitSource {
    fn name(&self) -> &str {
        "explicit"
    }

    async fn resolve(&self) -> Result<Option<Credentials>> {
        Ok(Some(self.credentials.clone()))
    }
}

/// Source reading an in-memory account map.
///
/// The map carries the same keys as the config file: `api_user`, `api_pass`,
/// `tenant_id`, `region`, and optionally `public_cloud`. A missing required
/// key is fatal, not a fallthrough.
pub struct AccountSource {
    account: HashMap<String, String>,
}

impl AccountSource {
    pub fn new(account: HashMap<String, String>) -> Self {
        Self { account }
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.account
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::config(format!("account map missing required key `{key}`")))
    }
}

#[async_trait]
impl CredentialSource for AccountSource {
    fn name(&self) -> &str {
        "account-map"
    }

    async fn resolve(&self) -> Result<Option<Credentials>> {
        let cloud = match self.account.get("public_cloud") {
            Some(value) => value.parse::<PublicCloud>()?,
            None => PublicCloud::default(),
        };

        let credentials = Credentials::new(
            self.require("api_user")?,
            self.require("api_pass")?,
            self.require("tenant_id")?,
            self.require("region")?,
            cloud,
        )?;
        Ok(Some(credentials))
    }
}
