//! Resolved credential value.

use secrecy::{ExposeSecret, SecretString};

use crate::catalog::PublicCloud;
use crate::{Error, Result};

/// Credentials for one account/tenant/region, immutable once resolved.
///
/// The password is held as a [`SecretString`]: redacted in `Debug` output and
/// zeroized on drop. It is only ever exposed to build the identity
/// authentication body.
#[derive(Clone)]
pub struct Credentials {
    user: String,
    password: SecretString,
    tenant_id: String,
    region: String,
    cloud: PublicCloud,
}

impl Credentials {
    /// Build credentials, rejecting empty fields before any network call.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        tenant_id: impl Into<String>,
        region: impl Into<String>,
        cloud: PublicCloud,
    ) -> Result<Self> {
        let user = user.into();
        let password: String = password.into();
        let tenant_id = tenant_id.into();
        let region = region.into();

        for (field, value) in [
            ("user", &user),
            ("password", &password),
            ("tenant_id", &tenant_id),
            ("region", &region),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("credential field `{field}` is empty")));
            }
        }

        Ok(Self {
            user,
            password: SecretString::from(password),
            tenant_id,
            region,
            cloud,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// The API password. Callers must not log or persist this.
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn cloud(&self) -> PublicCloud {
        self.cloud
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("tenant_id", &self.tenant_id)
            .field("region", &self.region)
            .field("cloud", &self.cloud)
            .finish_non_exhaustive()
    }
}
