//! Endpoint catalog for the GMO public clouds.
//!
//! Maps a (public cloud, service) pair to a URL template with a single
//! `{region}` slot. The catalog is static data; resolving a template against a
//! region is a pure string operation with no I/O.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which vendor's endpoint conventions to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicCloud {
    /// ConoHa (conoha.io). The default when no provider key is given.
    Conoha,
    /// Z.com cloud (cloud.z.com).
    #[serde(alias = "z.com")]
    Zcom,
}

impl Default for PublicCloud {
    fn default() -> Self {
        PublicCloud::Conoha
    }
}

impl fmt::Display for PublicCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PublicCloud::Conoha => "conoha",
            PublicCloud::Zcom => "zcom",
        })
    }
}

impl FromStr for PublicCloud {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conoha" => Ok(PublicCloud::Conoha),
            "zcom" | "z.com" => Ok(PublicCloud::Zcom),
            other => Err(Error::config(format!("unknown public cloud `{other}`"))),
        }
    }
}

/// The sibling services sharing one account/tenant/region model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Identity,
    Account,
    Compute,
    BlockStorage,
    Image,
    Network,
    Database,
    Mail,
    Dns,
    ObjectStorage,
}

impl Service {
    /// All services known to the catalog.
    pub const ALL: [Service; 10] = [
        Service::Identity,
        Service::Account,
        Service::Compute,
        Service::BlockStorage,
        Service::Image,
        Service::Network,
        Service::Database,
        Service::Mail,
        Service::Dns,
        Service::ObjectStorage,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Service::Identity => "identity",
            Service::Account => "account",
            Service::Compute => "compute",
            Service::BlockStorage => "block-storage",
            Service::Image => "image",
            Service::Network => "network",
            Service::Database => "database",
            Service::Mail => "mail",
            Service::Dns => "dns",
            Service::ObjectStorage => "object-storage",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A base-URL template with exactly one `{region}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    template: String,
}

const REGION_SLOT: &str = "{region}";

impl EndpointTemplate {
    /// Validate and wrap a template string.
    ///
    /// The template must contain the `{region}` slot exactly once. Resource
    /// clients that carry their own baked-in template go through here too, so
    /// the invariant holds for both construction paths.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.matches(REGION_SLOT).count() != 1 {
            return Err(Error::validation(format!(
                "endpoint template `{template}` must contain `{REGION_SLOT}` exactly once"
            )));
        }
        Ok(Self { template })
    }

    /// Substitute the region slot, producing a concrete base URL.
    pub fn resolve(&self, region: &str) -> String {
        self.template.replacen(REGION_SLOT, region, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

fn template_str(cloud: PublicCloud, service: Service) -> Option<&'static str> {
    use PublicCloud::*;
    use Service::*;

    let host = match cloud {
        Conoha => "conoha.io",
        Zcom => "cloud.z.com",
    };
    // Mail and database hosting are ConoHa-only products.
    if cloud == Zcom && matches!(service, Mail | Database) {
        return None;
    }

    Some(match (host, service) {
        ("conoha.io", Identity) => "https://identity.{region}.conoha.io/v2.0",
        ("conoha.io", Account) => "https://account.{region}.conoha.io/v1",
        ("conoha.io", Compute) => "https://compute.{region}.conoha.io/v2",
        ("conoha.io", BlockStorage) => "https://block-storage.{region}.conoha.io/v2",
        ("conoha.io", Image) => "https://image-service.{region}.conoha.io/v2",
        ("conoha.io", Network) => "https://networking.{region}.conoha.io/v2.0",
        ("conoha.io", Database) => "https://database-hosting.{region}.conoha.io/v1",
        ("conoha.io", Mail) => "https://mail-hosting.{region}.conoha.io/v1",
        ("conoha.io", Dns) => "https://dns-service.{region}.conoha.io/v1",
        ("conoha.io", ObjectStorage) => "https://object-storage.{region}.conoha.io/v1",
        ("cloud.z.com", Identity) => "https://identity.{region}.cloud.z.com/v2.0",
        ("cloud.z.com", Account) => "https://account.{region}.cloud.z.com/v1",
        ("cloud.z.com", Compute) => "https://compute.{region}.cloud.z.com/v2",
        ("cloud.z.com", BlockStorage) => "https://block-storage.{region}.cloud.z.com/v2",
        ("cloud.z.com", Image) => "https://image-service.{region}.cloud.z.com/v2",
        ("cloud.z.com", Network) => "https://networking.{region}.cloud.z.com/v2.0",
        ("cloud.z.com", Dns) => "https://dns-service.{region}.cloud.z.com/v1",
        ("cloud.z.com", ObjectStorage) => "https://object-storage.{region}.cloud.z.com/v1",
        _ => return None,
    })
}

/// Look up the endpoint template for a (cloud, service) pair.
///
/// Fails closed: an unknown pair is a `Config` error, never another service's
/// URL.
pub fn template(cloud: PublicCloud, service: Service) -> Result<EndpointTemplate> {
    match template_str(cloud, service) {
        Some(t) => EndpointTemplate::new(t),
        None => Err(Error::config(format!(
            "no endpoint for service `{service}` on `{cloud}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_template_has_one_region_slot() {
        for cloud in [PublicCloud::Conoha, PublicCloud::Zcom] {
            for service in Service::ALL {
                if let Some(t) = template_str(cloud, service) {
                    assert_eq!(
                        t.matches(REGION_SLOT).count(),
                        1,
                        "template for ({cloud}, {service}) must have one region slot"
                    );
                }
            }
        }
    }

    #[test]
    fn test_resolve_substitutes_region() {
        let t = template(PublicCloud::Conoha, Service::Identity).unwrap();
        assert_eq!(t.resolve("tyo1"), "https://identity.tyo1.conoha.io/v2.0");
    }

    #[test]
    fn test_lookup_fails_closed() {
        let err = template(PublicCloud::Zcom, Service::Mail).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("mail"));
    }

    #[test]
    fn test_embedded_template_matches_catalog() {
        // Legacy path: a resource client carrying its own template must
        // resolve byte-identically to the catalog lookup.
        let embedded = EndpointTemplate::new("https://compute.{region}.conoha.io/v2").unwrap();
        let looked_up = template(PublicCloud::Conoha, Service::Compute).unwrap();
        assert_eq!(embedded.resolve("tyo1"), looked_up.resolve("tyo1"));
    }

    #[test]
    fn test_template_rejects_missing_or_repeated_slot() {
        assert!(EndpointTemplate::new("https://example.com/v1").is_err());
        assert!(EndpointTemplate::new("https://{region}.example.com/{region}").is_err());
    }

    #[test]
    fn test_public_cloud_parsing() {
        assert_eq!("conoha".parse::<PublicCloud>().unwrap(), PublicCloud::Conoha);
        assert_eq!("z.com".parse::<PublicCloud>().unwrap(), PublicCloud::Zcom);
        assert_eq!("ZCOM".parse::<PublicCloud>().unwrap(), PublicCloud::Zcom);
        assert!("nimbus".parse::<PublicCloud>().is_err());
    }

    #[test]
    fn test_public_cloud_deserialize_alias() {
        let cloud: PublicCloud = serde_json::from_str("\"z.com\"").unwrap();
        assert_eq!(cloud, PublicCloud::Zcom);
    }
}
