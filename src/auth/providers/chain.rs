//! Chain credential source.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::auth::{AccountSource, CredentialSource, Credentials, EnvSource, FileSource};
use crate::{Error, Result};

/// Chain source that consults sources in precedence order.
///
/// The first source returning credentials wins and later sources are never
/// read. A source error aborts the chain.
pub struct ChainSource {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl ChainSource {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    pub fn with<S: CredentialSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// The default precedence: explicit config path, account map, `KUMO_*`
    /// env set, `CONOHA_*` env set, `~/.kumo/config`, `~/.conoha/config`.
    pub fn standard(
        config_path: Option<PathBuf>,
        account: Option<HashMap<String, String>>,
    ) -> Self {
        let mut chain = Self::new(Vec::new());
        if let Some(path) = config_path {
            chain = chain.with(FileSource::at(path));
        }
        if let Some(account) = account {
            chain = chain.with(AccountSource::new(account));
        }
        chain = chain.with(EnvSource::primary()).with(EnvSource::secondary());
        for source in FileSource::default_search_paths() {
            chain = chain.with(source);
        }
        chain
    }

    /// Run the chain, failing when no source is satisfied.
    pub async fn resolve_credentials(&self) -> Result<Credentials> {
        let mut tried = Vec::new();

        for source in &self.sources {
            match source.resolve().await? {
                Some(credentials) => {
                    tracing::debug!(source = source.name(), "credentials resolved");
                    return Ok(credentials);
                }
                None => {
                    tracing::debug!(source = source.name(), "credential source not applicable");
                    tried.push(source.name().to_string());
                }
            }
        }

        Err(Error::config(format!(
            "credential resolution exhausted all sources (tried: {})",
            if tried.is_empty() {
                "none".to_string()
            } else {
                tried.join(", ")
            }
        )))
    }
}

#[async_trait]
impl CredentialSource for ChainSource {
    fn name(&self) -> &str {
        "chain"
    }

    async fn resolve(&self) -> Result<Option<Credentials>> {
        self.resolve_credentials().await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ExplicitSource;
    use crate::catalog::PublicCloud;

    fn creds(user: &str) -> Credentials {
        Credentials::new(user, "p", "t1", "tyo1", PublicCloud::Conoha).unwrap()
    }

    #[tokio::test]
    async fn test_first_satisfied_source_wins() {
        let chain = ChainSource::new(Vec::new())
            .with(EnvSource::new("CHAINTEST_EMPTY", false))
            .with(ExplicitSource::new(creds("first")))
            .with(ExplicitSource::new(creds("second")));

        let resolved = chain.resolve_credentials().await.unwrap();
        assert_eq!(resolved.user(), "first");
    }

    #[tokio::test]
    async fn test_exhaustion_names_resolver_and_sources() {
        let chain = ChainSource::new(Vec::new())
            .with(EnvSource::new("CHAINTEST_A", false))
            .with(EnvSource::new("CHAINTEST_B", false));

        let err = chain.resolve_credentials().await.unwrap_err();
        assert!(err.is_configuration());
        let message = err.to_string();
        assert!(message.contains("CHAINTEST_A"));
        assert!(message.contains("CHAINTEST_B"));
    }

    #[tokio::test]
    async fn test_fatal_source_aborts_chain() {
        let dir = tempfile::TempDir::new().unwrap();
        let bad = dir.path().join("config");
        tokio::fs::write(&bad, "{broken").await.unwrap();

        // The valid explicit source below never gets consulted.
        let chain = ChainSource::new(Vec::new())
            .with(FileSource::at(bad))
            .with(ExplicitSource::new(creds("unreachable")));

        let err = chain.resolve_credentials().await.unwrap_err();
        assert!(err.is_configuration());
    }
}
