//! JSON config-file credential source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::auth::{CredentialSource, Credentials};
use crate::catalog::PublicCloud;
use crate::{Error, Result};

pub const PRIMARY_CONFIG_DIR: &str = ".kumo";
pub const SECONDARY_CONFIG_DIR: &str = ".conoha";

#[derive(Deserialize)]
struct ConfigFile {
    api_user: String,
    api_pass: SecretString,
    tenant_id: String,
    region: String,
    #[serde(default)]
    public_cloud: Option<PublicCloud>,
}

/// Source reading a JSON config file.
///
/// An explicit path must exist and parse; a default path that does not exist
/// is skipped. In both cases a file that exists but is malformed or missing a
/// required field aborts resolution.
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Explicitly supplied path: the file must exist.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }

    /// Default search path: skipped when the file does not exist.
    pub fn default_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }

    /// The default config files, `~/.kumo/config` then `~/.conoha/config`.
    pub fn default_search_paths() -> Vec<FileSource> {
        let Some(dirs) = directories::BaseDirs::new() else {
            return Vec::new();
        };
        let home = dirs.home_dir();
        [PRIMARY_CONFIG_DIR, SECONDARY_CONFIG_DIR]
            .iter()
            .map(|dir| FileSource::default_path(home.join(dir).join("config")))
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialSource for FileSource {
    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("config-file")
    }

    async fn resolve(&self) -> Result<Option<Credentials>> {
        if !self.path.exists() {
            if self.required {
                return Err(Error::config(format!(
                    "config file {} not found",
                    self.path.display()
                )));
            }
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let parsed: ConfigFile = serde_json::from_str(&content).map_err(|e| {
            // Surfaces the offending field, e.g. "missing field `region`".
            Error::config(format!("config file {}: {e}", self.path.display()))
        })?;

        let credentials = Credentials::new(
            parsed.api_user,
            parsed.api_pass.expose_secret(),
            parsed.tenant_id,
            parsed.region,
            parsed.public_cloud.unwrap_or_default(),
        )?;
        Ok(Some(credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config");
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_complete_file_resolves() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"api_user":"u","api_pass":"p","tenant_id":"t1","region":"tyo1","public_cloud":"zcom"}"#,
        )
        .await;

        let creds = FileSource::at(path).resolve().await.unwrap().unwrap();
        assert_eq!(creds.user(), "u");
        assert_eq!(creds.cloud(), PublicCloud::Zcom);
    }

    #[tokio::test]
    async fn test_public_cloud_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"api_user":"u","api_pass":"p","tenant_id":"t1","region":"tyo1"}"#,
        )
        .await;

        let creds = FileSource::at(path).resolve().await.unwrap().unwrap();
        assert_eq!(creds.cloud(), PublicCloud::Conoha);
    }

    #[tokio::test]
    async fn test_missing_field_names_it() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"api_user":"u","api_pass":"p","tenant_id":"t1"}"#).await;

        let err = FileSource::at(path).resolve().await.unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("region"), "{err}");
    }

    #[tokio::test]
    async fn test_malformed_json_is_fatal_even_at_default_path() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{not json").await;

        let err = FileSource::default_path(path).resolve().await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_missing_default_path_is_skipped() {
        let dir = TempDir::new().unwrap();
        let source = FileSource::default_path(dir.path().join("nope"));
        assert!(source.resolve().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_explicit_path_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = FileSource::at(dir.path().join("nope"))
            .resolve()
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
