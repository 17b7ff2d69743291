//! Credential source trait.

use async_trait::async_trait;

use super::Credentials;
use crate::Result;

/// Trait for resolving credentials from one candidate source.
///
/// `Ok(None)` means the source is not applicable (a partial env-var set, a
/// default config file that does not exist) and the next source should be
/// tried. `Err` means the source is present but invalid (malformed JSON, a
/// missing required field) and resolution must abort rather than fall
/// through.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Source name for debugging and resolution errors.
    fn name(&self) -> &str;

    /// Resolve credentials from this source.
    async fn resolve(&self) -> Result<Option<Credentials>>;
}
