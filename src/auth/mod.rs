//! Credential resolution for the GMO public clouds.
//!
//! Candidate sources are consulted in strict precedence order:
//! explicit credentials, an explicit config-file path, an in-memory account
//! map, the `KUMO_*` env namespace, the `CONOHA_*` env namespace, then the
//! default config files under `~/.kumo` and `~/.conoha`. The first satisfied
//! source wins; a source that is present but invalid aborts resolution
//! instead of falling through.

mod credential;
mod provider;
mod providers;

pub use credential::Credentials;
pub use provider::CredentialSource;
pub use providers::{AccountSource, ChainSource, EnvSource, ExplicitSource, FileSource};
