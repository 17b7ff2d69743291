//! Credential source implementations.

mod chain;
mod env;
mod explicit;
mod file;

pub use chain::ChainSource;
pub use env::EnvSource;
pub use explicit::{AccountSource, ExplicitSource};
pub use file::FileSource;
