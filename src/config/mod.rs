//! Configuration Module
//!
//! Handles application configuration loading, validation, and the
//! credential sources providers are built from.

mod credentials;
mod provider;
pub mod secrets;
mod types;

pub use credentials::{CredentialSource, StaticCredentials};
pub use provider::ProviderConfig;
pub use secrets::SecretString;
pub use types::*;
