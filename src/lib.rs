//! GitHub Secrets Gateway
//!
//! HTTP façade over the GitHub Actions secrets REST API. Callers send their
//! personal access token and secret values sealed to the gateway's public key;
//! the gateway opens them, re-seals values for the target repository or
//! environment, and answers every operation with a uniform response envelope.

pub mod config;
pub mod crypto;
pub mod error;
pub mod github;
pub mod secrets;
pub mod security;
pub mod server;
