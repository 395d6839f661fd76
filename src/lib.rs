//! # Vibes Backend Library
//!
//! Aggregates a movie catalog, a music recommendation API and a local
//! food-price collection behind one JSON HTTP interface.
//!
//! Modules:
//! - `config`: service configuration, env expansion and validation
//! - `cache`: bearer token cache for the OAuth2 client
//! - `sources`: client-credentials exchange with the authorization server
//! - `providers`: movie, music and food data providers
//! - `server`: axum router, handlers and shared state

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod providers;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::cache::{CacheState, CredentialCache};
pub use crate::config::ServiceConfig;
pub use crate::error::{ApiError, CredentialAcquisitionError, ProviderError};
