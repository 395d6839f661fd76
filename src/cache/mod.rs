//! Bearer token storage for the OAuth2 client.

pub mod credential_cache;
pub mod token;

pub use credential_cache::{CacheState, CredentialCache};
pub use token::Token;
