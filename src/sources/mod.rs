//! Token sources: the exchanges that produce bearer tokens.

pub mod oauth2;

pub use oauth2::{ClientCredentials, ClientCredentialsExchange};
