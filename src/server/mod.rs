pub mod handlers;
#[allow(clippy::module_inception)]
pub mod server;
