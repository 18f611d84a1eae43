pub mod clients;
pub mod config;
pub mod security;
pub mod session;
pub mod utils;

// Crate version exposed for runtime queries
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
