//! # eventa_core
//!
//! Core client logic for the Eventa admin console.
//!
//! Nothing in this crate speaks HTTP. The REST client lives in
//! `eventa_api_client` and plugs in through the traits in [`backend`].

pub mod backend;
pub mod badges;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod export;
pub mod models;
pub mod moderation;
pub mod routes;
pub mod safety;
pub mod session;
pub mod store;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
