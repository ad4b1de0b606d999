//! # feedfin_core
//!
//! Token engine, authentication gate and session logic for Feedfin.

pub mod auth;
pub mod models;
pub mod registry;
pub mod session;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
