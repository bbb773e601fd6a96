//! # yookye_core
//!
//! Core client logic for the Yookye travel-planning service: session
//! persistence, the resilient API client, auth flows, and the job
//! polling state machine.

pub mod api;
pub mod auth;
pub mod config;
pub mod jobs;
pub mod models;
pub mod session;
pub mod travel;
pub mod user;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
