//! Domain models exchanged with the Yookye backend.

pub mod auth;
pub mod travel;
pub mod user;
