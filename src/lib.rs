//! Library exports for vault-session, shared between the binary and tests.

pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod session;
pub mod sources;
pub mod startup;
pub mod state;
pub mod utils;
