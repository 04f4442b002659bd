//! Core business logic for the CyberSecure Portal gateway.

pub mod services;

pub use services::*;
