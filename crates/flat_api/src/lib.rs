//! FlatFly backend client
//!
//! A cookie-carrying `reqwest` client that speaks the backend's JSON endpoints
//! and implements the core's backend ports.

pub mod client;
pub mod response;

pub use client::ApiClient;
pub use response::{check_status, error_detail, parse_response};
