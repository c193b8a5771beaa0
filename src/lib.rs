//! sessiond - short-lived, in-memory session storage with an HTTP API.

pub mod config;
pub mod http_server;
pub mod session;
pub mod state;
