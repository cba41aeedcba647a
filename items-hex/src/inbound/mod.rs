//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod auth;
mod handlers;
pub mod rate_limit;
mod server;

pub use rate_limit::{RATE_LIMIT, RATE_WINDOW, SlidingWindowLimiter};
pub use server::{DEFAULT_ALLOWED_ORIGIN, HttpServer};
