//! # Items Hex
//!
//! Application service layer and HTTP adapter for the items service.
//!
//! ## Architecture
//!
//! - `service/` - Item application service (scoped store access)
//! - `auth/` - Credential check and token issuance
//! - `inbound/` - HTTP adapter (Axum server, middleware, rate limiter)
//!
//! The service is generic over `R: ItemRepository`, allowing
//! different repository implementations to be injected.

pub mod auth;
pub mod inbound;
pub mod openapi;
pub mod service;


pub use auth::{AuthGate, Credentials};
pub use service::{ItemScope, ItemService};
