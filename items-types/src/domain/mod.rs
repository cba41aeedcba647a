//! Domain models for the items service.

pub mod item;
pub mod principal;

pub use item::{Item, ItemId};
pub use principal::Principal;
