//! Local authentication for SmartHome.
//!
//! This crate provides:
//! - The registered-user collection, persisted on the device
//! - Registration, login, logout and profile updates

mod error;
mod store;

pub use error::*;
pub use store::*;
