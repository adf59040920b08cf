//! Core entity definitions for SmartHome.
//!
//! This crate defines the records persisted on the device: registered users,
//! property listings and the inputs used to create or change them.

mod listing;
mod user;

pub use listing::*;
pub use user::*;
