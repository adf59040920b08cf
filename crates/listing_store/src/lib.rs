//! Listing and favorites storage for SmartHome
//!
//! This crate keeps the global listing collection and the favorite set of the
//! active identity. Favorites are partitioned per user and reloaded whenever
//! the active identity changes.

mod catalog;
mod error;
mod favorites;
mod store;

pub use catalog::*;
pub use error::*;
pub use favorites::*;
pub use store::*;
