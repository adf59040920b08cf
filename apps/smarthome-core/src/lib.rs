//! SmartHome application core
//!
//! Wires the auth and listing stores to one storage medium and keeps the
//! listing store's favorites scoped to whoever is signed in. A UI host builds
//! one [`AppContext`] and passes it to its screens.

pub mod config;
pub mod context;
pub mod error;

pub use context::AppContext;

/// Initializes tracing with the given log level.
///
/// `RUST_LOG` takes precedence when set. Calling this more than once keeps the
/// first subscriber.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing already initialized");
    }
}
