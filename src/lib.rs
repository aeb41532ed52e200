#![doc(test(attr(deny(warnings))))]

//! Invoice Tracker client: a typed REST client for the invoice backend, the
//! session services (auth, theme, notifications) a front end keeps alive, and
//! an interactive shell that renders grouped expense views.
//!
//! The expense transforms live in `tracker-core`; this crate wires them to
//! the API, the preference store and the terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod session;
pub mod upload;
pub mod utils;

pub use errors::TrackerError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Invoice tracker tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
