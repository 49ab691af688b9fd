//! Test fixtures for route-places.
//!
//! Provides:
//! - Real Finnish town locations (from OpenStreetMap)
//! - An in-memory provider implementing the geocoding, routing and weather traits

#![allow(dead_code)]

pub mod fake_provider;
pub mod finnish_locations;

pub use fake_provider::*;
pub use finnish_locations::*;

/// Routes library logs to the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
