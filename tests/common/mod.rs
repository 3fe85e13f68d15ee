//! Shared test utilities for snmp-southbound integration tests.

// Not every test file uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

mod fixtures;

pub use fixtures::*;

/// Route engine logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("snmp_southbound=debug")),
        )
        .with_test_writer()
        .try_init();
}
