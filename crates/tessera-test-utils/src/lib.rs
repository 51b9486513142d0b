//! Test utilities for Tessera crates.

pub mod fixtures;
pub mod strategies;

use std::path::PathBuf;
use std::sync::OnceLock;
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Route `tracing` output through the test harness writer.
///
/// Safe to call from every test; only the first call installs the
/// subscriber. Honours `RUST_LOG`, defaulting to `debug`.
pub fn init_test_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .try_init();
    });
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err, optionally matching a pattern.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(_) => {}
        }
    };
    ($expr:expr, $pattern:pat) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => assert!(
                matches!(e, $pattern),
                "Error {:?} does not match {}",
                e,
                stringify!($pattern)
            ),
        }
    };
}

/// Assert that an engine call was refused as an ordinary denial.
#[macro_export]
macro_rules! assert_denied {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected denial, got Ok: {:?}", v),
            Err(e) => assert!(e.is_denial(), "Expected denial, got fault: {:?}", e),
        }
    };
}
