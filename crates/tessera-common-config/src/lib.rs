//! Configuration types for Tessera.
//!
//! This crate provides the configuration types used by the authorization
//! engine, read from `.tessera/config.yaml` files.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
