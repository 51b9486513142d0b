//! Tessera common core types and utilities.

pub mod error;
pub mod id;

pub use error::{ErrorCode, ParseError};
pub use id::*;
