//! Shared error vocabulary for Tessera.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Stable, machine-readable error code.
///
/// The presentation layer maps these onto its own response format, so the
/// string values must not change once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// Denied by campaign roles.
    pub const CAMPAIGN_INSUFFICIENT_PERMISSIONS: Self = Self("campaign_insufficient_permissions");
    /// Denied by class roles.
    pub const CLASS_INSUFFICIENT_PERMISSIONS: Self = Self("class_insufficient_permissions");
    /// Denied by document roles.
    pub const DOCUMENT_INSUFFICIENT_PERMISSIONS: Self = Self("document_insufficient_permissions");
    /// Denied access to a single resource.
    pub const RESOURCE_INSUFFICIENT_PERMISSIONS: Self = Self("resource_insufficient_permissions");
    /// Denied access to another user's data.
    pub const USER_INSUFFICIENT_PERMISSIONS: Self = Self("user_insufficient_permissions");
    /// An entity that must exist does not.
    pub const ENTITY_NOT_FOUND: Self = Self("entity_not_found");
    /// An entity that must not exist does.
    pub const ENTITY_ALREADY_EXISTS: Self = Self("entity_already_exists");
    /// The data source failed.
    pub const REPOSITORY_FAILURE: Self = Self("repository_failure");
    /// Stored role data is inconsistent.
    pub const MALFORMED_ROLE_ASSIGNMENT: Self = Self("malformed_role_assignment");
    /// A value could not be parsed.
    pub const INVALID_VALUE: Self = Self("invalid_value");

    /// The wire representation.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A textual value did not name any member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseError {
    /// The enumeration being parsed, e.g. "campaign role".
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Error code for this failure.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::INVALID_VALUE
    }
}
