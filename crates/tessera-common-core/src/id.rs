//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A strongly-typed, string-backed ID wrapper.
///
/// Campaign and class identifiers are URNs chosen by their authors, so the
/// wrappers hold the original text rather than a parsed UUID. Surrounding
/// whitespace is trimmed and empty values are rejected.
macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[doc = concat!("Identifier of a ", $label, ".")]
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse from string, rejecting blank input.
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(IdParseError::Blank { kind: $label });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Adds random generation to IDs whose values are server-assigned UUIDs.
macro_rules! generated_id {
    ($name:ident) => {
        impl $name {
            /// Create a new random ID.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }
        }
    };
}

/// Error parsing an ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    /// The ID was empty or whitespace.
    #[error("{kind} identifier must not be blank")]
    Blank {
        /// Which identifier kind failed.
        kind: &'static str,
    },
}

define_id!(Username, "user");
define_id!(CampaignId, "campaign");
define_id!(ClassId, "class");
define_id!(DocumentId, "document");
define_id!(ResourceId, "resource");

generated_id!(DocumentId);
generated_id!(ResourceId);
