//! Domain vocabulary: identities, roles, privacy states, containers and the
//! resources that live in them.

/// Closed enumeration with a lowercase wire name per variant.
///
/// Variants are declared in ascending order of privilege where ordering
/// matters, so the derived `Ord` ranks them.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, lowest first.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Lowercase wire name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = tessera_common_core::ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(tessera_common_core::ParseError::new($kind, s)),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

mod container;
mod identity;
mod privacy;
mod resource;
mod role;

pub use container::{Action, ContainerKind, ContainerRef, Entity, EntityKind};
pub use identity::Identity;
pub use privacy::{CampaignPrivacyState, ResourcePrivacyState};
pub use resource::{
    DocumentRecord, MediaItem, MediaKind, MobilityPoint, ProtectedResource, SurveyResponse,
};
pub use role::{
    AnyRole, CampaignRole, ClassRole, ContainerRoles, DocumentRole, DocumentRoleSources, Role,
    RoleAssignment, RoleSet,
};
