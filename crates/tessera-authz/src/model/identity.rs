use serde::{Deserialize, Serialize};
use tessera_common_core::Username;

/// The authenticated caller of an engine operation.
///
/// Admin status is resolved once when the identity is built and travels
/// with it; it short-circuits every container check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    username: Username,
    is_admin: bool,
}

impl Identity {
    /// Identity with an explicit admin flag.
    pub fn new(username: Username, is_admin: bool) -> Self {
        Self { username, is_admin }
    }

    /// A non-admin identity.
    pub fn user(username: Username) -> Self {
        Self::new(username, false)
    }

    /// An admin identity.
    pub fn admin(username: Username) -> Self {
        Self::new(username, true)
    }

    /// The authenticated user.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Whether the user is a global admin.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Whether this identity is the given user.
    pub fn is(&self, user: &Username) -> bool {
        &self.username == user
    }
}
