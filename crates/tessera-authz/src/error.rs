//! Engine error taxonomy.

use crate::cache::CacheError;
use crate::existence::ExistenceError;
use crate::model::{ContainerKind, EntityKind};
use crate::repository::RepositoryError;
use tessera_common_core::ErrorCode;
use thiserror::Error;

/// Result alias for engine operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Why an engine operation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// The caller lacks the role or privacy clearance for the operation.
    #[error("insufficient permissions: {reason}")]
    InsufficientPermissions {
        /// Container-specific denial code.
        code: ErrorCode,
        /// Why the request was denied.
        reason: String,
    },

    /// A referenced entity does not exist.
    #[error("{kind} {} does not exist", id.as_deref().unwrap_or("<none>"))]
    NotFound {
        /// Kind of entity looked up.
        kind: EntityKind,
        /// Its id, if one was given.
        id: Option<String>,
    },

    /// An entity that must be new already exists.
    #[error("{kind} {id} already exists")]
    AlreadyExists {
        /// Kind of entity.
        kind: EntityKind,
        /// The existing id.
        id: String,
    },

    /// The repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A preference lookup failed.
    #[error(transparent)]
    Preference(#[from] CacheError),

    /// Stored role data contradicts itself.
    #[error("malformed role assignment: {detail}")]
    MalformedRoleAssignment {
        /// What was wrong with the stored assignment.
        detail: String,
    },
}

impl AuthzError {
    /// A denial scoped to the given container kind.
    pub fn denied(kind: ContainerKind, reason: impl Into<String>) -> Self {
        let code = match kind {
            ContainerKind::Campaign => ErrorCode::CAMPAIGN_INSUFFICIENT_PERMISSIONS,
            ContainerKind::Class => ErrorCode::CLASS_INSUFFICIENT_PERMISSIONS,
            ContainerKind::Document => ErrorCode::DOCUMENT_INSUFFICIENT_PERMISSIONS,
        };
        Self::InsufficientPermissions {
            code,
            reason: reason.into(),
        }
    }

    /// A denial about another user's data.
    pub fn user_denied(reason: impl Into<String>) -> Self {
        Self::InsufficientPermissions {
            code: ErrorCode::USER_INSUFFICIENT_PERMISSIONS,
            reason: reason.into(),
        }
    }

    /// A denial on an individual resource.
    pub fn resource_denied(reason: impl Into<String>) -> Self {
        Self::InsufficientPermissions {
            code: ErrorCode::RESOURCE_INSUFFICIENT_PERMISSIONS,
            reason: reason.into(),
        }
    }

    /// `NotFound` for a known id.
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: Some(id.into()),
        }
    }

    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InsufficientPermissions { code, .. } => *code,
            Self::NotFound { .. } => ErrorCode::ENTITY_NOT_FOUND,
            Self::AlreadyExists { .. } => ErrorCode::ENTITY_ALREADY_EXISTS,
            Self::Repository(e) => e.code(),
            Self::Preference(e) => e.code(),
            Self::MalformedRoleAssignment { .. } => ErrorCode::MALFORMED_ROLE_ASSIGNMENT,
        }
    }

    /// True for ordinary "no" answers, false for faults.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::InsufficientPermissions { .. })
    }
}

impl From<ExistenceError> for AuthzError {
    fn from(err: ExistenceError) -> Self {
        match err {
            ExistenceError::NotFound { kind, id } => Self::NotFound { kind, id },
            ExistenceError::AlreadyExists { kind, id } => Self::AlreadyExists { kind, id },
            ExistenceError::Repository(e) => Self::Repository(e),
        }
    }
}
