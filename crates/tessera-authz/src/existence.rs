//! Existence preconditions for create/update/delete flows.

use crate::model::{Entity, EntityKind};
use crate::repository::{Repository, RepositoryError};
use tessera_common_log::spans::repository_span;
use thiserror::Error;

/// An entity was, or was not, where the caller needed it to be.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExistenceError {
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
}

/// Compare a known existence fact against the caller's expectation.
///
/// A missing id counts as "does not exist".
pub fn evaluate(
    kind: EntityKind,
    id: Option<&str>,
    exists: bool,
    should_exist: bool,
) -> Result<(), ExistenceError> {
    match (exists, should_exist) {
        (true, false) => Err(ExistenceError::AlreadyExists {
            kind,
            id: id.unwrap_or_default().to_string(),
        }),
        (false, true) => Err(ExistenceError::NotFound {
            kind,
            id: id.map(str::to_string),
        }),
        _ => Ok(()),
    }
}

/// Checks entity existence against the repository.
pub struct ExistenceGuard<'a> {
    repo: &'a dyn Repository,
}

impl<'a> ExistenceGuard<'a> {
    /// Guard reading from `repo`.
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    /// Fail unless the entity's existence matches `should_exist`.
    pub fn check<E: Entity>(&self, id: Option<&E>, should_exist: bool) -> Result<(), ExistenceError> {
        let Some(id) = id else {
            return evaluate(E::KIND, None, false, should_exist);
        };
        let exists = repository_span("entity_exists")
            .in_scope(|| self.repo.entity_exists(id.id_str(), E::KIND))?;
        evaluate(E::KIND, Some(id.id_str()), exists, should_exist)
    }

    /// Check every id, stopping at the first failure.
    pub fn check_all<'i, E, I>(&self, ids: I, should_exist: bool) -> Result<(), ExistenceError>
    where
        E: Entity + 'i,
        I: IntoIterator<Item = &'i E>,
    {
        ids.into_iter()
            .try_for_each(|id| self.check(Some(id), should_exist))
    }
}
