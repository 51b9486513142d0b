//! Authorization and privacy filtering for Tessera.
//!
//! Decides whether a user may view, modify, delete or annotate survey data,
//! media and documents, given the roles they hold in the enclosing campaign,
//! class or document and the privacy states involved. Collections of query
//! results are filtered with the same rules.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tessera_authz::{AuthzEngine, InMemoryRepository};
//! use tessera_common_core::Username;
//!
//! let repo = Arc::new(InMemoryRepository::new());
//! let engine = AuthzEngine::new(repo);
//! let identity = engine.identify(&Username::parse("alice").unwrap());
//! ```

pub mod audit;
pub mod cache;
pub mod engine;
pub mod error;
pub mod existence;
pub mod filter;
pub mod grant;
pub mod memory;
pub mod model;
pub mod policy;
pub mod repository;
pub mod resolver;

pub use cache::{CacheError, PreferenceCache, PreferenceSnapshot, PreferenceSource};
pub use engine::AuthzEngine;
pub use error::{AuthzError, AuthzResult};
pub use existence::{ExistenceError, ExistenceGuard};
pub use filter::ResultFilter;
pub use grant::RoleMutationGuard;
pub use memory::InMemoryRepository;
pub use model::*;
pub use policy::{Decision, PolicyOptions, PrivacyPolicy, Rule};
pub use repository::{Repository, RepositoryError};
pub use resolver::RoleResolver;
