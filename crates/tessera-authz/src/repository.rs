//! Data-source seam for role, privacy and linkage facts.
//!
//! Implementations do blocking I/O; everything above this trait is pure.
//! Nothing read through it is cached across requests.

use crate::model::{
    CampaignPrivacyState, CampaignRole, ClassRole, DocumentRecord, DocumentRoleSources, EntityKind,
    RoleSet,
};
use tessera_common_core::{CampaignId, ClassId, DocumentId, ErrorCode, Username};
use thiserror::Error;

/// Failure reading from the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The backing store cannot be reached.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// A query failed.
    #[error("query {query} failed: {message}")]
    Query {
        /// Name of the failed query.
        query: &'static str,
        /// Backend message.
        message: String,
    },
}

impl RepositoryError {
    /// Failure of the named query.
    pub fn query(query: &'static str, message: impl Into<String>) -> Self {
        Self::Query {
            query,
            message: message.into(),
        }
    }

    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::REPOSITORY_FAILURE
    }
}

/// Read-only access to the facts authorization decisions depend on.
#[cfg_attr(test, mockall::automock)]
pub trait Repository: Send + Sync {
    /// Roles the user holds in the campaign. Empty for non-members.
    fn campaign_roles(
        &self,
        user: &Username,
        campaign: &CampaignId,
    ) -> Result<RoleSet<CampaignRole>, RepositoryError>;

    /// The user's role in the class, if a member.
    fn class_role(
        &self,
        user: &Username,
        class: &ClassId,
    ) -> Result<Option<ClassRole>, RepositoryError>;

    /// Every route through which the user holds a role on the document.
    fn document_role_sources(
        &self,
        user: &Username,
        document: &DocumentId,
    ) -> Result<DocumentRoleSources, RepositoryError>;

    /// The document's creator and privacy state. `None` if it is not stored.
    fn document_record(&self, document: &DocumentId) -> Result<Option<DocumentRecord>, RepositoryError>;

    /// The campaign's privacy state. Missing campaigns are an error.
    fn campaign_privacy_state(
        &self,
        campaign: &CampaignId,
    ) -> Result<CampaignPrivacyState, RepositoryError>;

    /// Whether an entity of `kind` with this id is stored.
    fn entity_exists(&self, id: &str, kind: EntityKind) -> Result<bool, RepositoryError>;

    /// Whether the user holds the global admin flag.
    fn is_admin(&self, user: &Username) -> Result<bool, RepositoryError>;

    /// Number of survey responses uploaded to the campaign.
    fn survey_response_count(&self, campaign: &CampaignId) -> Result<u64, RepositoryError>;

    /// Campaigns the document is shared with.
    fn campaigns_for_document(
        &self,
        document: &DocumentId,
    ) -> Result<Vec<CampaignId>, RepositoryError>;

    /// Classes the document is shared with.
    fn classes_for_document(&self, document: &DocumentId)
        -> Result<Vec<ClassId>, RepositoryError>;

    /// Classes the user is a member of.
    fn classes_for_user(&self, user: &Username) -> Result<Vec<ClassId>, RepositoryError>;
}
