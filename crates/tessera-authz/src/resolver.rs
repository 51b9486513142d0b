//! Computes the roles an identity holds in a container.

use crate::error::{AuthzError, AuthzResult};
use crate::model::{
    CampaignRole, ClassRole, ContainerRef, ContainerRoles, DocumentRole, Entity, Identity,
    RoleSet,
};
use crate::repository::Repository;
use tessera_common_core::{CampaignId, ClassId, DocumentId};
use tessera_common_log::spans::repository_span;

/// Turns repository rows into role sets.
///
/// A missing container is `NotFound`; an existing container the identity
/// does not belong to resolves to an empty role set.
pub struct RoleResolver<'a> {
    repo: &'a dyn Repository,
}

impl<'a> RoleResolver<'a> {
    /// Resolver reading from `repo`.
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    /// Roles held in any kind of container.
    pub fn resolve(&self, identity: &Identity, container: &ContainerRef) -> AuthzResult<ContainerRoles> {
        Ok(match container {
            ContainerRef::Campaign(id) => ContainerRoles::Campaign(self.campaign_roles(identity, id)?),
            ContainerRef::Class(id) => ContainerRoles::Class(self.class_role(identity, id)?),
            ContainerRef::Document(id) => ContainerRoles::Document(self.document_role(identity, id)?),
        })
    }

    /// Roles held in the campaign. `NotFound` if it does not exist.
    pub fn campaign_roles(
        &self,
        identity: &Identity,
        campaign: &CampaignId,
    ) -> AuthzResult<RoleSet<CampaignRole>> {
        self.require_exists(campaign)?;
        let roles = repository_span("campaign_roles")
            .in_scope(|| self.repo.campaign_roles(identity.username(), campaign))?;
        Ok(roles)
    }

    /// Role held in the class. `NotFound` if it does not exist.
    pub fn class_role(&self, identity: &Identity, class: &ClassId) -> AuthzResult<Option<ClassRole>> {
        self.require_exists(class)?;
        let role = repository_span("class_role")
            .in_scope(|| self.repo.class_role(identity.username(), class))?;
        Ok(role)
    }

    /// Effective document role: the maximum over the direct grant and every
    /// linked class and campaign.
    pub fn document_role(
        &self,
        identity: &Identity,
        document: &DocumentId,
    ) -> AuthzResult<Option<DocumentRole>> {
        self.require_exists(document)?;
        let sources = repository_span("document_role_sources")
            .in_scope(|| self.repo.document_role_sources(identity.username(), document))?;

        if !sources.via_campaigns.is_empty() && self.repo.campaigns_for_document(document)?.is_empty() {
            return Err(AuthzError::MalformedRoleAssignment {
                detail: format!(
                    "{} holds a campaign-derived role on document {document} which is linked to no campaign",
                    identity.username()
                ),
            });
        }
        if !sources.via_classes.is_empty() && self.repo.classes_for_document(document)?.is_empty() {
            return Err(AuthzError::MalformedRoleAssignment {
                detail: format!(
                    "{} holds a class-derived role on document {document} which is linked to no class",
                    identity.username()
                ),
            });
        }

        Ok(sources.effective())
    }

    fn require_exists<E: Entity>(&self, id: &E) -> AuthzResult<()> {
        let exists = repository_span("entity_exists")
            .in_scope(|| self.repo.entity_exists(id.id_str(), E::KIND))?;
        if exists {
            Ok(())
        } else {
            Err(AuthzError::not_found(E::KIND, id.id_str()))
        }
    }
}
