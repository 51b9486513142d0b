//! Document-level checks.
//!
//! Read, modify and delete go through the privacy table with the stored
//! document record. Besides the effective document role, a supervisor of any
//! campaign the document is shared with, or a privileged member of any such
//! class, may read, modify and delete it whatever its privacy state.

use super::AuthzEngine;
use crate::error::{AuthzError, AuthzResult};
use crate::grant::RoleMutationGuard;
use crate::model::{
    Action, CampaignRole, ClassRole, ContainerKind, EntityKind, Identity, ProtectedResource,
};
use tessera_common_core::{DocumentId, Username};

impl AuthzEngine {
    /// Readers see shared documents, writers anything not invisible, owners
    /// everything.
    pub fn verify_can_read_document(&self, identity: &Identity, document: &DocumentId) -> AuthzResult<()> {
        self.audited(identity, "verify_can_read_document", document.as_str(), None, || {
            self.check_document(identity, Action::View, document)
        })
    }

    /// Writers may modify documents that are not invisible.
    pub fn verify_can_modify_document(&self, identity: &Identity, document: &DocumentId) -> AuthzResult<()> {
        self.audited(identity, "verify_can_modify_document", document.as_str(), None, || {
            self.check_document(identity, Action::Modify, document)
        })
    }

    /// Only the creator and owners may delete, besides the linkage override.
    pub fn verify_can_delete_document(&self, identity: &Identity, document: &DocumentId) -> AuthzResult<()> {
        self.audited(identity, "verify_can_delete_document", document.as_str(), None, || {
            self.check_document(identity, Action::Delete, document)
        })
    }

    /// Removing another user's access needs a role at least as high as theirs.
    pub fn verify_can_disassociate_user_from_document(
        &self,
        identity: &Identity,
        document: &DocumentId,
        other: &Username,
    ) -> AuthzResult<()> {
        self.audited(
            identity,
            "verify_can_disassociate_user_from_document",
            document.as_str(),
            None,
            || {
                if identity.is_admin() {
                    return Ok(());
                }
                let resolver = self.resolver();
                let mine = resolver.document_role(identity, document)?;
                let theirs = resolver.document_role(&Identity::user(other.clone()), document)?;
                if RoleMutationGuard::can_revoke(mine, theirs) {
                    return Ok(());
                }
                Err(AuthzError::denied(
                    ContainerKind::Document,
                    format!(
                        "{other} holds {} on the document, above the requester's {}",
                        theirs.map_or("no role", |r| r.as_str()),
                        mine.map_or("no role", |r| r.as_str()),
                    ),
                ))
            },
        )
    }

    fn check_document(&self, identity: &Identity, action: Action, document: &DocumentId) -> AuthzResult<()> {
        let record = self
            .repo
            .document_record(document)?
            .ok_or_else(|| AuthzError::not_found(EntityKind::Document, document.as_str()))?;
        let decision = self.decide(identity, action, &record, &record.container())?;
        if decision.allowed {
            Ok(())
        } else {
            Err(AuthzError::denied(
                ContainerKind::Document,
                format!("cannot {action} document {document}: {}", decision.reason()),
            ))
        }
    }

    pub(super) fn has_linkage_override(&self, identity: &Identity, document: &DocumentId) -> AuthzResult<bool> {
        for campaign in self.repo.campaigns_for_document(document)? {
            if self
                .repo
                .campaign_roles(identity.username(), &campaign)?
                .contains(CampaignRole::Supervisor)
            {
                return Ok(true);
            }
        }
        for class in self.repo.classes_for_document(document)? {
            if self.repo.class_role(identity.username(), &class)? == Some(ClassRole::Privileged) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
