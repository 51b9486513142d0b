//! Class membership checks and mobility access.

use super::AuthzEngine;
use crate::cache::keys;
use crate::error::{AuthzError, AuthzResult};
use crate::model::{ClassRole, ContainerKind, Identity, MobilityPoint};
use tessera_common_core::{ClassId, Username};

impl AuthzEngine {
    /// Admin, or privileged in every listed class.
    pub fn verify_class_admin_or_privileged(&self, identity: &Identity, classes: &[ClassId]) -> AuthzResult<()> {
        let scope = classes
            .iter()
            .map(ClassId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.audited(identity, "verify_class_admin_or_privileged", &scope, None, || {
            if identity.is_admin() {
                return Ok(());
            }
            let resolver = self.resolver();
            for class in classes {
                if resolver.class_role(identity, class)? != Some(ClassRole::Privileged) {
                    return Err(AuthzError::denied(
                        ContainerKind::Class,
                        format!("requester is not privileged in {class}"),
                    ));
                }
            }
            Ok(())
        })
    }

    /// Privileged in at least one class `other` belongs to.
    pub fn verify_privileged_in_users_class(&self, identity: &Identity, other: &Username) -> AuthzResult<()> {
        self.audited(identity, "verify_privileged_in_users_class", other.as_str(), None, || {
            if identity.is_admin() || self.privileged_in_users_class(identity, other)? {
                Ok(())
            } else {
                Err(AuthzError::user_denied(format!(
                    "requester is not privileged in any class {other} belongs to"
                )))
            }
        })
    }

    /// Users read their own mobility data. Others need the server preference
    /// enabled and a privileged seat in one of the subject's classes.
    pub fn verify_can_read_mobility(&self, identity: &Identity, subject: &Username) -> AuthzResult<()> {
        self.audited(identity, "verify_can_read_mobility", subject.as_str(), None, || {
            self.check_mobility_access(identity, subject)
        })
    }

    /// Mobility points of `subject` visible to `identity`. Other readers only
    /// see shared points.
    pub fn filter_mobility(
        &self,
        identity: &Identity,
        subject: &Username,
        points: Vec<MobilityPoint>,
    ) -> AuthzResult<Vec<MobilityPoint>> {
        self.audited(identity, "filter_mobility", subject.as_str(), None, || {
            self.check_mobility_access(identity, subject)?;
            let full_view = identity.is_admin() || identity.is(subject);
            Ok(points
                .into_iter()
                .filter(|p| &p.owner == subject)
                .filter(|p| full_view || p.privacy.is_shared())
                .collect())
        })
    }

    fn check_mobility_access(&self, identity: &Identity, subject: &Username) -> AuthzResult<()> {
        if identity.is_admin() || identity.is(subject) {
            return Ok(());
        }
        if !self.preference_enabled(keys::PRIVILEGED_CAN_VIEW_CLASS_MOBILITY)? {
            return Err(AuthzError::user_denied(
                "reading another user's mobility data is disabled on this server",
            ));
        }
        if self.privileged_in_users_class(identity, subject)? {
            Ok(())
        } else {
            Err(AuthzError::user_denied(format!(
                "requester is not privileged in any class {subject} belongs to"
            )))
        }
    }

    fn privileged_in_users_class(&self, identity: &Identity, other: &Username) -> AuthzResult<bool> {
        for class in self.repo.classes_for_user(other)? {
            if self.repo.class_role(identity.username(), &class)? == Some(ClassRole::Privileged) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
