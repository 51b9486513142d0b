//! Campaign-level checks.

use super::AuthzEngine;
use crate::error::{AuthzError, AuthzResult};
use crate::model::{CampaignRole, ContainerKind, Identity};
use tessera_common_core::{CampaignId, Username};

impl AuthzEngine {
    /// Uploading survey data requires the participant role.
    pub fn verify_can_upload(&self, identity: &Identity, campaign: &CampaignId) -> AuthzResult<()> {
        self.audited(identity, "verify_can_upload", campaign.as_str(), None, || {
            if identity.is_admin() {
                return Ok(());
            }
            if self.campaign_roles(identity, campaign)?.contains(CampaignRole::Participant) {
                Ok(())
            } else {
                Err(AuthzError::denied(
                    ContainerKind::Campaign,
                    "uploading requires the participant role",
                ))
            }
        })
    }

    /// Supervisors and authors may change campaign settings and membership.
    pub fn verify_can_update_campaign(&self, identity: &Identity, campaign: &CampaignId) -> AuthzResult<()> {
        self.audited(identity, "verify_can_update_campaign", campaign.as_str(), None, || {
            self.require_supervisor_or_author(identity, campaign)
        })
    }

    /// The survey definition is frozen once any response exists.
    pub fn verify_can_update_campaign_definition(
        &self,
        identity: &Identity,
        campaign: &CampaignId,
    ) -> AuthzResult<()> {
        self.audited(
            identity,
            "verify_can_update_campaign_definition",
            campaign.as_str(),
            None,
            || {
                self.require_supervisor_or_author(identity, campaign)?;
                let responses = self.repo.survey_response_count(campaign)?;
                if responses > 0 {
                    return Err(AuthzError::denied(
                        ContainerKind::Campaign,
                        format!("the campaign definition is frozen: {responses} survey responses exist"),
                    ));
                }
                Ok(())
            },
        )
    }

    /// Supervisors may always delete; authors only while no responses exist.
    pub fn verify_can_delete_campaign(&self, identity: &Identity, campaign: &CampaignId) -> AuthzResult<()> {
        self.audited(identity, "verify_can_delete_campaign", campaign.as_str(), None, || {
            if identity.is_admin() {
                return Ok(());
            }
            let roles = self.campaign_roles(identity, campaign)?;
            if roles.contains(CampaignRole::Supervisor) {
                return Ok(());
            }
            if !roles.contains(CampaignRole::Author) {
                return Err(AuthzError::denied(
                    ContainerKind::Campaign,
                    "deleting a campaign requires the supervisor or author role",
                ));
            }
            match self.repo.survey_response_count(campaign)? {
                0 => Ok(()),
                n => Err(AuthzError::denied(
                    ContainerKind::Campaign,
                    format!("authors may not delete a campaign with {n} survey responses"),
                )),
            }
        })
    }

    /// Only supervisors may list members and their roles.
    pub fn verify_can_read_member_info(&self, identity: &Identity, campaign: &CampaignId) -> AuthzResult<()> {
        self.audited(identity, "verify_can_read_member_info", campaign.as_str(), None, || {
            if identity.is_admin() || self.campaign_roles(identity, campaign)?.has_top() {
                Ok(())
            } else {
                Err(AuthzError::denied(
                    ContainerKind::Campaign,
                    "reading member information requires the supervisor role",
                ))
            }
        })
    }

    /// Whether `identity` may read survey data belonging to `subjects`.
    ///
    /// Anyone may read their own data. Supervisors and authors may read
    /// anyone's; analysts only in shared campaigns.
    pub fn verify_can_view_users_data(
        &self,
        identity: &Identity,
        campaign: &CampaignId,
        subjects: &[Username],
    ) -> AuthzResult<()> {
        self.audited(identity, "verify_can_view_users_data", campaign.as_str(), None, || {
            if identity.is_admin() || subjects.iter().all(|s| identity.is(s)) {
                return Ok(());
            }
            let roles = self.campaign_roles(identity, campaign)?;
            if roles.contains_any(&[CampaignRole::Supervisor, CampaignRole::Author]) {
                return Ok(());
            }
            if roles.contains(CampaignRole::Analyst)
                && self.repo.campaign_privacy_state(campaign)?.is_shared()
            {
                return Ok(());
            }
            Err(AuthzError::user_denied(
                "reading another user's data requires the supervisor or author role, or the analyst role in a shared campaign",
            ))
        })
    }

    fn require_supervisor_or_author(&self, identity: &Identity, campaign: &CampaignId) -> AuthzResult<()> {
        if identity.is_admin() {
            return Ok(());
        }
        let roles = self.campaign_roles(identity, campaign)?;
        if roles.contains_any(&[CampaignRole::Supervisor, CampaignRole::Author]) {
            Ok(())
        } else {
            Err(AuthzError::denied(
                ContainerKind::Campaign,
                "updating a campaign requires the supervisor or author role",
            ))
        }
    }
}
