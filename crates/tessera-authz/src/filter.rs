//! Privacy filtering of query results.

use crate::model::{
    Action, CampaignPrivacyState, ContainerRef, ContainerRoles, Identity, ProtectedResource,
    ResourcePrivacyState,
};
use crate::policy::PrivacyPolicy;

/// Removes resources the identity may not view.
///
/// The input is consumed and a new `Vec` built; relative order is kept.
pub struct ResultFilter<'p> {
    policy: &'p PrivacyPolicy,
}

impl<'p> ResultFilter<'p> {
    /// Filter deciding with `policy`.
    pub fn new(policy: &'p PrivacyPolicy) -> Self {
        Self { policy }
    }

    /// Keep resources in `container` that the policy lets `identity` view.
    /// Resources from any other container are dropped.
    pub fn filter<T: ProtectedResource>(
        &self,
        identity: &Identity,
        container: &ContainerRef,
        roles: &ContainerRoles,
        container_privacy: Option<CampaignPrivacyState>,
        resources: Vec<T>,
    ) -> Vec<T> {
        resources
            .into_iter()
            .filter(|r| &r.container() == container)
            .filter(|r| {
                self.policy
                    .can_perform(identity, Action::View, r, roles, container_privacy)
            })
            .collect()
    }

    /// Access filter, then keep only resources in exactly `narrow_to`.
    pub fn filter_with_privacy<T: ProtectedResource>(
        &self,
        identity: &Identity,
        container: &ContainerRef,
        roles: &ContainerRoles,
        container_privacy: Option<CampaignPrivacyState>,
        resources: Vec<T>,
        narrow_to: Option<ResourcePrivacyState>,
    ) -> Vec<T> {
        let visible = self.filter(identity, container, roles, container_privacy, resources);
        match narrow_to {
            None => visible,
            Some(state) => visible
                .into_iter()
                .filter(|r| r.privacy_state() == state)
                .collect(),
        }
    }
}
