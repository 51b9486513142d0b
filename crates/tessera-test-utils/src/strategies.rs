//! Proptest strategies for Tessera domain types.

use proptest::prelude::*;
use proptest::test_runner::Config;
use tessera_authz::{
    Action, CampaignPrivacyState, CampaignRole, DocumentRole, ResourcePrivacyState, RoleSet,
};

/// Case count from `PROPTEST_CASES`: `quick`, `ci` or the default.
pub fn env_config() -> Config {
    match std::env::var("PROPTEST_CASES").ok().as_deref() {
        Some("quick") => Config::with_cases(32),
        Some("ci") => Config::with_cases(1_024),
        _ => Config::with_cases(256),
    }
}

/// One of a small set of usernames.
pub fn username() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["alice", "bob", "carol", "dave"]).prop_map(String::from)
}

/// Any action.
pub fn action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

/// Any resource privacy state.
pub fn resource_privacy() -> impl Strategy<Value = ResourcePrivacyState> {
    prop::sample::select(ResourcePrivacyState::ALL.to_vec())
}

/// Any campaign privacy state.
pub fn campaign_privacy() -> impl Strategy<Value = CampaignPrivacyState> {
    prop::sample::select(CampaignPrivacyState::ALL.to_vec())
}

/// Any document role.
pub fn document_role() -> impl Strategy<Value = DocumentRole> {
    prop::sample::select(DocumentRole::ALL.to_vec())
}

/// Any subset of campaign roles, including the empty set.
pub fn campaign_roles() -> impl Strategy<Value = RoleSet<CampaignRole>> {
    prop::sample::subsequence(CampaignRole::ALL.to_vec(), 0..=CampaignRole::ALL.len())
        .prop_map(|roles| roles.into_iter().collect())
}
