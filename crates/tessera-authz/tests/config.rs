//! Engines built from configuration files.

use std::time::Duration;
use tessera_authz::{
    Action, AuthzEngine, CampaignPrivacyState, CampaignRole, PreferenceCache, ResourcePrivacyState,
};
use tessera_common_config::ConfigLoader;
use tessera_test_utils::fixtures::CampaignWorld;
use tessera_test_utils::temp_file;

#[test]
fn test_strict_participant_reading_from_yaml() {
    let (_dir, path) = temp_file(
        "tessera.yaml",
        "policy:\n  sole_participant_restriction: false\n  log_granted_decisions: true\n",
    );
    let config = ConfigLoader::with_file(&path).load().unwrap();

    let world = CampaignWorld::new(CampaignPrivacyState::Shared);
    let bob = world.member("bob", &[CampaignRole::Participant, CampaignRole::Analyst]);
    let data = world.response("alice", ResourcePrivacyState::Invisible);

    let default_engine = world.engine();
    assert!(default_engine.authorize(&bob, Action::View, &data).is_ok());

    let strict = AuthzEngine::from_config(world.repo.clone(), &config.policy);
    assert!(strict.authorize(&bob, Action::View, &data).is_err());
}

#[test]
fn test_cache_max_age_from_config() {
    let (_dir, path) = temp_file("tessera.yaml", "cache:\n  max_age_secs: 1\n");
    let config = ConfigLoader::with_file(&path).load().unwrap();

    let world = CampaignWorld::new(CampaignPrivacyState::Private);
    world.repo.set_preference("generation", "first");
    let cache = PreferenceCache::from_config(world.repo.clone(), &config.cache);
    assert_eq!(cache.snapshot().unwrap().get("generation"), Some("first"));

    world.repo.set_preference("generation", "second");
    assert_eq!(cache.snapshot().unwrap().get("generation"), Some("first"));

    std::thread::sleep(Duration::from_millis(1_100));
    assert_eq!(cache.snapshot().unwrap().get("generation"), Some("second"));
}
