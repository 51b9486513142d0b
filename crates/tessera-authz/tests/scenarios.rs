//! End-to-end decisions against the in-memory repository.

use std::sync::Arc;
use tessera_authz::{
    Action, AnyRole, AuthzEngine, AuthzError, CampaignPrivacyState, CampaignRole, ClassRole, ContainerRef,
    DocumentRole, Identity, InMemoryRepository, MediaKind, ResourcePrivacyState,
};
use tessera_common_core::{CampaignId, ClassId, DocumentId, ErrorCode, Username};
use tessera_test_utils::fixtures::{self, CampaignWorld};
use tessera_test_utils::{assert_denied, assert_err, assert_ok, init_test_tracing};
use test_case::test_case;

use CampaignPrivacyState as C;
use CampaignRole::*;
use ResourcePrivacyState as R;

#[test_case(C::Shared, R::Shared, &[Author], true ; "shared author")]
#[test_case(C::Private, R::Shared, &[Author], false ; "private campaign author")]
#[test_case(C::Shared, R::Invisible, &[Participant, Author], true ; "participant author invisible")]
#[test_case(C::Shared, R::Invisible, &[Participant], false ; "sole participant invisible")]
#[test_case(C::Private, R::Private, &[Participant], true ; "sole participant private")]
#[test_case(C::Shared, R::Shared, &[Analyst], true ; "shared analyst")]
#[test_case(C::Private, R::Invisible, &[Supervisor], true ; "supervisor")]
#[test_case(C::Shared, R::Shared, &[], false ; "outsider")]
fn test_view_scenarios(campaign: C, resource: R, roles: &[CampaignRole], allowed: bool) {
    init_test_tracing();
    let world = CampaignWorld::new(campaign);
    let requester = world.member("bob", roles);
    let data = world.response("alice", resource);

    let result = world.engine().authorize(&requester, Action::View, &data);
    assert_eq!(result.is_ok(), allowed, "{result:?}");
    if let Err(err) = result {
        assert!(err.is_denial());
    }
}

#[test]
fn test_owner_can_modify_invisible_data() {
    let world = CampaignWorld::new(C::Private);
    let alice = world.member("alice", &[Participant]);
    let data = world.response("alice", R::Invisible);
    assert_ok!(world.engine().authorize(&alice, Action::Modify, &data));
    assert_ok!(world.engine().authorize(&alice, Action::Delete, &data));
}

#[test]
fn test_only_supervisor_annotates() {
    let world = CampaignWorld::new(C::Shared);
    let author = world.member("bob", &[Author, Analyst]);
    let supervisor = world.member("sue", &[Supervisor]);
    let data = world.response("alice", R::Shared);
    let engine = world.engine();

    assert_denied!(engine.verify_can_annotate(&author, &data));
    assert_ok!(engine.verify_can_annotate(&supervisor, &data));
}

#[test]
fn test_media_follows_the_same_rules() {
    let world = CampaignWorld::new(C::Shared);
    let analyst = world.member("bob", &[Analyst]);
    let engine = world.engine();

    let shared = fixtures::media_item("alice", &world.campaign, MediaKind::Image, R::Shared);
    let private = fixtures::media_item("alice", &world.campaign, MediaKind::Audio, R::Private);
    assert_ok!(engine.authorize(&analyst, Action::View, &shared));
    assert_denied!(engine.authorize(&analyst, Action::View, &private));
}

#[test]
fn test_filter_visible_keeps_order() {
    let world = CampaignWorld::new(C::Shared);
    let bob = world.member("bob", &[Author]);
    let data = vec![
        world.response("alice", R::Private),
        world.response("carol", R::Shared),
        world.response("bob", R::Invisible),
        world.response("dave", R::Shared),
    ];
    let expected = vec![data[1].id.clone(), data[2].id.clone(), data[3].id.clone()];

    let visible = world
        .engine()
        .filter_visible(&bob, &ContainerRef::from(world.campaign.clone()), data);
    let ids: Vec<_> = visible.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_filter_with_privacy_narrows_after_access() {
    let world = CampaignWorld::new(C::Shared);
    let bob = world.member("bob", &[Analyst]);
    let data = vec![
        world.response("alice", R::Private),
        world.response("bob", R::Private),
        world.response("carol", R::Shared),
    ];

    let visible = world.engine().filter_visible_with_privacy(
        &bob,
        &ContainerRef::from(world.campaign.clone()),
        data,
        Some(R::Private),
    );
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].owner.as_str(), "bob");
}

#[test]
fn test_filter_on_missing_campaign_is_empty() {
    let world = CampaignWorld::new(C::Shared);
    let bob = world.member("bob", &[Supervisor]);
    let ghost = CampaignId::parse("urn:campaign:ghost").unwrap();
    let data = vec![fixtures::survey_response("bob", &ghost, R::Shared)];

    assert!(world
        .engine()
        .filter_visible(&bob, &ContainerRef::from(ghost), data)
        .is_empty());
}

#[test]
fn test_existence_guard() {
    let world = CampaignWorld::new(C::Shared);
    let engine = world.engine();

    assert_err!(
        engine.guard_existence::<CampaignId>(None, true),
        AuthzError::NotFound { id: None, .. }
    );
    assert_ok!(engine.guard_existence(Some(&world.campaign), true));
    assert_err!(
        engine.guard_existence(Some(&world.campaign), false),
        AuthzError::AlreadyExists { .. }
    );

    let fresh = CampaignId::parse("urn:campaign:new").unwrap();
    assert_ok!(engine.guard_existence(Some(&fresh), false));
    assert_ok!(engine.guard_existence_all([&world.campaign], true));
    assert_err!(engine.guard_existence_all([&world.campaign, &fresh], true));
}

#[test]
fn test_campaign_grant_guard() {
    let world = CampaignWorld::new(C::Private);
    let author = world.member("bob", &[Author]);
    let supervisor = world.member("sue", &[Supervisor]);
    let container = ContainerRef::from(world.campaign.clone());
    let engine = world.engine();

    assert_ok!(engine.guard_role_grant(&author, &container, &[AnyRole::from(Participant), AnyRole::from(Author)]));
    let err = engine
        .guard_role_grant(&author, &container, &[AnyRole::from(Participant), AnyRole::from(Supervisor)])
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CAMPAIGN_INSUFFICIENT_PERMISSIONS);
    assert_ok!(engine.guard_role_grant(&supervisor, &container, &[AnyRole::from(Supervisor)]));
}

#[test]
fn test_campaign_lifecycle_checks() {
    let world = CampaignWorld::new(C::Private);
    let author = world.member("bob", &[Author]);
    let participant = world.member("pat", &[Participant]);
    let supervisor = world.member("sue", &[Supervisor]);
    let engine = world.engine();
    let campaign = &world.campaign;

    assert_ok!(engine.verify_can_upload(&participant, campaign));
    assert_denied!(engine.verify_can_upload(&author, campaign));

    assert_ok!(engine.verify_can_update_campaign(&author, campaign));
    assert_denied!(engine.verify_can_update_campaign(&participant, campaign));

    assert_ok!(engine.verify_can_update_campaign_definition(&author, campaign));
    assert_ok!(engine.verify_can_delete_campaign(&author, campaign));

    world.repo.set_response_count(campaign, 12);
    assert_denied!(engine.verify_can_update_campaign_definition(&supervisor, campaign));
    assert_denied!(engine.verify_can_delete_campaign(&author, campaign));
    assert_ok!(engine.verify_can_delete_campaign(&supervisor, campaign));

    assert_ok!(engine.verify_can_read_member_info(&supervisor, campaign));
    assert_denied!(engine.verify_can_read_member_info(&author, campaign));
}

#[test]
fn test_viewing_other_users_data() {
    let world = CampaignWorld::new(C::Private);
    let analyst = world.member("bob", &[Analyst]);
    let author = world.member("ann", &[Author]);
    let engine = world.engine();
    let alice = fixtures::username("alice");
    let campaign = &world.campaign;

    assert_ok!(engine.verify_can_view_users_data(&analyst, campaign, &[fixtures::username("bob")]));
    assert_denied!(engine.verify_can_view_users_data(&analyst, campaign, &[alice.clone()]));
    assert_ok!(engine.verify_can_view_users_data(&author, campaign, &[alice.clone()]));

    world.repo.set_campaign_privacy(campaign, C::Shared);
    assert_ok!(engine.verify_can_view_users_data(&analyst, campaign, &[alice]));
}

#[test]
fn test_admin_bypasses_container_checks() {
    let world = CampaignWorld::new(C::Private);
    let admin = world.admin("root");
    let data = world.response("alice", R::Invisible);
    let engine = world.engine();

    assert_ok!(engine.authorize(&admin, Action::Delete, &data));
    assert_ok!(engine.verify_can_read_member_info(&admin, &world.campaign));
    assert_eq!(assert_ok!(engine.identify(&fixtures::username("root"))), admin);
}

struct DocumentWorld {
    repo: Arc<InMemoryRepository>,
    document: DocumentId,
    campaign: CampaignId,
    class: ClassId,
}

impl DocumentWorld {
    fn new() -> Self {
        Self::with_privacy(R::Shared)
    }

    fn with_privacy(privacy: R) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let record = fixtures::document("carol", privacy);
        let document = record.id.clone();
        let campaign = fixtures::campaign_id("urn:campaign:docs");
        let class = fixtures::class_id("urn:class:bio101");
        repo.add_document(record)
            .add_campaign(campaign.clone(), C::Private)
            .add_class(class.clone())
            .link_document_to_campaign(&document, &campaign, DocumentRole::Reader)
            .link_document_to_class(&document, &class, DocumentRole::Writer);
        Self {
            repo,
            document,
            campaign,
            class,
        }
    }

    fn engine(&self) -> AuthzEngine {
        AuthzEngine::new(self.repo.clone())
    }

    fn identity(&self, name: &str) -> Identity {
        let user = fixtures::username(name);
        self.repo.add_user(user.clone());
        Identity::user(user)
    }
}

#[test]
fn test_document_roles_derive_from_links() {
    let world = DocumentWorld::new();
    let engine = world.engine();

    let student = world.identity("stu");
    world.repo.set_class_role(student.username(), &world.class, ClassRole::Restricted);
    let participant = world.identity("pat");
    world.repo.grant_campaign_role(participant.username(), &world.campaign, Participant);
    let outsider = world.identity("out");

    assert_ok!(engine.verify_can_modify_document(&student, &world.document));
    assert_ok!(engine.verify_can_read_document(&participant, &world.document));
    assert_denied!(engine.verify_can_modify_document(&participant, &world.document));
    assert_denied!(engine.verify_can_read_document(&outsider, &world.document));
    assert_denied!(engine.verify_can_delete_document(&student, &world.document));
}

#[test]
fn test_private_document_hides_from_readers() {
    let world = DocumentWorld::with_privacy(R::Private);
    let engine = world.engine();

    let participant = world.identity("pat");
    world.repo.grant_campaign_role(participant.username(), &world.campaign, Participant);
    let student = world.identity("stu");
    world.repo.set_class_role(student.username(), &world.class, ClassRole::Restricted);
    let supervisor = world.identity("sue");
    world.repo.grant_campaign_role(supervisor.username(), &world.campaign, Supervisor);
    let creator = Identity::user(fixtures::username("carol"));

    assert_denied!(engine.verify_can_read_document(&participant, &world.document));
    assert_ok!(engine.verify_can_read_document(&student, &world.document));
    assert_ok!(engine.verify_can_modify_document(&student, &world.document));
    assert_ok!(engine.verify_can_read_document(&supervisor, &world.document));
    assert_ok!(engine.verify_can_delete_document(&creator, &world.document));

    world.repo.set_document_privacy(&world.document, R::Shared);
    assert_ok!(engine.verify_can_read_document(&participant, &world.document));
}

#[test]
fn test_document_linkage_override() {
    let world = DocumentWorld::new();
    let engine = world.engine();

    let supervisor = world.identity("sue");
    world.repo.grant_campaign_role(supervisor.username(), &world.campaign, Supervisor);
    let instructor = world.identity("tea");
    world.repo.set_class_role(instructor.username(), &world.class, ClassRole::Privileged);

    assert_ok!(engine.verify_can_delete_document(&supervisor, &world.document));
    assert_ok!(engine.verify_can_delete_document(&instructor, &world.document));
}

#[test]
fn test_disassociation_requires_equal_or_higher_role() {
    let world = DocumentWorld::new();
    let engine = world.engine();

    let owner = world.identity("own");
    world.repo.grant_document_role(owner.username(), &world.document, DocumentRole::Owner);
    let reader = world.identity("rea");
    world.repo.grant_document_role(reader.username(), &world.document, DocumentRole::Reader);

    assert_ok!(engine.verify_can_disassociate_user_from_document(&owner, &world.document, reader.username()));
    assert_denied!(engine.verify_can_disassociate_user_from_document(&reader, &world.document, owner.username()));
}

#[test]
fn test_class_privilege_checks() {
    let repo = Arc::new(InMemoryRepository::new());
    let bio = fixtures::class_id("urn:class:bio");
    let chem = fixtures::class_id("urn:class:chem");
    let instructor = fixtures::username("instructor");
    let student = fixtures::username("student");
    repo.set_class_role(&instructor, &bio, ClassRole::Privileged)
        .set_class_role(&instructor, &chem, ClassRole::Restricted)
        .set_class_role(&student, &bio, ClassRole::Restricted);

    let engine = AuthzEngine::new(repo.clone());
    let identity = Identity::user(instructor);

    assert_ok!(engine.verify_class_admin_or_privileged(&identity, &[bio.clone()]));
    assert_denied!(engine.verify_class_admin_or_privileged(&identity, &[bio, chem]));
    assert_ok!(engine.verify_privileged_in_users_class(&identity, &student));
    assert_denied!(engine.verify_privileged_in_users_class(&identity, &Username::parse("nobody").unwrap()));

    let ghost = fixtures::class_id("urn:class:ghost");
    assert_err!(
        engine.verify_class_admin_or_privileged(&identity, &[ghost]),
        AuthzError::NotFound { .. }
    );
}
