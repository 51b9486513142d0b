//! The privacy decision table.

use crate::model::{
    Action, CampaignPrivacyState, CampaignRole, ContainerRoles, DocumentRole, Identity,
    ProtectedResource, ResourcePrivacyState, RoleSet,
};
use serde::Serialize;
use tessera_common_config::PolicyConfig;

/// Which row of the decision table matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Admins may do anything.
    Admin,
    /// Owners may do anything with their own data.
    ResourceOwner,
    /// Supervisor, Owner or Privileged.
    TopRole,
    /// Author viewing shared data in a shared campaign.
    SharedAuthorView,
    /// Analyst viewing shared data in a shared campaign.
    SharedAnalystView,
    /// Participant viewing data that is not hidden from them.
    ParticipantView,
    /// Writer on a document that is not invisible.
    DocumentWriter,
    /// Reader on a shared document.
    DocumentSharedReader,
    /// Supervisor of a linked campaign or privileged member of a linked class.
    LinkedContainerOverride,
    /// Invisible data hidden from participants.
    InvisibleToParticipant,
    /// Annotation without the top role.
    AnnotateRequiresSupervisor,
    /// Roles resolved for the wrong kind of container.
    ContainerMismatch,
    /// Nothing matched.
    DefaultDeny,
}

impl Rule {
    /// Human readable reason, used in denials and audit records.
    pub fn describe(&self) -> &'static str {
        match self {
            Rule::Admin => "requester is an admin",
            Rule::ResourceOwner => "requester owns the resource",
            Rule::TopRole => "requester holds the container's top role",
            Rule::SharedAuthorView => "authors may view shared data in shared campaigns",
            Rule::SharedAnalystView => "analysts may view shared data in shared campaigns",
            Rule::ParticipantView => "participants may view data that is not invisible",
            Rule::DocumentWriter => "writers may view and modify the document",
            Rule::DocumentSharedReader => "readers may view shared documents",
            Rule::LinkedContainerOverride => {
                "requester supervises a linked campaign or is privileged in a linked class"
            }
            Rule::InvisibleToParticipant => "the resource is invisible to participants",
            Rule::AnnotateRequiresSupervisor => "annotating requires the supervisor role",
            Rule::ContainerMismatch => "roles were resolved for a different kind of container",
            Rule::DefaultDeny => "no role grants this action",
        }
    }
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the action is allowed.
    pub allowed: bool,
    /// The row that decided.
    pub rule: Rule,
}

impl Decision {
    pub(crate) fn allow(rule: Rule) -> Self {
        Self {
            allowed: true,
            rule,
        }
    }

    fn deny(rule: Rule) -> Self {
        Self {
            allowed: false,
            rule,
        }
    }

    /// Why the decision went this way.
    pub fn reason(&self) -> &'static str {
        self.rule.describe()
    }
}

/// Tunables for the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyOptions {
    /// Exempt multi-role Participants from the invisible exclusion.
    pub sole_participant_restriction: bool,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            sole_participant_restriction: true,
        }
    }
}

impl From<&PolicyConfig> for PolicyOptions {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            sole_participant_restriction: config.sole_participant_restriction,
        }
    }
}

/// First-match decision table over identity, roles and privacy states.
#[derive(Debug, Clone, Default)]
pub struct PrivacyPolicy {
    options: PolicyOptions,
}

impl PrivacyPolicy {
    /// Policy with the given tunables.
    pub fn new(options: PolicyOptions) -> Self {
        Self { options }
    }

    /// The tunables in effect.
    pub fn options(&self) -> PolicyOptions {
        self.options
    }

    /// Whether the table allows the action.
    pub fn can_perform<R: ProtectedResource + ?Sized>(
        &self,
        identity: &Identity,
        action: Action,
        resource: &R,
        roles: &ContainerRoles,
        container_privacy: Option<CampaignPrivacyState>,
    ) -> bool {
        self.evaluate(identity, action, resource, roles, container_privacy)
            .allowed
    }

    /// Evaluate the table. `container_privacy` is `None` for containers
    /// without a privacy state, which never satisfies a "shared campaign"
    /// row.
    pub fn evaluate<R: ProtectedResource + ?Sized>(
        &self,
        identity: &Identity,
        action: Action,
        resource: &R,
        roles: &ContainerRoles,
        container_privacy: Option<CampaignPrivacyState>,
    ) -> Decision {
        if identity.is_admin() {
            return Decision::allow(Rule::Admin);
        }
        if identity.is(resource.owner()) {
            return Decision::allow(Rule::ResourceOwner);
        }
        if roles.kind() != resource.container().kind() {
            return Decision::deny(Rule::ContainerMismatch);
        }
        if roles.has_top_role() {
            return Decision::allow(Rule::TopRole);
        }

        let privacy = resource.privacy_state();
        match (action, roles) {
            (Action::Annotate, _) => Decision::deny(Rule::AnnotateRequiresSupervisor),
            (Action::View, ContainerRoles::Campaign(held)) => {
                self.campaign_view(held, privacy, container_privacy)
            }
            (Action::View, ContainerRoles::Document(Some(role))) => document_view(*role, privacy),
            (Action::Modify, ContainerRoles::Document(Some(DocumentRole::Writer)))
                if !privacy.is_invisible() =>
            {
                Decision::allow(Rule::DocumentWriter)
            }
            _ => Decision::deny(Rule::DefaultDeny),
        }
    }

    fn campaign_view(
        &self,
        held: &RoleSet<CampaignRole>,
        privacy: ResourcePrivacyState,
        container_privacy: Option<CampaignPrivacyState>,
    ) -> Decision {
        let both_shared =
            privacy.is_shared() && container_privacy.is_some_and(|c| c.is_shared());

        if both_shared && held.contains(CampaignRole::Author) {
            return Decision::allow(Rule::SharedAuthorView);
        }
        if both_shared && held.contains(CampaignRole::Analyst) {
            return Decision::allow(Rule::SharedAnalystView);
        }
        if held.contains(CampaignRole::Participant) {
            let excluded = privacy.is_invisible()
                && (held.is_sole(CampaignRole::Participant)
                    || !self.options.sole_participant_restriction);
            return if excluded {
                Decision::deny(Rule::InvisibleToParticipant)
            } else {
                Decision::allow(Rule::ParticipantView)
            };
        }
        Decision::deny(Rule::DefaultDeny)
    }
}

fn document_view(role: DocumentRole, privacy: ResourcePrivacyState) -> Decision {
    match role {
        DocumentRole::Writer if !privacy.is_invisible() => Decision::allow(Rule::DocumentWriter),
        DocumentRole::Reader if privacy.is_shared() => Decision::allow(Rule::DocumentSharedReader),
        _ => Decision::deny(Rule::DefaultDeny),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerKind, DocumentRecord, SurveyResponse};
    use proptest::prelude::*;
    use tessera_common_core::{CampaignId, DocumentId, ResourceId, Username};
    use test_case::test_case;

    use CampaignPrivacyState as C;
    use CampaignRole::*;
    use ResourcePrivacyState as R;

    fn user(name: &str) -> Identity {
        Identity::user(Username::parse(name).unwrap())
    }

    fn response(owner: &str, privacy: ResourcePrivacyState) -> SurveyResponse {
        SurveyResponse {
            id: ResourceId::generate(),
            owner: Username::parse(owner).unwrap(),
            campaign: CampaignId::parse("urn:campaign:sleep").unwrap(),
            survey_id: "morning".to_string(),
            privacy,
        }
    }

    fn campaign_roles(roles: &[CampaignRole]) -> ContainerRoles {
        ContainerRoles::Campaign(roles.iter().copied().collect())
    }

    fn view(
        policy: &PrivacyPolicy,
        roles: &[CampaignRole],
        campaign: C,
        resource: R,
    ) -> Decision {
        policy.evaluate(
            &user("bob"),
            Action::View,
            &response("alice", resource),
            &campaign_roles(roles),
            Some(campaign),
        )
    }

    #[test_case(&[Author], C::Shared, R::Shared, true ; "author sees shared data in shared campaign")]
    #[test_case(&[Author], C::Private, R::Shared, false ; "author blocked in private campaign")]
    #[test_case(&[Author], C::Shared, R::Private, false ; "author blocked from private data")]
    #[test_case(&[Analyst], C::Shared, R::Shared, true ; "analyst sees shared data in shared campaign")]
    #[test_case(&[Analyst], C::Private, R::Shared, false ; "analyst blocked in private campaign")]
    #[test_case(&[Participant], C::Private, R::Private, true ; "sole participant sees private data")]
    #[test_case(&[Participant], C::Shared, R::Invisible, false ; "sole participant never sees invisible data")]
    #[test_case(&[Participant, Author], C::Shared, R::Invisible, true ; "participant author sees invisible data")]
    #[test_case(&[Participant, Analyst], C::Private, R::Invisible, true ; "participant analyst sees invisible data")]
    #[test_case(&[Supervisor], C::Private, R::Invisible, true ; "supervisor sees everything")]
    #[test_case(&[], C::Shared, R::Shared, false ; "non member denied")]
    fn test_view_table(roles: &[CampaignRole], campaign: C, resource: R, allowed: bool) {
        let decision = view(&PrivacyPolicy::default(), roles, campaign, resource);
        assert_eq!(decision.allowed, allowed, "matched {:?}", decision.rule);
    }

    #[test]
    fn test_strict_participant_reading() {
        let strict = PrivacyPolicy::new(PolicyOptions {
            sole_participant_restriction: false,
        });
        let decision = view(&strict, &[Participant, Author], C::Shared, R::Invisible);
        assert!(!decision.allowed);
        assert_eq!(decision.rule, Rule::InvisibleToParticipant);

        let decision = view(&strict, &[Participant, Author], C::Shared, R::Shared);
        assert_eq!(decision.rule, Rule::SharedAuthorView);
    }

    #[test]
    fn test_options_from_config() {
        let config = PolicyConfig {
            sole_participant_restriction: false,
            log_granted_decisions: true,
        };
        assert!(!PolicyOptions::from(&config).sole_participant_restriction);
    }

    #[test]
    fn test_annotate_requires_supervisor() {
        let policy = PrivacyPolicy::default();
        let resource = response("alice", R::Shared);
        let decision = policy.evaluate(
            &user("bob"),
            Action::Annotate,
            &resource,
            &campaign_roles(&[Author, Analyst]),
            Some(C::Shared),
        );
        assert_eq!(decision.rule, Rule::AnnotateRequiresSupervisor);

        assert!(policy.can_perform(
            &user("bob"),
            Action::Annotate,
            &resource,
            &campaign_roles(&[Supervisor]),
            Some(C::Private),
        ));
    }

    #[test]
    fn test_roles_for_wrong_container_kind_deny() {
        let decision = PrivacyPolicy::default().evaluate(
            &user("bob"),
            Action::View,
            &response("alice", R::Shared),
            &ContainerRoles::Document(Some(DocumentRole::Owner)),
            Some(C::Shared),
        );
        assert_eq!(decision.rule, Rule::ContainerMismatch);
    }

    #[test_case(DocumentRole::Writer, Action::Modify, R::Private, true)]
    #[test_case(DocumentRole::Writer, Action::Modify, R::Invisible, false)]
    #[test_case(DocumentRole::Writer, Action::Delete, R::Shared, false)]
    #[test_case(DocumentRole::Reader, Action::View, R::Shared, true)]
    #[test_case(DocumentRole::Reader, Action::View, R::Private, false)]
    #[test_case(DocumentRole::Reader, Action::Modify, R::Shared, false)]
    #[test_case(DocumentRole::Owner, Action::Delete, R::Invisible, true)]
    fn test_document_rows(role: DocumentRole, action: Action, privacy: R, allowed: bool) {
        let doc = DocumentRecord {
            id: DocumentId::generate(),
            creator: Username::parse("carol").unwrap(),
            name: "protocol.pdf".to_string(),
            privacy,
        };
        let roles = ContainerRoles::Document(Some(role));
        assert_eq!(
            PrivacyPolicy::default().can_perform(&user("bob"), action, &doc, &roles, None),
            allowed
        );
    }

    fn any_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn any_privacy() -> impl Strategy<Value = ResourcePrivacyState> {
        prop::sample::select(ResourcePrivacyState::ALL.to_vec())
    }

    fn any_campaign_privacy() -> impl Strategy<Value = Option<CampaignPrivacyState>> {
        prop::option::of(prop::sample::select(CampaignPrivacyState::ALL.to_vec()))
    }

    fn any_campaign_roles() -> impl Strategy<Value = RoleSet<CampaignRole>> {
        prop::sample::subsequence(CampaignRole::ALL.to_vec(), 0..=CampaignRole::ALL.len())
            .prop_map(|roles| roles.into_iter().collect())
    }

    proptest! {
        #[test]
        fn test_owner_always_allowed(
            action in any_action(),
            privacy in any_privacy(),
            container in any_campaign_privacy(),
            roles in any_campaign_roles(),
        ) {
            let resource = response("alice", privacy);
            prop_assert!(PrivacyPolicy::default().can_perform(
                &user("alice"),
                action,
                &resource,
                &ContainerRoles::Campaign(roles),
                container,
            ));
        }

        #[test]
        fn test_supervisor_always_allowed(
            action in any_action(),
            privacy in any_privacy(),
            container in any_campaign_privacy(),
            mut roles in any_campaign_roles(),
        ) {
            roles.insert(Supervisor);
            let resource = response("alice", privacy);
            prop_assert!(PrivacyPolicy::default().can_perform(
                &user("bob"),
                action,
                &resource,
                &ContainerRoles::Campaign(roles),
                container,
            ));
        }

        #[test]
        fn test_sole_participant_never_sees_invisible(
            action in any_action(),
            container in any_campaign_privacy(),
            strict in any::<bool>(),
        ) {
            let policy = PrivacyPolicy::new(PolicyOptions { sole_participant_restriction: !strict });
            let resource = response("alice", R::Invisible);
            prop_assert!(!policy.can_perform(
                &user("bob"),
                action,
                &resource,
                &campaign_roles(&[Participant]),
                container,
            ));
        }

        #[test]
        fn test_admin_always_allowed(action in any_action(), privacy in any_privacy()) {
            let admin = Identity::admin(Username::parse("root").unwrap());
            prop_assert!(PrivacyPolicy::default().can_perform(
                &admin,
                action,
                &response("alice", privacy),
                &ContainerRoles::none(ContainerKind::Campaign),
                None,
            ));
        }
    }
}
