//! Privilege-escalation checks for role grants and removals.

use crate::model::Role;

/// Decides whether a requester may hand out or take away a role.
pub struct RoleMutationGuard;

impl RoleMutationGuard {
    /// A role may be granted by anyone holding it or a higher one. The top
    /// role may grant anything.
    pub fn can_grant<R: Role>(requester_max: R, granted: R) -> bool {
        requester_max.is_top() || granted <= requester_max
    }

    /// Check a batch against its highest role. An empty batch grants nothing.
    pub fn can_grant_all<R, I>(requester_max: Option<R>, batch: I) -> bool
    where
        R: Role,
        I: IntoIterator<Item = R>,
    {
        match batch.into_iter().max() {
            None => true,
            Some(highest) => requester_max.is_some_and(|r| Self::can_grant(r, highest)),
        }
    }

    /// Whether the requester outranks, or equals, the user being removed.
    pub fn can_revoke<R: Role>(requester_max: Option<R>, target_max: Option<R>) -> bool {
        match requester_max {
            None => false,
            Some(r) => r.is_top() || target_max.map_or(true, |t| t <= r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CampaignRole, ClassRole, DocumentRole};
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(DocumentRole::Writer, DocumentRole::Owner, false)]
    #[test_case(DocumentRole::Owner, DocumentRole::Owner, true)]
    #[test_case(DocumentRole::Reader, DocumentRole::Reader, true)]
    #[test_case(DocumentRole::Writer, DocumentRole::Reader, true)]
    #[test_case(DocumentRole::Reader, DocumentRole::Writer, false)]
    fn test_can_grant_document(requester: DocumentRole, granted: DocumentRole, expected: bool) {
        assert_eq!(RoleMutationGuard::can_grant(requester, granted), expected);
    }

    #[test]
    fn test_author_cannot_grant_supervisor() {
        assert!(!RoleMutationGuard::can_grant(
            CampaignRole::Author,
            CampaignRole::Supervisor
        ));
        assert!(RoleMutationGuard::can_grant(
            CampaignRole::Author,
            CampaignRole::Analyst
        ));
        assert!(RoleMutationGuard::can_grant(
            ClassRole::Privileged,
            ClassRole::Privileged
        ));
    }

    #[test]
    fn test_batch_checks_highest_role() {
        let batch = [CampaignRole::Participant, CampaignRole::Supervisor];
        assert!(!RoleMutationGuard::can_grant_all(Some(CampaignRole::Author), batch));
        assert!(RoleMutationGuard::can_grant_all(Some(CampaignRole::Supervisor), batch));
        assert!(!RoleMutationGuard::can_grant_all(None, [CampaignRole::Participant]));
        assert!(RoleMutationGuard::can_grant_all::<CampaignRole, _>(None, []));
    }

    #[test]
    fn test_revoke_requires_equal_or_higher_role() {
        use DocumentRole::*;
        assert!(RoleMutationGuard::can_revoke(Some(Writer), Some(Writer)));
        assert!(!RoleMutationGuard::can_revoke(Some(Reader), Some(Writer)));
        assert!(RoleMutationGuard::can_revoke(Some(Owner), Some(Owner)));
        assert!(RoleMutationGuard::can_revoke(Some(Reader), None));
        assert!(!RoleMutationGuard::can_revoke(None, Some(Reader)));
    }

    proptest! {
        #[test]
        fn test_grant_never_escalates(
            requester in prop::sample::select(DocumentRole::ALL.to_vec()),
            granted in prop::sample::select(DocumentRole::ALL.to_vec()),
        ) {
            if RoleMutationGuard::can_grant(requester, granted) {
                prop_assert!(granted <= requester || requester == DocumentRole::Owner);
            }
        }
    }
}
