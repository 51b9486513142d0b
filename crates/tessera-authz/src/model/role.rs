use super::container::{ContainerKind, ContainerRef};
use crate::error::AuthzError;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;
use tessera_common_core::Username;

closed_enum! {
    /// Role held in a campaign. A user may hold several at once.
    pub enum CampaignRole as "campaign role" {
        Participant => "participant",
        Analyst => "analyst",
        Author => "author",
        Supervisor => "supervisor",
    }
}

closed_enum! {
    /// Role held in a class. Exactly one per member.
    pub enum ClassRole as "class role" {
        Restricted => "restricted",
        Privileged => "privileged",
    }
}

closed_enum! {
    /// Role held on a document, ordered `Owner > Writer > Reader`.
    pub enum DocumentRole as "document role" {
        Reader => "reader",
        Writer => "writer",
        Owner => "owner",
    }
}

/// A totally ordered role enumeration with a distinguished top role.
pub trait Role: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The role that overrides every check in its container.
    const TOP: Self;
    /// The container kind this role is held in.
    const CONTAINER: ContainerKind;

    fn is_top(&self) -> bool {
        *self == Self::TOP
    }
}

impl Role for CampaignRole {
    const TOP: Self = CampaignRole::Supervisor;
    const CONTAINER: ContainerKind = ContainerKind::Campaign;
}

impl Role for ClassRole {
    const TOP: Self = ClassRole::Privileged;
    const CONTAINER: ContainerKind = ContainerKind::Class;
}

impl Role for DocumentRole {
    const TOP: Self = DocumentRole::Owner;
    const CONTAINER: ContainerKind = ContainerKind::Document;
}

/// De-duplicated, ordered set of roles held in one container.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RoleSet<R: Role>(BTreeSet<R>);

impl<R: Role> RoleSet<R> {
    /// Empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Add a role. Returns false if it was already present.
    pub fn insert(&mut self, role: R) -> bool {
        self.0.insert(role)
    }

    /// Remove a role, returning whether it was held.
    pub fn remove(&mut self, role: R) -> bool {
        self.0.remove(&role)
    }

    /// Whether the role is held.
    pub fn contains(&self, role: R) -> bool {
        self.0.contains(&role)
    }

    /// Whether no role is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of roles held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Held roles, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = R> + '_ {
        self.0.iter().copied()
    }

    /// Most privileged role in the set.
    pub fn highest(&self) -> Option<R> {
        self.0.last().copied()
    }

    /// True when `role` is the only role held.
    pub fn is_sole(&self, role: R) -> bool {
        self.0.len() == 1 && self.0.contains(&role)
    }

    /// Whether the container's top role is held.
    pub fn has_top(&self) -> bool {
        self.0.contains(&R::TOP)
    }

    /// True when any held role is in `roles`.
    pub fn contains_any(&self, roles: &[R]) -> bool {
        roles.iter().any(|r| self.0.contains(r))
    }
}

impl<R: Role> Default for RoleSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Role> fmt::Debug for RoleSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl<R: Role> FromIterator<R> for RoleSet<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<R: Role, const N: usize> From<[R; N]> for RoleSet<R> {
    fn from(roles: [R; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl<R: Role> Extend<R> for RoleSet<R> {
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

/// A role of any container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyRole {
    /// A campaign role.
    Campaign(CampaignRole),
    /// A class role.
    Class(ClassRole),
    /// A document role.
    Document(DocumentRole),
}

impl AnyRole {
    /// Container kind this role belongs to.
    pub fn container_kind(&self) -> ContainerKind {
        match self {
            Self::Campaign(_) => ContainerKind::Campaign,
            Self::Class(_) => ContainerKind::Class,
            Self::Document(_) => ContainerKind::Document,
        }
    }
}

impl fmt::Display for AnyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Campaign(r) => write!(f, "campaign:{r}"),
            Self::Class(r) => write!(f, "class:{r}"),
            Self::Document(r) => write!(f, "document:{r}"),
        }
    }
}

impl From<CampaignRole> for AnyRole {
    fn from(role: CampaignRole) -> Self {
        Self::Campaign(role)
    }
}

impl From<ClassRole> for AnyRole {
    fn from(role: ClassRole) -> Self {
        Self::Class(role)
    }
}

impl From<DocumentRole> for AnyRole {
    fn from(role: DocumentRole) -> Self {
        Self::Document(role)
    }
}

/// One grant of one role to one user in one container.
///
/// Assignments are created and removed, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleAssignment {
    user: Username,
    container: ContainerRef,
    role: AnyRole,
}

impl RoleAssignment {
    /// Build an assignment, rejecting a role that belongs to another kind of
    /// container.
    pub fn new(user: Username, container: ContainerRef, role: AnyRole) -> Result<Self, AuthzError> {
        if role.container_kind() != container.kind() {
            return Err(AuthzError::MalformedRoleAssignment {
                detail: format!("{role} cannot be held in {container}"),
            });
        }
        Ok(Self {
            user,
            container,
            role,
        })
    }

    /// The user receiving the role.
    pub fn user(&self) -> &Username {
        &self.user
    }

    /// The container the role applies to.
    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    /// The role granted.
    pub fn role(&self) -> AnyRole {
        self.role
    }
}

/// The roles a user holds in one container, shaped by container kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRoles {
    /// All campaign roles held.
    Campaign(RoleSet<CampaignRole>),
    /// The class role, if any.
    Class(Option<ClassRole>),
    /// The effective document role, if any.
    Document(Option<DocumentRole>),
}

impl ContainerRoles {
    /// No membership in a container of the given kind.
    pub fn none(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Campaign => Self::Campaign(RoleSet::new()),
            ContainerKind::Class => Self::Class(None),
            ContainerKind::Document => Self::Document(None),
        }
    }

    /// Kind of container these roles were resolved for.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Campaign(_) => ContainerKind::Campaign,
            Self::Class(_) => ContainerKind::Class,
            Self::Document(_) => ContainerKind::Document,
        }
    }

    /// Whether no role is held.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Campaign(roles) => roles.is_empty(),
            Self::Class(role) => role.is_none(),
            Self::Document(role) => role.is_none(),
        }
    }

    /// Supervisor, Privileged or Owner.
    pub fn has_top_role(&self) -> bool {
        match self {
            Self::Campaign(roles) => roles.has_top(),
            Self::Class(role) => role.is_some_and(|r| r.is_top()),
            Self::Document(role) => role.is_some_and(|r| r.is_top()),
        }
    }

    /// Campaign roles, if resolved for a campaign.
    pub fn campaign(&self) -> Option<&RoleSet<CampaignRole>> {
        match self {
            Self::Campaign(roles) => Some(roles),
            _ => None,
        }
    }

    /// Document role, if resolved for a document.
    pub fn document(&self) -> Option<DocumentRole> {
        match self {
            Self::Document(role) => *role,
            _ => None,
        }
    }

    /// Class role, if resolved for a class.
    pub fn class(&self) -> Option<ClassRole> {
        match self {
            Self::Class(role) => *role,
            _ => None,
        }
    }
}

/// Every path through which a user may hold a role on a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRoleSources {
    /// Granted to the user directly.
    pub direct: Option<DocumentRole>,
    /// Granted to classes the user belongs to.
    pub via_classes: RoleSet<DocumentRole>,
    /// Granted to campaigns the user belongs to.
    pub via_campaigns: RoleSet<DocumentRole>,
}

impl DocumentRoleSources {
    /// Most privileged role over all sources.
    pub fn effective(&self) -> Option<DocumentRole> {
        self.direct
            .into_iter()
            .chain(self.via_classes.highest())
            .chain(self.via_campaigns.highest())
            .max()
    }
}
