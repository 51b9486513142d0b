use std::fmt;
use tessera_common_core::{CampaignId, ClassId, DocumentId, ResourceId, Username};

closed_enum! {
    /// Kind of container a role is held in.
    pub enum ContainerKind as "container kind" {
        Campaign => "campaign",
        Class => "class",
        Document => "document",
    }
}

closed_enum! {
    /// Anything whose existence can be checked.
    pub enum EntityKind as "entity kind" {
        User => "user",
        Campaign => "campaign",
        Class => "class",
        Document => "document",
        Resource => "resource",
    }
}

closed_enum! {
    /// What a caller wants to do with a resource.
    pub enum Action as "action" {
        View => "view",
        Modify => "modify",
        Delete => "delete",
        Annotate => "annotate",
    }
}

impl From<ContainerKind> for EntityKind {
    fn from(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Campaign => EntityKind::Campaign,
            ContainerKind::Class => EntityKind::Class,
            ContainerKind::Document => EntityKind::Document,
        }
    }
}

/// A typed identifier that names an entity of a fixed kind.
pub trait Entity {
    const KIND: EntityKind;

    fn id_str(&self) -> &str;
}

macro_rules! entity {
    ($id:ty, $kind:ident) => {
        impl Entity for $id {
            const KIND: EntityKind = EntityKind::$kind;

            fn id_str(&self) -> &str {
                self.as_str()
            }
        }
    };
}

entity!(Username, User);
entity!(CampaignId, Campaign);
entity!(ClassId, Class);
entity!(DocumentId, Document);
entity!(ResourceId, Resource);

/// Reference to a role-bearing container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    /// A campaign.
    Campaign(CampaignId),
    /// A class.
    Class(ClassId),
    /// A document.
    Document(DocumentId),
}

impl ContainerRef {
    /// Kind of container referenced.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Campaign(_) => ContainerKind::Campaign,
            Self::Class(_) => ContainerKind::Class,
            Self::Document(_) => ContainerKind::Document,
        }
    }

    /// The container id as a string.
    pub fn id_str(&self) -> &str {
        match self {
            Self::Campaign(id) => id.as_str(),
            Self::Class(id) => id.as_str(),
            Self::Document(id) => id.as_str(),
        }
    }

    /// The campaign id, if this is a campaign.
    pub fn as_campaign(&self) -> Option<&CampaignId> {
        match self {
            Self::Campaign(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_str())
    }
}

impl From<CampaignId> for ContainerRef {
    fn from(id: CampaignId) -> Self {
        Self::Campaign(id)
    }
}

impl From<ClassId> for ContainerRef {
    fn from(id: ClassId) -> Self {
        Self::Class(id)
    }
}

impl From<DocumentId> for ContainerRef {
    fn from(id: DocumentId) -> Self {
        Self::Document(id)
    }
}
