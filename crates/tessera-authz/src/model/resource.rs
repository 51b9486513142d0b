use super::container::ContainerRef;
use super::privacy::ResourcePrivacyState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_common_core::{CampaignId, DocumentId, ResourceId, Username};

/// Capability shared by everything the policy protects.
pub trait ProtectedResource {
    /// The user who created the resource.
    fn owner(&self) -> &Username;

    fn privacy_state(&self) -> ResourcePrivacyState;

    /// The container whose roles govern access.
    fn container(&self) -> ContainerRef;

    /// Identifier used in audit records.
    fn resource_id(&self) -> &str;
}

impl<T: ProtectedResource + ?Sized> ProtectedResource for &T {
    fn owner(&self) -> &Username {
        (**self).owner()
    }

    fn privacy_state(&self) -> ResourcePrivacyState {
        (**self).privacy_state()
    }

    fn container(&self) -> ContainerRef {
        (**self).container()
    }

    fn resource_id(&self) -> &str {
        (**self).resource_id()
    }
}

/// One participant's answers to one survey in a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    /// Resource id.
    pub id: ResourceId,
    /// User the data belongs to.
    pub owner: Username,
    /// Campaign the data was uploaded to.
    pub campaign: CampaignId,
    /// Survey within the campaign.
    pub survey_id: String,
    /// Privacy state set by the owner.
    pub privacy: ResourcePrivacyState,
}

impl ProtectedResource for SurveyResponse {
    fn owner(&self) -> &Username {
        &self.owner
    }

    fn privacy_state(&self) -> ResourcePrivacyState {
        self.privacy
    }

    fn container(&self) -> ContainerRef {
        ContainerRef::Campaign(self.campaign.clone())
    }

    fn resource_id(&self) -> &str {
        self.id.as_str()
    }
}

closed_enum! {
    /// Payload type of an uploaded media item.
    #[derive(Default)]
    pub enum MediaKind as "media kind" {
        #[default]
        Image => "image",
        Audio => "audio",
        Video => "video",
        Document => "document",
    }
}

/// A file attached to a survey response.
///
/// Media inherits the privacy state of the response it was uploaded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Resource id.
    pub id: ResourceId,
    /// User the data belongs to.
    pub owner: Username,
    /// Campaign the data was uploaded to.
    pub campaign: CampaignId,
    /// What the file holds.
    pub kind: MediaKind,
    /// Privacy state set by the owner.
    pub privacy: ResourcePrivacyState,
}

impl ProtectedResource for MediaItem {
    fn owner(&self) -> &Username {
        &self.owner
    }

    fn privacy_state(&self) -> ResourcePrivacyState {
        self.privacy
    }

    fn container(&self) -> ContainerRef {
        ContainerRef::Campaign(self.campaign.clone())
    }

    fn resource_id(&self) -> &str {
        self.id.as_str()
    }
}

/// A location sample uploaded by a user's phone.
///
/// Mobility data belongs to the user, not to a campaign, so access goes
/// through class privileges rather than the container policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilityPoint {
    /// Resource id.
    pub id: ResourceId,
    /// User the data belongs to.
    pub owner: Username,
    /// When the point was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Privacy state set by the owner.
    pub privacy: ResourcePrivacyState,
}

/// A document shared with users, classes and campaigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document id.
    pub id: DocumentId,
    /// User who uploaded the document.
    pub creator: Username,
    /// File name.
    pub name: String,
    /// Privacy state set by the owner.
    pub privacy: ResourcePrivacyState,
}

impl ProtectedResource for DocumentRecord {
    fn owner(&self) -> &Username {
        &self.creator
    }

    fn privacy_state(&self) -> ResourcePrivacyState {
        self.privacy
    }

    fn container(&self) -> ContainerRef {
        ContainerRef::Document(self.id.clone())
    }

    fn resource_id(&self) -> &str {
        self.id.as_str()
    }
}
