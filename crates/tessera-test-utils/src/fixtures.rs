//! Ready-made users, resources and populated repositories.

use chrono::Utc;
use std::sync::Arc;
use tessera_authz::{
    AuthzEngine, CampaignPrivacyState, CampaignRole, DocumentRecord, Identity, InMemoryRepository,
    MediaItem, MediaKind, MobilityPoint, ResourcePrivacyState, SurveyResponse,
};
use tessera_common_core::{CampaignId, ClassId, DocumentId, ResourceId, Username};

/// Parse a fixture username.
pub fn username(name: &str) -> Username {
    Username::parse(name).expect("fixture username is not blank")
}

/// Parse a fixture campaign URN.
pub fn campaign_id(urn: &str) -> CampaignId {
    CampaignId::parse(urn).expect("fixture campaign id is not blank")
}

/// Parse a fixture class URN.
pub fn class_id(urn: &str) -> ClassId {
    ClassId::parse(urn).expect("fixture class id is not blank")
}

/// A survey response owned by `owner` in `campaign`.
pub fn survey_response(owner: &str, campaign: &CampaignId, privacy: ResourcePrivacyState) -> SurveyResponse {
    SurveyResponse {
        id: ResourceId::generate(),
        owner: username(owner),
        campaign: campaign.clone(),
        survey_id: "daily".to_string(),
        privacy,
    }
}

/// A media item owned by `owner` in `campaign`.
pub fn media_item(owner: &str, campaign: &CampaignId, kind: MediaKind, privacy: ResourcePrivacyState) -> MediaItem {
    MediaItem {
        id: ResourceId::generate(),
        owner: username(owner),
        campaign: campaign.clone(),
        kind,
        privacy,
    }
}

/// A mobility point owned by `owner`.
pub fn mobility_point(owner: &str, privacy: ResourcePrivacyState) -> MobilityPoint {
    MobilityPoint {
        id: ResourceId::generate(),
        owner: username(owner),
        recorded_at: Utc::now(),
        privacy,
    }
}

/// A document created by `creator`.
pub fn document(creator: &str, privacy: ResourcePrivacyState) -> DocumentRecord {
    DocumentRecord {
        id: DocumentId::generate(),
        creator: username(creator),
        name: "protocol.pdf".to_string(),
        privacy,
    }
}

/// One campaign in an otherwise empty repository.
pub struct CampaignWorld {
    /// Backing repository.
    pub repo: Arc<InMemoryRepository>,
    /// The single campaign.
    pub campaign: CampaignId,
}

impl CampaignWorld {
    /// Create the campaign with the given privacy state.
    pub fn new(privacy: CampaignPrivacyState) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let campaign = campaign_id("urn:campaign:tessera:sleep");
        repo.add_campaign(campaign.clone(), privacy);
        Self { repo, campaign }
    }

    /// Add a user holding `roles` in the campaign.
    pub fn member(&self, name: &str, roles: &[CampaignRole]) -> Identity {
        let user = username(name);
        self.repo.add_user(user.clone());
        for role in roles {
            self.repo.grant_campaign_role(&user, &self.campaign, *role);
        }
        Identity::user(user)
    }

    /// Add an administrator.
    pub fn admin(&self, name: &str) -> Identity {
        let user = username(name);
        self.repo.add_admin(user.clone());
        Identity::admin(user)
    }

    /// Store a survey response in the campaign.
    pub fn response(&self, owner: &str, privacy: ResourcePrivacyState) -> SurveyResponse {
        let response = survey_response(owner, &self.campaign, privacy);
        self.repo.add_resource(response.id.clone());
        response
    }

    /// An engine over the world's repository.
    pub fn engine(&self) -> AuthzEngine {
        AuthzEngine::new(self.repo.clone())
    }
}
