//! In-memory repository.
//!
//! Backs tests and embedders that keep role data in process. Writes take a
//! short exclusive lock; reads share it.

use crate::cache::PreferenceSource;
use crate::model::{
    CampaignPrivacyState, CampaignRole, ClassRole, DocumentRecord, DocumentRole,
    DocumentRoleSources, EntityKind, ResourcePrivacyState, RoleSet,
};
use crate::repository::{Repository, RepositoryError};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use tessera_common_core::{CampaignId, ClassId, DocumentId, ResourceId, Username};

#[derive(Debug, Default)]
struct CampaignEntry {
    privacy: Option<CampaignPrivacyState>,
    members: HashMap<Username, RoleSet<CampaignRole>>,
    responses: u64,
}

#[derive(Debug, Default)]
struct DocumentEntry {
    record: Option<DocumentRecord>,
    direct: HashMap<Username, DocumentRole>,
    campaigns: BTreeMap<CampaignId, DocumentRole>,
    classes: BTreeMap<ClassId, DocumentRole>,
}

#[derive(Debug, Default)]
struct State {
    users: HashSet<Username>,
    admins: HashSet<Username>,
    campaigns: HashMap<CampaignId, CampaignEntry>,
    classes: HashMap<ClassId, BTreeMap<Username, ClassRole>>,
    documents: HashMap<DocumentId, DocumentEntry>,
    resources: HashSet<ResourceId>,
    preferences: HashMap<String, String>,
}

/// Thread-safe in-memory store of users, containers and role assignments.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user.
    pub fn add_user(&self, user: Username) -> &Self {
        self.state.write().users.insert(user);
        self
    }

    /// Register a user with the admin flag.
    pub fn add_admin(&self, user: Username) -> &Self {
        let mut state = self.state.write();
        state.users.insert(user.clone());
        state.admins.insert(user);
        self
    }

    /// Register a campaign.
    pub fn add_campaign(&self, campaign: CampaignId, privacy: CampaignPrivacyState) -> &Self {
        self.state.write().campaigns.entry(campaign).or_default().privacy = Some(privacy);
        self
    }

    /// Change a registered campaign's privacy state.
    pub fn set_campaign_privacy(&self, campaign: &CampaignId, privacy: CampaignPrivacyState) -> &Self {
        if let Some(entry) = self.state.write().campaigns.get_mut(campaign) {
            entry.privacy = Some(privacy);
        }
        self
    }

    /// Add a role, creating the membership if needed.
    pub fn grant_campaign_role(&self, user: &Username, campaign: &CampaignId, role: CampaignRole) -> &Self {
        let mut state = self.state.write();
        state.users.insert(user.clone());
        state
            .campaigns
            .entry(campaign.clone())
            .or_default()
            .members
            .entry(user.clone())
            .or_default()
            .insert(role);
        self
    }

    /// Remove a role. A membership left with no roles is removed.
    pub fn revoke_campaign_role(&self, user: &Username, campaign: &CampaignId, role: CampaignRole) -> &Self {
        let mut state = self.state.write();
        if let Some(entry) = state.campaigns.get_mut(campaign) {
            if let Some(roles) = entry.members.get_mut(user) {
                roles.remove(role);
                if roles.is_empty() {
                    entry.members.remove(user);
                }
            }
        }
        self
    }

    /// Number of survey responses the campaign reports.
    pub fn set_response_count(&self, campaign: &CampaignId, count: u64) -> &Self {
        if let Some(entry) = self.state.write().campaigns.get_mut(campaign) {
            entry.responses = count;
        }
        self
    }

    /// Register an empty class.
    pub fn add_class(&self, class: ClassId) -> &Self {
        self.state.write().classes.entry(class).or_default();
        self
    }

    /// Set the user's only role in the class.
    pub fn set_class_role(&self, user: &Username, class: &ClassId, role: ClassRole) -> &Self {
        let mut state = self.state.write();
        state.users.insert(user.clone());
        state
            .classes
            .entry(class.clone())
            .or_default()
            .insert(user.clone(), role);
        self
    }

    /// Drop the user's class membership.
    pub fn remove_from_class(&self, user: &Username, class: &ClassId) -> &Self {
        if let Some(members) = self.state.write().classes.get_mut(class) {
            members.remove(user);
        }
        self
    }

    /// Store a document. Its creator becomes a direct owner.
    pub fn add_document(&self, record: DocumentRecord) -> &Self {
        let mut state = self.state.write();
        state.users.insert(record.creator.clone());
        let entry = state.documents.entry(record.id.clone()).or_default();
        entry.direct.insert(record.creator.clone(), DocumentRole::Owner);
        entry.record = Some(record);
        self
    }

    /// Change a stored document's privacy state.
    pub fn set_document_privacy(&self, document: &DocumentId, privacy: ResourcePrivacyState) -> &Self {
        if let Some(record) = self
            .state
            .write()
            .documents
            .get_mut(document)
            .and_then(|entry| entry.record.as_mut())
        {
            record.privacy = privacy;
        }
        self
    }

    /// Grant the user a direct role on the document.
    pub fn grant_document_role(&self, user: &Username, document: &DocumentId, role: DocumentRole) -> &Self {
        let mut state = self.state.write();
        state.users.insert(user.clone());
        state
            .documents
            .entry(document.clone())
            .or_default()
            .direct
            .insert(user.clone(), role);
        self
    }

    /// Share the document with every member of the campaign at `role`.
    pub fn link_document_to_campaign(&self, document: &DocumentId, campaign: &CampaignId, role: DocumentRole) -> &Self {
        self.state
            .write()
            .documents
            .entry(document.clone())
            .or_default()
            .campaigns
            .insert(campaign.clone(), role);
        self
    }

    /// Share the document with every member of the class at `role`.
    pub fn link_document_to_class(&self, document: &DocumentId, class: &ClassId, role: DocumentRole) -> &Self {
        self.state
            .write()
            .documents
            .entry(document.clone())
            .or_default()
            .classes
            .insert(class.clone(), role);
        self
    }

    /// Register a survey response or media id.
    pub fn add_resource(&self, resource: ResourceId) -> &Self {
        self.state.write().resources.insert(resource);
        self
    }

    /// Set a server preference.
    pub fn set_preference(&self, key: impl Into<String>, value: impl Into<String>) -> &Self {
        self.state.write().preferences.insert(key.into(), value.into());
        self
    }
}

impl Repository for InMemoryRepository {
    fn campaign_roles(
        &self,
        user: &Username,
        campaign: &CampaignId,
    ) -> Result<RoleSet<CampaignRole>, RepositoryError> {
        Ok(self
            .state
            .read()
            .campaigns
            .get(campaign)
            .and_then(|c| c.members.get(user))
            .cloned()
            .unwrap_or_default())
    }

    fn class_role(&self, user: &Username, class: &ClassId) -> Result<Option<ClassRole>, RepositoryError> {
        Ok(self
            .state
            .read()
            .classes
            .get(class)
            .and_then(|members| members.get(user))
            .copied())
    }

    fn document_role_sources(
        &self,
        user: &Username,
        document: &DocumentId,
    ) -> Result<DocumentRoleSources, RepositoryError> {
        let state = self.state.read();
        let Some(entry) = state.documents.get(document) else {
            return Ok(DocumentRoleSources::default());
        };

        let via_classes = entry
            .classes
            .iter()
            .filter(|(class, _)| {
                state
                    .classes
                    .get(*class)
                    .is_some_and(|members| members.contains_key(user))
            })
            .map(|(_, role)| *role)
            .collect();

        let via_campaigns = entry
            .campaigns
            .iter()
            .filter(|(campaign, _)| {
                state
                    .campaigns
                    .get(*campaign)
                    .is_some_and(|c| c.members.contains_key(user))
            })
            .map(|(_, role)| *role)
            .collect();

        Ok(DocumentRoleSources {
            direct: entry.direct.get(user).copied(),
            via_classes,
            via_campaigns,
        })
    }

    fn campaign_privacy_state(&self, campaign: &CampaignId) -> Result<CampaignPrivacyState, RepositoryError> {
        self.state
            .read()
            .campaigns
            .get(campaign)
            .and_then(|c| c.privacy)
            .ok_or_else(|| {
                RepositoryError::query("campaign_privacy_state", format!("no privacy state for {campaign}"))
            })
    }

    fn entity_exists(&self, id: &str, kind: EntityKind) -> Result<bool, RepositoryError> {
        let state = self.state.read();
        // Ids that fail to parse cannot name a stored entity.
        let exists = match kind {
            EntityKind::User => Username::parse(id).is_ok_and(|u| state.users.contains(&u)),
            EntityKind::Campaign => CampaignId::parse(id).is_ok_and(|c| state.campaigns.contains_key(&c)),
            EntityKind::Class => ClassId::parse(id).is_ok_and(|c| state.classes.contains_key(&c)),
            EntityKind::Document => DocumentId::parse(id).is_ok_and(|d| state.documents.contains_key(&d)),
            EntityKind::Resource => ResourceId::parse(id).is_ok_and(|r| state.resources.contains(&r)),
        };
        Ok(exists)
    }

    fn is_admin(&self, user: &Username) -> Result<bool, RepositoryError> {
        Ok(self.state.read().admins.contains(user))
    }

    fn survey_response_count(&self, campaign: &CampaignId) -> Result<u64, RepositoryError> {
        Ok(self
            .state
            .read()
            .campaigns
            .get(campaign)
            .map_or(0, |c| c.responses))
    }

    fn document_record(&self, document: &DocumentId) -> Result<Option<DocumentRecord>, RepositoryError> {
        Ok(self
            .state
            .read()
            .documents
            .get(document)
            .and_then(|entry| entry.record.clone()))
    }

    fn campaigns_for_document(&self, document: &DocumentId) -> Result<Vec<CampaignId>, RepositoryError> {
        Ok(self
            .state
            .read()
            .documents
            .get(document)
            .map(|d| d.campaigns.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn classes_for_document(&self, document: &DocumentId) -> Result<Vec<ClassId>, RepositoryError> {
        Ok(self
            .state
            .read()
            .documents
            .get(document)
            .map(|d| d.classes.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn classes_for_user(&self, user: &Username) -> Result<Vec<ClassId>, RepositoryError> {
        let state = self.state.read();
        let mut classes: Vec<ClassId> = state
            .classes
            .iter()
            .filter(|(_, members)| members.contains_key(user))
            .map(|(class, _)| class.clone())
            .collect();
        classes.sort();
        Ok(classes)
    }
}

impl PreferenceSource for InMemoryRepository {
    fn load(&self) -> Result<HashMap<String, String>, RepositoryError> {
        Ok(self.state.read().preferences.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Username {
        Username::parse(name).unwrap()
    }

    fn record(id: &DocumentId, creator: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.clone(),
            creator: user(creator),
            name: "consent.pdf".to_string(),
            privacy: ResourcePrivacyState::Private,
        }
    }

    #[test]
    fn test_revoking_last_role_ends_membership() {
        let repo = InMemoryRepository::new();
        let campaign = CampaignId::parse("urn:campaign:a").unwrap();
        repo.add_campaign(campaign.clone(), CampaignPrivacyState::Private)
            .grant_campaign_role(&user("alice"), &campaign, CampaignRole::Participant)
            .revoke_campaign_role(&user("alice"), &campaign, CampaignRole::Participant);

        assert!(repo.campaign_roles(&user("alice"), &campaign).unwrap().is_empty());
    }

    #[test]
    fn test_document_sources_follow_membership() {
        let repo = InMemoryRepository::new();
        let doc = DocumentId::generate();
        let class = ClassId::parse("urn:class:bio").unwrap();
        let campaign = CampaignId::parse("urn:campaign:a").unwrap();

        repo.add_document(record(&doc, "carol"))
            .set_class_role(&user("alice"), &class, ClassRole::Restricted)
            .link_document_to_class(&doc, &class, DocumentRole::Writer)
            .link_document_to_campaign(&doc, &campaign, DocumentRole::Reader)
            .grant_document_role(&user("alice"), &doc, DocumentRole::Reader);

        let sources = repo.document_role_sources(&user("alice"), &doc).unwrap();
        assert_eq!(sources.direct, Some(DocumentRole::Reader));
        assert_eq!(sources.via_classes.highest(), Some(DocumentRole::Writer));
        assert!(sources.via_campaigns.is_empty());
        assert_eq!(sources.effective(), Some(DocumentRole::Writer));
    }

    #[test]
    fn test_document_record_and_creator_ownership() {
        let repo = InMemoryRepository::new();
        let doc = DocumentId::generate();
        assert_eq!(repo.document_record(&doc).unwrap(), None);

        repo.add_document(record(&doc, "carol"))
            .set_document_privacy(&doc, ResourcePrivacyState::Shared);

        let stored = repo.document_record(&doc).unwrap().unwrap();
        assert_eq!(stored.privacy, ResourcePrivacyState::Shared);
        assert_eq!(
            repo.document_role_sources(&user("carol"), &doc).unwrap().direct,
            Some(DocumentRole::Owner)
        );
        assert!(repo.entity_exists("carol", EntityKind::User).unwrap());
    }

    #[test]
    fn test_entity_exists_by_kind() {
        let repo = InMemoryRepository::new();
        repo.add_user(user("alice"));
        assert!(repo.entity_exists("alice", EntityKind::User).unwrap());
        assert!(!repo.entity_exists("alice", EntityKind::Campaign).unwrap());
        assert!(!repo.entity_exists("   ", EntityKind::User).unwrap());
    }

    #[test]
    fn test_missing_privacy_state_is_an_error() {
        let repo = InMemoryRepository::new();
        let campaign = CampaignId::parse("urn:campaign:ghost").unwrap();
        assert!(repo.campaign_privacy_state(&campaign).is_err());
    }

    #[test]
    fn test_preferences_are_a_source() {
        let repo = InMemoryRepository::new();
        repo.set_preference("k", "v");
        assert_eq!(repo.load().unwrap().get("k").map(String::as_str), Some("v"));
    }
}
