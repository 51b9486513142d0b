closed_enum! {
    /// Visibility of a whole campaign.
    pub enum CampaignPrivacyState as "campaign privacy state" {
        Private => "private",
        Shared => "shared",
    }
}

closed_enum! {
    /// Visibility of a single resource inside a container.
    ///
    /// `Invisible` hides the resource from everyone but its owner, admins and
    /// the container's top role.
    pub enum ResourcePrivacyState as "resource privacy state" {
        Private => "private",
        Shared => "shared",
        Invisible => "invisible",
    }
}

impl CampaignPrivacyState {
    /// Whether the state is `Shared`.
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }
}

impl ResourcePrivacyState {
    /// Whether the owner has shared the resource.
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }

    /// Whether the state is `Invisible`.
    pub fn is_invisible(&self) -> bool {
        matches!(self, Self::Invisible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("shared", ResourcePrivacyState::Shared)]
    #[test_case("SHARED", ResourcePrivacyState::Shared)]
    #[test_case(" Invisible ", ResourcePrivacyState::Invisible)]
    #[test_case("private", ResourcePrivacyState::Private)]
    fn test_resource_state_parses_case_insensitively(input: &str, expected: ResourcePrivacyState) {
        assert_eq!(input.parse::<ResourcePrivacyState>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_state_is_an_error() {
        let err = "hidden".parse::<CampaignPrivacyState>().unwrap_err();
        assert_eq!(err.kind, "campaign privacy state");
        assert_eq!(err.value, "hidden");
    }

    #[test]
    fn test_campaign_state_has_no_invisible() {
        assert!("invisible".parse::<CampaignPrivacyState>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ResourcePrivacyState::Invisible).unwrap();
        assert_eq!(json, "\"invisible\"");
        let parsed: CampaignPrivacyState = serde_json::from_str("\"Shared\"").unwrap();
        assert_eq!(parsed, CampaignPrivacyState::Shared);
    }
}
