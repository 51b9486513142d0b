//! The authorization facade used by request handlers.
//!
//! Every public operation runs inside an `authz` span and leaves one audit
//! record. Role and privacy facts are re-read from the repository on every
//! call; only server preferences come from the shared cache.

mod campaign;
mod class;
mod document;

use crate::audit::{self, AuthzAuditEvent};
use crate::cache::{CacheError, PreferenceCache};
use crate::error::{AuthzError, AuthzResult};
use crate::existence::ExistenceGuard;
use crate::filter::ResultFilter;
use crate::grant::RoleMutationGuard;
use crate::model::{
    Action, AnyRole, CampaignPrivacyState, CampaignRole, ContainerKind, ContainerRef,
    ContainerRoles, Entity, Identity, ProtectedResource, ResourcePrivacyState, Role,
    RoleAssignment, RoleSet,
};
use crate::policy::{Decision, PolicyOptions, PrivacyPolicy, Rule};
use crate::repository::Repository;
use crate::resolver::RoleResolver;
use std::collections::HashMap;
use std::sync::Arc;
use tessera_common_config::PolicyConfig;
use tessera_common_core::{CampaignId, Username};
use tessera_common_log::spans::{authz_span, record_error};
use tracing::debug;

type ContainerFacts = (ContainerRoles, Option<CampaignPrivacyState>);

/// Authorization and privacy-filtering engine.
///
/// Built once at startup and shared; holds no per-request state.
pub struct AuthzEngine {
    repo: Arc<dyn Repository>,
    policy: PrivacyPolicy,
    preferences: Option<Arc<PreferenceCache>>,
    grants_at_info: bool,
}

impl AuthzEngine {
    /// Engine with the default policy and no preference cache.
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            policy: PrivacyPolicy::default(),
            preferences: None,
            grants_at_info: false,
        }
    }

    /// Engine configured from the `policy` section of the config file.
    pub fn from_config(repo: Arc<dyn Repository>, config: &PolicyConfig) -> Self {
        Self::new(repo)
            .with_policy(PolicyOptions::from(config))
            .log_granted_decisions(config.log_granted_decisions)
    }

    /// Replace the policy tunables.
    pub fn with_policy(mut self, options: PolicyOptions) -> Self {
        self.policy = PrivacyPolicy::new(options);
        self
    }

    /// Attach the shared preference cache.
    pub fn with_preferences(mut self, preferences: Arc<PreferenceCache>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Log granted decisions at info instead of debug.
    pub fn log_granted_decisions(mut self, enabled: bool) -> Self {
        self.grants_at_info = enabled;
        self
    }

    /// The decision table in use.
    pub fn policy(&self) -> &PrivacyPolicy {
        &self.policy
    }

    /// Build the identity for an authenticated user.
    pub fn identify(&self, username: &Username) -> AuthzResult<Identity> {
        self.existence().check(Some(username), true)?;
        let is_admin = self.repo.is_admin(username)?;
        Ok(Identity::new(username.clone(), is_admin))
    }

    /// Decide whether `identity` may perform `action` on `resource`.
    pub fn authorize<T>(&self, identity: &Identity, action: Action, resource: &T) -> AuthzResult<()>
    where
        T: ProtectedResource + ?Sized,
    {
        let container = resource.container();
        let scope = container.to_string();
        self.audited(identity, "authorize", &scope, Some(resource.resource_id()), || {
            let decision = self.decide(identity, action, resource, &container)?;
            if decision.allowed {
                return Ok(());
            }
            let reason = format!(
                "cannot {action} {}: {}",
                resource.resource_id(),
                decision.reason()
            );
            Err(match container.kind() {
                ContainerKind::Document => AuthzError::denied(ContainerKind::Document, reason),
                _ => AuthzError::resource_denied(reason),
            })
        })
    }

    /// Annotating is only open to the resource owner and the container's
    /// top role.
    pub fn verify_can_annotate<T>(&self, identity: &Identity, resource: &T) -> AuthzResult<()>
    where
        T: ProtectedResource + ?Sized,
    {
        self.authorize(identity, Action::Annotate, resource)
    }

    /// Keep the resources in `container` that `identity` may view.
    ///
    /// Fails closed: if the container's roles cannot be read, nothing is
    /// returned.
    pub fn filter_visible<T: ProtectedResource>(
        &self,
        identity: &Identity,
        container: &ContainerRef,
        resources: Vec<T>,
    ) -> Vec<T> {
        self.filter_visible_with_privacy(identity, container, resources, None)
    }

    /// As [`filter_visible`](Self::filter_visible), then keep only resources
    /// in exactly the `narrow_to` state.
    pub fn filter_visible_with_privacy<T: ProtectedResource>(
        &self,
        identity: &Identity,
        container: &ContainerRef,
        resources: Vec<T>,
        narrow_to: Option<ResourcePrivacyState>,
    ) -> Vec<T> {
        let span = authz_span(identity.username().as_str(), "filter_visible");
        let _entered = span.enter();

        let facts = match self.container_facts(identity, container) {
            Ok(facts) => facts,
            Err(err) => {
                record_error(&err);
                audit::log_fault(identity, "filter_visible", &container.to_string(), &err);
                return Vec::new();
            }
        };

        let total = resources.len();
        let visible = ResultFilter::new(&self.policy).filter_with_privacy(
            identity,
            container,
            &facts.0,
            facts.1,
            resources,
            narrow_to,
        );
        debug!(
            container = %container,
            total,
            visible = visible.len(),
            "Filtered resources"
        );
        visible
    }

    /// Filter resources that may come from several containers. Each
    /// container is resolved once; a container whose facts cannot be read
    /// loses its items and the rest are still returned.
    pub fn filter_visible_all<T: ProtectedResource>(&self, identity: &Identity, resources: Vec<T>) -> Vec<T> {
        let span = authz_span(identity.username().as_str(), "filter_visible_all");
        let _entered = span.enter();

        let mut facts: HashMap<ContainerRef, Option<ContainerFacts>> = HashMap::new();
        let total = resources.len();
        let visible: Vec<T> = resources
            .into_iter()
            .filter(|resource| {
                let container = resource.container();
                let entry = facts.entry(container.clone()).or_insert_with(|| {
                    match self.container_facts(identity, &container) {
                        Ok(found) => Some(found),
                        Err(err) => {
                            audit::log_fault(identity, "filter_visible_all", &container.to_string(), &err);
                            None
                        }
                    }
                });
                entry.as_ref().is_some_and(|(roles, privacy)| {
                    self.policy
                        .can_perform(identity, Action::View, resource, roles, *privacy)
                })
            })
            .collect();

        debug!(
            containers = facts.len(),
            total,
            visible = visible.len(),
            "Filtered resources across containers"
        );
        visible
    }

    /// Fail unless the entity's existence matches `should_exist`.
    pub fn guard_existence<E: Entity>(&self, id: Option<&E>, should_exist: bool) -> AuthzResult<()> {
        self.existence().check(id, should_exist).map_err(|err| {
            debug!(kind = %E::KIND, error = %err, "Existence check failed");
            AuthzError::from(err)
        })
    }

    /// [`guard_existence`](Self::guard_existence) for every id, stopping at the first failure.
    pub fn guard_existence_all<'i, E, I>(&self, ids: I, should_exist: bool) -> AuthzResult<()>
    where
        E: Entity + 'i,
        I: IntoIterator<Item = &'i E>,
    {
        ids.into_iter()
            .try_for_each(|id| self.guard_existence(Some(id), should_exist))
    }

    /// Refuse grants of roles above the requester's own highest role in the
    /// container. The top role may grant anything.
    pub fn guard_role_grant(
        &self,
        identity: &Identity,
        container: &ContainerRef,
        roles: &[AnyRole],
    ) -> AuthzResult<()> {
        self.audited(identity, "guard_role_grant", &container.to_string(), None, || {
            for role in roles {
                RoleAssignment::new(identity.username().clone(), container.clone(), *role)?;
            }
            if identity.is_admin() {
                return Ok(());
            }

            let resolver = self.resolver();
            match container {
                ContainerRef::Campaign(id) => check_grant(
                    ContainerKind::Campaign,
                    resolver.campaign_roles(identity, id)?.highest(),
                    roles.iter().filter_map(|r| match r {
                        AnyRole::Campaign(role) => Some(*role),
                        _ => None,
                    }),
                ),
                ContainerRef::Class(id) => check_grant(
                    ContainerKind::Class,
                    resolver.class_role(identity, id)?,
                    roles.iter().filter_map(|r| match r {
                        AnyRole::Class(role) => Some(*role),
                        _ => None,
                    }),
                ),
                ContainerRef::Document(id) => check_grant(
                    ContainerKind::Document,
                    resolver.document_role(identity, id)?,
                    roles.iter().filter_map(|r| match r {
                        AnyRole::Document(role) => Some(*role),
                        _ => None,
                    }),
                ),
            }
        })
    }

    fn decide<T>(
        &self,
        identity: &Identity,
        action: Action,
        resource: &T,
        container: &ContainerRef,
    ) -> AuthzResult<Decision>
    where
        T: ProtectedResource + ?Sized,
    {
        // The admin and owner rows need no container lookups.
        if identity.is_admin() || identity.is(resource.owner()) {
            let none = ContainerRoles::none(container.kind());
            return Ok(self.policy.evaluate(identity, action, resource, &none, None));
        }
        let (roles, privacy) = self.container_facts(identity, container)?;
        let decision = self.policy.evaluate(identity, action, resource, &roles, privacy);
        if decision.allowed || action == Action::Annotate {
            return Ok(decision);
        }
        match container {
            ContainerRef::Document(id) if self.has_linkage_override(identity, id)? => {
                Ok(Decision::allow(Rule::LinkedContainerOverride))
            }
            _ => Ok(decision),
        }
    }

    fn container_facts(&self, identity: &Identity, container: &ContainerRef) -> AuthzResult<ContainerFacts> {
        if identity.is_admin() {
            return Ok((ContainerRoles::none(container.kind()), None));
        }
        let roles = self.resolver().resolve(identity, container)?;
        let privacy = match container {
            ContainerRef::Campaign(id) => Some(self.repo.campaign_privacy_state(id)?),
            _ => None,
        };
        Ok((roles, privacy))
    }

    fn campaign_roles(&self, identity: &Identity, campaign: &CampaignId) -> AuthzResult<RoleSet<CampaignRole>> {
        self.resolver().campaign_roles(identity, campaign)
    }

    fn preference_enabled(&self, key: &str) -> AuthzResult<bool> {
        let Some(preferences) = &self.preferences else {
            return Ok(false);
        };
        match preferences.get_bool(key) {
            Ok(enabled) => Ok(enabled),
            Err(CacheError::UnknownKey(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn resolver(&self) -> RoleResolver<'_> {
        RoleResolver::new(self.repo.as_ref())
    }

    fn existence(&self) -> ExistenceGuard<'_> {
        ExistenceGuard::new(self.repo.as_ref())
    }

    fn audited<T>(
        &self,
        identity: &Identity,
        operation: &'static str,
        scope: &str,
        resource_id: Option<&str>,
        check: impl FnOnce() -> AuthzResult<T>,
    ) -> AuthzResult<T> {
        let span = authz_span(identity.username().as_str(), operation);
        let _entered = span.enter();

        let result = check();
        match &result {
            Ok(_) => AuthzAuditEvent::new(identity, operation, scope, resource_id, true, None)
                .log(self.grants_at_info),
            Err(err) if err.is_denial() => AuthzAuditEvent::new(
                identity,
                operation,
                scope,
                resource_id,
                false,
                Some(err.to_string()),
            )
            .log(self.grants_at_info),
            Err(err) => {
                record_error(err);
                audit::log_fault(identity, operation, scope, err);
            }
        }
        result
    }
}

impl std::fmt::Debug for AuthzEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthzEngine")
            .field("policy", &self.policy)
            .field("preferences", &self.preferences)
            .field("grants_at_info", &self.grants_at_info)
            .finish_non_exhaustive()
    }
}

fn check_grant<R: Role>(
    kind: ContainerKind,
    requester: Option<R>,
    batch: impl Iterator<Item = R>,
) -> AuthzResult<()> {
    let batch: Vec<R> = batch.collect();
    if RoleMutationGuard::can_grant_all(requester, batch.iter().copied()) {
        return Ok(());
    }
    let highest = batch.iter().max().map(ToString::to_string).unwrap_or_default();
    Err(AuthzError::denied(
        kind,
        match requester {
            Some(held) => format!("a {held} may not grant the {highest} role"),
            None => format!("a non-member may not grant the {highest} role"),
        },
    ))
}
