//! Authorization audit logging.

use crate::error::AuthzError;
use crate::model::Identity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// One authorization decision.
#[derive(Debug, Serialize)]
pub struct AuthzAuditEvent {
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// The requesting user.
    pub username: String,
    /// Engine operation that decided.
    pub operation: &'static str,
    /// Container or subject the decision was about.
    pub scope: String,
    /// The resource, for per-resource decisions.
    pub resource_id: Option<String>,
    /// Whether access was granted.
    pub granted: bool,
    /// Denial reason.
    pub reason: Option<String>,
}

impl AuthzAuditEvent {
    /// Record a decision made now.
    pub fn new(
        identity: &Identity,
        operation: &'static str,
        scope: impl Into<String>,
        resource_id: Option<&str>,
        granted: bool,
        reason: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            username: identity.username().to_string(),
            operation,
            scope: scope.into(),
            resource_id: resource_id.map(String::from),
            granted,
            reason,
        }
    }

    /// Emit the event. Grants go to `debug` unless `grants_at_info` is set;
    /// denials always go to `info`.
    pub fn log(&self, grants_at_info: bool) {
        if self.granted {
            if grants_at_info {
                info!(
                    event = "authz_granted",
                    user = %self.username,
                    operation = self.operation,
                    scope = %self.scope,
                    resource_id = ?self.resource_id,
                    "Authorization granted"
                );
            } else {
                debug!(
                    event = "authz_granted",
                    user = %self.username,
                    operation = self.operation,
                    scope = %self.scope,
                    resource_id = ?self.resource_id,
                    "Authorization granted"
                );
            }
        } else {
            info!(
                event = "authz_denied",
                user = %self.username,
                operation = self.operation,
                scope = %self.scope,
                resource_id = ?self.resource_id,
                reason = ?self.reason,
                "Authorization denied"
            );
        }
    }
}

/// Log an operation that failed for a reason other than a denial.
pub fn log_fault(identity: &Identity, operation: &'static str, scope: &str, err: &AuthzError) {
    match err {
        AuthzError::MalformedRoleAssignment { detail } => error!(
            event = "authz_malformed_roles",
            user = %identity.username(),
            operation,
            scope,
            detail = %detail,
            "Role data failed integrity check"
        ),
        AuthzError::Repository(e) => warn!(
            event = "authz_repository_failure",
            user = %identity.username(),
            operation,
            scope,
            error = %e,
            "Repository lookup failed"
        ),
        other => debug!(
            event = "authz_precondition_failed",
            user = %identity.username(),
            operation,
            scope,
            code = %other.code(),
            error = %other,
            "Precondition failed"
        ),
    }
}
