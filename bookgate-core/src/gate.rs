//! Role-gated access decisions
//!
//! A gate decision takes the email forwarded by the OAuth proxy and the role
//! the gateway requires, resolves the caller's stored role (creating the user
//! on first sight), and returns a [`Verdict`].
//!
//! ```text
//!   email missing ───────────────▶ GateError::MissingEmail   (401)
//!   requirement Any ─▶ ensure_user ─▶ Allow  (store failure falls back to "user")
//!   requirement Role ─▶ ensure_user ─┬▶ Allow      (roles equal)
//!                                    ├▶ Forbidden  (roles differ, identity known)
//!                                    └▶ GateError::Store       (500)
//! ```

use crate::error::GateError;
use crate::store::UserStore;
use crate::types::DEFAULT_ROLE;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Role the gateway asks for in `X-Required-Role`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// No role gate (header absent, empty or `"any"`)
    Any,
    /// The caller's role must equal this name exactly
    Role(String),
}

impl RoleRequirement {
    /// Wildcard accepted in `X-Required-Role`
    pub const ANY: &'static str = "any";

    /// Parse the raw header value
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            None => RoleRequirement::Any,
            Some(v) if v.is_empty() || v == Self::ANY => RoleRequirement::Any,
            Some(v) => RoleRequirement::Role(v.to_string()),
        }
    }

    /// Check whether `role` meets this requirement
    pub fn is_satisfied_by(&self, role: &str) -> bool {
        match self {
            RoleRequirement::Any => true,
            RoleRequirement::Role(required) => required == role,
        }
    }
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleRequirement::Any => f.write_str(Self::ANY),
            RoleRequirement::Role(role) => f.write_str(role),
        }
    }
}

/// Caller identity stamped onto `X-User-Email` / `X-User-Role`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Forwarded email
    pub email: String,
    /// Resolved role
    pub role: String,
}

/// Result of a gate decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Verdict {
    /// Caller may proceed
    Allow {
        /// Resolved identity
        identity: Identity,
        /// Whether the user row was created by this decision
        created: bool,
    },
    /// Caller is known but lacks the required role
    Forbidden {
        /// Resolved identity
        identity: Identity,
        /// The role that was required
        required: String,
    },
}

impl Verdict {
    /// Identity resolved during the decision
    pub fn identity(&self) -> &Identity {
        match self {
            Verdict::Allow { identity, .. } | Verdict::Forbidden { identity, .. } => identity,
        }
    }

    /// Check if the caller may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow { .. })
    }

    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Allow { .. } => "allow",
            Verdict::Forbidden { .. } => "forbidden",
        }
    }
}

/// Decide whether the caller identified by `email` meets `requirement`.
///
/// Issues at most one store call.
pub async fn decide<S>(
    store: &S,
    email: Option<&str>,
    requirement: &RoleRequirement,
) -> Result<Verdict, GateError>
where
    S: UserStore + ?Sized,
{
    let email = match email {
        Some(e) if !e.is_empty() => e,
        _ => return Err(GateError::MissingEmail),
    };

    let (role, created) = match store.ensure_user(email, DEFAULT_ROLE).await {
        Ok(ensured) => (ensured.user.role, ensured.created),
        Err(e) if *requirement == RoleRequirement::Any => {
            warn!(email, error = %e, "Role lookup failed on open route, assuming default role");
            (DEFAULT_ROLE.to_string(), false)
        }
        Err(e) => return Err(e.into()),
    };

    if created {
        info!(email, role = %role, "Created user with default role");
        metrics::counter!("bookgate_users_created_total", 1);
    }

    let identity = Identity {
        email: email.to_string(),
        role,
    };

    if requirement.is_satisfied_by(&identity.role) {
        Ok(Verdict::Allow { identity, created })
    } else {
        Ok(Verdict::Forbidden {
            identity,
            required: requirement.to_string(),
        })
    }
}
