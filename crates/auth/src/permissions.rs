//! Permission-check port and an in-memory backend.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use opsguard_core::{Authorization, ResourceType};

use crate::Identity;

/// Resource name granting access to every resource of a kind.
const WILDCARD: &str = "*";

/// Answers whether an identity holds an access level on a resource.
///
/// Implementations own their timeouts, retries and fail-open/closed behavior;
/// the authorizer treats the answer as final.
pub trait PermissionEvaluator: Send + Sync {
    fn has_permission(
        &self,
        identity: Option<&Identity>,
        resource_id: &str,
        resource_type: ResourceType,
        authorization: Authorization,
    ) -> bool;

    /// Hint that several checks for `identity` are about to follow.
    ///
    /// Safe to call any number of times; the default does nothing.
    fn preload_bulk_permissions(&self, _identity: Option<&Identity>) {}
}

#[derive(Debug, Error)]
pub enum GrantError {
    #[error("invalid grant table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Grants held by one principal, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Grants {
    pub accounts: HashMap<String, HashSet<Authorization>>,
    pub applications: HashMap<String, HashSet<Authorization>>,
}

impl Grants {
    fn for_type(&self, resource_type: ResourceType) -> &HashMap<String, HashSet<Authorization>> {
        match resource_type {
            ResourceType::Account => &self.accounts,
            ResourceType::Application => &self.applications,
        }
    }

    fn allows(&self, resource_type: ResourceType, resource_id: &str, authorization: Authorization) -> bool {
        let grants = self.for_type(resource_type);

        [resource_id, WILDCARD]
            .iter()
            .filter_map(|name| grants.get(*name))
            .flatten()
            .any(|granted| implies(*granted, authorization))
    }
}

fn implies(granted: Authorization, requested: Authorization) -> bool {
    granted == requested || (granted == Authorization::Write && requested == Authorization::Read)
}

/// Static grant table.
///
/// Decoded from JSON of the form:
///
/// ```json
/// { "principals": { "alice": { "accounts": { "prod": ["WRITE"] }, "applications": { "*": ["WRITE"] } } } }
/// ```
///
/// A missing identity is never granted anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticPermissionEvaluator {
    principals: HashMap<String, Grants>,
}

impl StaticPermissionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, GrantError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn grant(
        mut self,
        principal: impl Into<String>,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        authorization: Authorization,
    ) -> Self {
        let grants = self.principals.entry(principal.into()).or_default();
        let by_name = match resource_type {
            ResourceType::Account => &mut grants.accounts,
            ResourceType::Application => &mut grants.applications,
        };
        by_name.entry(resource_id.into()).or_default().insert(authorization);
        self
    }
}

impl PermissionEvaluator for StaticPermissionEvaluator {
    fn has_permission(
        &self,
        identity: Option<&Identity>,
        resource_id: &str,
        resource_type: ResourceType,
        authorization: Authorization,
    ) -> bool {
        identity
            .and_then(|identity| self.principals.get(identity.principal()))
            .is_some_and(|grants| grants.allows(resource_type, resource_id, authorization))
    }
}
