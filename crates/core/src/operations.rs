//! Concrete operation descriptions.

use serde::{Deserialize, Deserializer};

use crate::{
    AccountNameable, ApplicationNameable, DomainError, DomainResult, OperationDescription,
    OperationsSecurityPolicy, ResourcesNameable,
};

/// Generic description decoded from a JSON operation document.
///
/// A capability is present exactly when its field is present in the document,
/// even if the value is `null`:
///
/// ```json
/// { "type": "DeployServerGroup", "account": "prod", "applications": ["checkout"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDocument {
    #[serde(rename = "type")]
    pub description_type: String,

    #[serde(default, deserialize_with = "present")]
    pub account: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub applications: Option<Option<Vec<Option<String>>>>,

    #[serde(default, deserialize_with = "present")]
    pub resource_applications: Option<Option<Vec<Option<String>>>>,

    #[serde(default)]
    pub requires_application_restriction: Option<bool>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl OperationDocument {
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let document: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("operation document: {e}")))?;

        if document.description_type.trim().is_empty() {
            return Err(DomainError::invalid_name("operation type must not be blank"));
        }

        Ok(document)
    }
}

impl AccountNameable for OperationDocument {
    fn account(&self) -> Option<&str> {
        self.account.as_ref().and_then(|a| a.as_deref())
    }

    fn requires_application_restriction(&self) -> bool {
        self.requires_application_restriction.unwrap_or(true)
    }
}

impl ApplicationNameable for OperationDocument {
    fn applications(&self) -> Option<&[Option<String>]> {
        self.applications.as_ref().and_then(|a| a.as_deref())
    }
}

impl ResourcesNameable for OperationDocument {
    fn resource_applications(&self) -> Option<&[Option<String>]> {
        self.resource_applications.as_ref().and_then(|a| a.as_deref())
    }
}

impl OperationDescription for OperationDocument {
    fn description_type(&self) -> &str {
        &self.description_type
    }

    fn as_account_nameable(&self) -> Option<&dyn AccountNameable> {
        self.account.as_ref().map(|_| self as &dyn AccountNameable)
    }

    fn as_application_nameable(&self) -> Option<&dyn ApplicationNameable> {
        self.applications.as_ref().map(|_| self as &dyn ApplicationNameable)
    }

    fn as_resources_nameable(&self) -> Option<&dyn ResourcesNameable> {
        self.resource_applications
            .as_ref()
            .map(|_| self as &dyn ResourcesNameable)
    }
}

/// Upserts tags on a machine image.
///
/// Tagging may be allowed without authorization in selected accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertImageTagsDescription {
    pub account: Option<String>,
    pub image_name: String,
    pub applications: Vec<Option<String>>,
}

impl AccountNameable for UpsertImageTagsDescription {
    fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    fn requires_authorization(&self, policy: &OperationsSecurityPolicy) -> bool {
        !policy.allows_unauthenticated_image_tagging(self.account())
    }
}

impl ApplicationNameable for UpsertImageTagsDescription {
    fn applications(&self) -> Option<&[Option<String>]> {
        Some(self.applications.as_slice())
    }
}

impl OperationDescription for UpsertImageTagsDescription {
    fn description_type(&self) -> &str {
        "UpsertImageTagsDescription"
    }

    fn as_account_nameable(&self) -> Option<&dyn AccountNameable> {
        Some(self)
    }

    fn as_application_nameable(&self) -> Option<&dyn ApplicationNameable> {
        Some(self)
    }
}

/// Creates or updates a security group. Security groups are shared across
/// applications, so no application attribution is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertSecurityGroupDescription {
    pub account: Option<String>,
    pub name: String,
}

impl AccountNameable for UpsertSecurityGroupDescription {
    fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    fn requires_application_restriction(&self) -> bool {
        false
    }
}

impl OperationDescription for UpsertSecurityGroupDescription {
    fn description_type(&self) -> &str {
        "UpsertSecurityGroupDescription"
    }

    fn as_account_nameable(&self) -> Option<&dyn AccountNameable> {
        Some(self)
    }
}

/// Terminates instances. Affected applications are those owning the
/// instances' server groups, resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminateInstancesDescription {
    pub account: Option<String>,
    pub instance_ids: Vec<String>,
    pub owning_applications: Option<Vec<Option<String>>>,
}

impl AccountNameable for TerminateInstancesDescription {
    fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}

impl ResourcesNameable for TerminateInstancesDescription {
    fn resource_applications(&self) -> Option<&[Option<String>]> {
        self.owning_applications.as_deref()
    }
}

impl OperationDescription for TerminateInstancesDescription {
    fn description_type(&self) -> &str {
        "TerminateInstancesDescription"
    }

    fn as_account_nameable(&self) -> Option<&dyn AccountNameable> {
        Some(self)
    }

    fn as_resources_nameable(&self) -> Option<&dyn ResourcesNameable> {
        Some(self)
    }
}
