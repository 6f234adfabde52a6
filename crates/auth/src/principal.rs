use serde::{Deserialize, Serialize};

const ANONYMOUS: &str = "anonymous";

/// Authenticated caller, as established by whatever security layer is in use.
///
/// The authorizer never inspects it; it is only forwarded to the
/// [`crate::PermissionEvaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity {
    principal: String,
}

impl Identity {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS)
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.principal)
    }
}
