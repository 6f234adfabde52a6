use serde::{Deserialize, Serialize};

/// Operations security policy.
///
/// Answers, per description type and account, whether authorization is
/// required at all. Type waivers apply to every account-scoped description;
/// account-level rules are consulted by individual descriptions from
/// [`crate::AccountNameable::requires_authorization`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationsSecurityPolicy {
    /// Accounts in which image tags may be upserted without authorization.
    pub allow_unauthenticated_image_tagging_in_accounts: Vec<String>,

    /// Description types for which authorization is waived entirely.
    pub skip_authorization_for: Vec<String>,
}

impl OperationsSecurityPolicy {
    pub fn allows_unauthenticated_image_tagging(&self, account: Option<&str>) -> bool {
        account.is_some_and(|account| {
            self.allow_unauthenticated_image_tagging_in_accounts
                .iter()
                .any(|a| a == account)
        })
    }

    pub fn skips_authorization_for(&self, description_type: &str) -> bool {
        self.skip_authorization_for.iter().any(|t| t == description_type)
    }
}
