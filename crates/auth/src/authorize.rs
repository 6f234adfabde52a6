use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use opsguard_core::{
    Authorization, ErrorCollector, OperationDescription, OperationsSecurityPolicy, ResourceType,
};
use opsguard_observability::{CounterRegistry, Label};

use crate::{Identity, PermissionEvaluator};

/// Code attached to every rejection recorded by [`DescriptionAuthorizer`].
pub const AUTHORIZATION_ERROR_CODE: &str = "authorization";

const SKIPPED_COUNTER: &str = "authorization.skipped";
const MISSING_APPLICATION_COUNTER: &str = "authorization.missingApplication";
const AUTHORIZATION_COUNTER: &str = "authorization";

/// Dimension value used when a skipped operation names no account. Empty, so it
/// cannot be confused with a real account name.
const NO_ACCOUNT: &str = "";

/// Outcome of a single evaluation. Created and discarded per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
    /// Account that was checked, if an account check was required.
    pub account: Option<String>,

    /// `true` if no account check was required or it passed.
    pub account_allowed: bool,

    /// Per-application results, in first-seen order.
    pub application_results: Vec<(String, bool)>,

    /// AND of every check performed.
    pub allowed: bool,
}

impl AuthorizationDecision {
    pub fn denied_applications(&self) -> impl Iterator<Item = &str> {
        self.application_results
            .iter()
            .filter(|(_, allowed)| !allowed)
            .map(|(application, _)| application.as_str())
    }
}

/// Decides whether an operation description may proceed for a caller.
///
/// Denials are never returned as errors: they are recorded in the supplied
/// [`ErrorCollector`], and the outcome is counted in the [`CounterRegistry`].
/// Without a permission evaluator every operation is implicitly authorized.
pub struct DescriptionAuthorizer {
    evaluator: Option<Arc<dyn PermissionEvaluator>>,
    registry: Arc<dyn CounterRegistry>,
}

impl DescriptionAuthorizer {
    pub fn new(
        evaluator: Option<Arc<dyn PermissionEvaluator>>,
        registry: Arc<dyn CounterRegistry>,
    ) -> Self {
        Self { evaluator, registry }
    }

    pub fn is_enabled(&self) -> bool {
        self.evaluator.is_some()
    }

    /// Authorize `description` on behalf of `identity`.
    ///
    /// Every offending account and application is reported; the caller should
    /// abort the operation if `errors` is non-empty afterwards.
    pub fn authorize(
        &self,
        description: Option<&dyn OperationDescription>,
        identity: Option<&Identity>,
        policy: &OperationsSecurityPolicy,
        errors: &mut dyn ErrorCollector,
    ) {
        let _ = self.evaluate(description, identity, policy, errors);
    }

    /// Same as [`Self::authorize`], also returning the decision.
    ///
    /// Returns `None` when no evaluation took place (no evaluator configured
    /// or no description supplied).
    pub fn evaluate(
        &self,
        description: Option<&dyn OperationDescription>,
        identity: Option<&Identity>,
        policy: &OperationsSecurityPolicy,
        errors: &mut dyn ErrorCollector,
    ) -> Option<AuthorizationDecision> {
        let (Some(evaluator), Some(description)) = (self.evaluator.as_deref(), description) else {
            return None;
        };

        let description_type = description.description_type();

        let mut account: Option<&str> = None;
        let mut requires_application_restriction = true;

        if let Some(nameable) = description.as_account_nameable() {
            requires_application_restriction = nameable.requires_application_restriction();

            let waived = policy.skips_authorization_for(description_type)
                || !nameable.requires_authorization(policy);

            if waived {
                self.count(
                    SKIPPED_COUNTER,
                    &[
                        ("descriptionClass", description_type.to_string()),
                        ("account", nameable.account().unwrap_or(NO_ACCOUNT).to_string()),
                    ],
                );
                info!(
                    description_type,
                    account = nameable.account(),
                    "skipping authorization for operation"
                );
            } else {
                account = nameable.account();
            }
        }

        let applications = collect_applications(description);

        let mut decision = AuthorizationDecision {
            account: account.map(str::to_string),
            account_allowed: true,
            application_results: Vec::with_capacity(applications.len()),
            allowed: true,
        };

        if let Some(account) = account {
            if !evaluator.has_permission(identity, account, ResourceType::Account, Authorization::Write) {
                decision.account_allowed = false;
                errors.reject(AUTHORIZATION_ERROR_CODE, format!("Access denied to account {account}"));
                debug!(description_type, account, "account access denied");
            }
        }

        if !applications.is_empty() {
            evaluator.preload_bulk_permissions(identity);

            // Every application is checked so the caller sees all offenders at once.
            for application in applications.iter().copied() {
                let allowed = evaluator.has_permission(
                    identity,
                    application,
                    ResourceType::Application,
                    Authorization::Write,
                );
                if !allowed {
                    errors.reject(
                        AUTHORIZATION_ERROR_CODE,
                        format!("Access denied to application {application}"),
                    );
                    debug!(description_type, application, "application access denied");
                }
                decision.application_results.push((application.to_string(), allowed));
            }
        }

        if requires_application_restriction && applications.is_empty() {
            if let Some(account) = account {
                self.count(
                    MISSING_APPLICATION_COUNTER,
                    &[
                        ("descriptionClass", description_type.to_string()),
                        ("account", account.to_string()),
                    ],
                );
                warn!(
                    description_type,
                    account, "no application(s) specified for operation with account restriction"
                );
            }
        }

        decision.allowed =
            decision.account_allowed && decision.application_results.iter().all(|(_, ok)| *ok);

        self.count(
            AUTHORIZATION_COUNTER,
            &[
                ("descriptionClass", description_type.to_string()),
                ("success", decision.allowed.to_string()),
            ],
        );

        Some(decision)
    }

    fn count(&self, name: &'static str, labels: &[Label]) {
        self.registry.increment(name, labels);
    }
}

/// Applications named by either capability, without `None` entries or
/// duplicates, in first-seen order.
fn collect_applications(description: &dyn OperationDescription) -> Vec<&str> {
    let named = description
        .as_application_nameable()
        .and_then(|nameable| nameable.applications());
    let owning = description
        .as_resources_nameable()
        .and_then(|nameable| nameable.resource_applications());

    let mut seen = HashSet::new();
    named
        .into_iter()
        .chain(owning)
        .flatten()
        .flatten()
        .map(String::as_str)
        .filter(|application| seen.insert(*application))
        .collect()
}
