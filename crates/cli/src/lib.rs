//! Wiring for the `opsguard` binary: builds an authorizer from configuration
//! and evaluates operation documents against it.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use opsguard_auth::{
    AuthorizationDecision, DescriptionAuthorizer, Identity, PermissionEvaluator,
    StaticPermissionEvaluator,
};
use opsguard_config::AppConfig;
use opsguard_core::{Errors, OperationDocument, Rejection};
use opsguard_observability::CounterRegistry;

/// Result of checking one operation document.
#[derive(Debug)]
pub struct CheckOutcome {
    pub rejections: Vec<Rejection>,
    /// `None` when authorization is disabled.
    pub decision: Option<AuthorizationDecision>,
}

impl CheckOutcome {
    pub fn is_allowed(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// Read a JSON grant table from disk.
pub fn load_grants(path: &Path) -> Result<StaticPermissionEvaluator> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading grant table {}", path.display()))?;
    StaticPermissionEvaluator::from_json(&json)
        .with_context(|| format!("parsing grant table {}", path.display()))
}

/// Build the authorizer described by `config`.
///
/// When authorization is disabled no evaluator is wired and every operation
/// passes. When enabled without grants, nothing is granted.
pub fn build_authorizer(
    config: &AppConfig,
    grants: Option<StaticPermissionEvaluator>,
    registry: Arc<dyn CounterRegistry>,
) -> DescriptionAuthorizer {
    if !config.authorization.enabled {
        tracing::warn!("authorization disabled; all operations are implicitly authorized");
        return DescriptionAuthorizer::new(None, registry);
    }

    let evaluator = grants.unwrap_or_else(|| {
        tracing::warn!("no grant table configured; every permission check will be denied");
        StaticPermissionEvaluator::new()
    });

    DescriptionAuthorizer::new(Some(Arc::new(evaluator) as Arc<dyn PermissionEvaluator>), registry)
}

/// Evaluate a JSON operation document on behalf of `principal` (anonymous if `None`).
pub fn check(
    authorizer: &DescriptionAuthorizer,
    config: &AppConfig,
    operation_json: &str,
    principal: Option<&str>,
) -> Result<CheckOutcome> {
    let document = OperationDocument::from_json(operation_json).context("parsing operation document")?;
    let identity = principal.map_or_else(Identity::anonymous, Identity::new);

    let mut errors = Errors::new();
    let decision = authorizer.evaluate(Some(&document), Some(&identity), &config.security, &mut errors);

    Ok(CheckOutcome {
        rejections: errors.rejections().to_vec(),
        decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsguard_observability::InMemoryRegistry;

    const GRANTS: &str = r#"{ "principals": { "alice": { "accounts": { "prod": ["WRITE"] }, "applications": { "checkout": ["WRITE"] } } } }"#;
    const DEPLOY: &str = r#"{ "type": "DeployServerGroup", "account": "prod", "applications": ["checkout", "payments"] }"#;

    fn grants() -> Option<StaticPermissionEvaluator> {
        Some(StaticPermissionEvaluator::from_json(GRANTS).unwrap())
    }

    #[test]
    fn check_reports_denied_applications() {
        let config = AppConfig::default();
        let authorizer = build_authorizer(&config, grants(), Arc::new(InMemoryRegistry::new()));

        let outcome = check(&authorizer, &config, DEPLOY, Some("alice")).unwrap();

        assert!(!outcome.is_allowed());
        assert_eq!(outcome.rejections.len(), 1);
        assert_eq!(outcome.rejections[0].message, "Access denied to application payments");
        assert!(!outcome.decision.unwrap().allowed);
    }

    #[test]
    fn anonymous_caller_is_denied_everything() {
        let config = AppConfig::default();
        let authorizer = build_authorizer(&config, grants(), Arc::new(InMemoryRegistry::new()));

        let outcome = check(&authorizer, &config, DEPLOY, None).unwrap();

        assert_eq!(outcome.rejections.len(), 3);
    }

    #[test]
    fn disabled_authorization_allows_everything() {
        let mut config = AppConfig::default();
        config.authorization.enabled = false;
        let registry = Arc::new(InMemoryRegistry::new());
        let authorizer = build_authorizer(&config, grants(), registry.clone());

        let outcome = check(&authorizer, &config, DEPLOY, None).unwrap();

        assert!(outcome.is_allowed());
        assert!(outcome.decision.is_none());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn configured_policy_is_applied() {
        let mut config = AppConfig::default();
        config.security.skip_authorization_for = vec!["Cleanup".to_string()];
        let registry = Arc::new(InMemoryRegistry::new());
        let authorizer = build_authorizer(&config, None, registry.clone());

        let outcome = check(&authorizer, &config, r#"{ "type": "Cleanup", "account": "prod" }"#, Some("alice")).unwrap();

        assert!(outcome.is_allowed());
        assert_eq!(registry.total("authorization.skipped"), 1);
    }

    #[test]
    fn malformed_document_is_an_error() {
        let config = AppConfig::default();
        let authorizer = build_authorizer(&config, None, Arc::new(InMemoryRegistry::new()));

        assert!(check(&authorizer, &config, "not json", None).is_err());
    }
}
