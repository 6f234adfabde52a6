//! Drives the authorizer through its public API from several threads sharing
//! one counter registry.

use std::sync::Arc;
use std::thread;

use opsguard_auth::{
    Authorization, DescriptionAuthorizer, Identity, OperationsSecurityPolicy, ResourceType,
    StaticPermissionEvaluator,
};
use opsguard_core::{Errors, OperationDocument};
use opsguard_observability::InMemoryRegistry;

fn authorizer(registry: Arc<InMemoryRegistry>) -> DescriptionAuthorizer {
    let evaluator = StaticPermissionEvaluator::new()
        .grant("alice", ResourceType::Account, "prod", Authorization::Write)
        .grant("alice", ResourceType::Application, "checkout", Authorization::Write)
        .grant("bob", ResourceType::Account, "*", Authorization::Write);

    DescriptionAuthorizer::new(Some(Arc::new(evaluator)), registry)
}

#[test]
fn concurrent_evaluations_keep_independent_results_and_exact_counts() {
    let registry = Arc::new(InMemoryRegistry::new());
    let authorizer = Arc::new(authorizer(registry.clone()));
    let document = Arc::new(
        OperationDocument::from_json(
            r#"{ "type": "DeployServerGroup", "account": "prod", "applications": ["checkout"] }"#,
        )
        .unwrap(),
    );

    let handles: Vec<_> = ["alice", "bob"]
        .into_iter()
        .flat_map(|principal| std::iter::repeat(principal).take(4))
        .map(|principal| {
            let authorizer = Arc::clone(&authorizer);
            let document = Arc::clone(&document);
            thread::spawn(move || {
                let identity = Identity::new(principal);
                let policy = OperationsSecurityPolicy::default();
                let mut messages = Vec::new();
                for _ in 0..50 {
                    let mut errors = Errors::new();
                    authorizer.authorize(Some(&*document), Some(&identity), &policy, &mut errors);
                    messages.push(errors.messages().map(str::to_string).collect::<Vec<_>>());
                }
                (principal, messages)
            })
        })
        .collect();

    for handle in handles {
        let (principal, messages) = handle.join().unwrap();
        let expected: Vec<String> = match principal {
            "alice" => vec![],
            _ => vec!["Access denied to application checkout".to_string()],
        };
        assert!(messages.iter().all(|m| *m == expected), "unexpected rejections for {principal}");
    }

    let tags = |success: &'static str| [("descriptionClass", "DeployServerGroup"), ("success", success)];
    assert_eq!(registry.count("authorization", &tags("true")), 200);
    assert_eq!(registry.count("authorization", &tags("false")), 200);
    assert_eq!(registry.total("authorization.missingApplication"), 0);
}

#[test]
fn disabled_authorizer_never_counts() {
    let registry = Arc::new(InMemoryRegistry::new());
    let authorizer = DescriptionAuthorizer::new(None, registry.clone());
    let document = OperationDocument::from_json(r#"{ "type": "Op", "account": "prod" }"#).unwrap();

    let mut errors = Errors::new();
    authorizer.authorize(Some(&document), None, &OperationsSecurityPolicy::default(), &mut errors);

    assert!(errors.is_empty());
    assert!(registry.snapshot().is_empty());
}
