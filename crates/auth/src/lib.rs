//! `opsguard-auth` — authorization of in-flight mutating operations.
//!
//! This crate is intentionally decoupled from transport and storage: the
//! caller supplies the identity, the permission backend and the counter
//! registry explicitly.

pub mod authorize;
pub mod permissions;
pub mod principal;

pub use authorize::{AUTHORIZATION_ERROR_CODE, AuthorizationDecision, DescriptionAuthorizer};
pub use permissions::{GrantError, Grants, PermissionEvaluator, StaticPermissionEvaluator};
pub use principal::Identity;

pub use opsguard_core::{Authorization, OperationsSecurityPolicy, ResourceType};
