//! `opsguard-core` — domain foundation for operation authorization.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! what an operation description looks like to the authorizer, what kinds of
//! resources it may target, and where rejections are collected.

pub mod collector;
pub mod description;
pub mod error;
pub mod operations;
pub mod policy;
pub mod resource;

pub use collector::{ErrorCollector, Errors, Rejection};
pub use description::{AccountNameable, ApplicationNameable, OperationDescription, ResourcesNameable};
pub use error::{DomainError, DomainResult};
pub use operations::{
    OperationDocument, TerminateInstancesDescription, UpsertImageTagsDescription,
    UpsertSecurityGroupDescription,
};
pub use policy::OperationsSecurityPolicy;
pub use resource::{Authorization, ResourceType};
