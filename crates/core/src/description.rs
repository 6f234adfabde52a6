//! Operation descriptions as seen by the authorizer.
//!
//! A description may be account-scoped, application-scoped and/or
//! resource-set-scoped, in any combination. Each facet is declared by the
//! description type itself through the `as_*` accessors on
//! [`OperationDescription`]; nothing is discovered by inspecting the
//! concrete type.

use crate::OperationsSecurityPolicy;

/// A description that targets a single account.
pub trait AccountNameable {
    /// Account the operation mutates. `None` means there is no account to check.
    fn account(&self) -> Option<&str>;

    /// Whether an account-scoped operation is expected to name its application(s).
    fn requires_application_restriction(&self) -> bool {
        true
    }

    /// Whether this operation must be authorized at all under `policy`.
    fn requires_authorization(&self, _policy: &OperationsSecurityPolicy) -> bool {
        true
    }
}

/// A description that names the application(s) it affects.
///
/// `None` entries are permitted and ignored by the authorizer.
pub trait ApplicationNameable {
    fn applications(&self) -> Option<&[Option<String>]>;
}

/// A description that operates on existing resources, each owned by an application.
///
/// `None` entries are permitted and ignored by the authorizer.
pub trait ResourcesNameable {
    fn resource_applications(&self) -> Option<&[Option<String>]>;
}

/// An in-flight mutating operation.
///
/// Implement the capability traits that apply and return `Some(self)` from the
/// matching accessor:
///
/// ```
/// use opsguard_core::{AccountNameable, OperationDescription};
///
/// struct ResizeServerGroup {
///     account: String,
/// }
///
/// impl AccountNameable for ResizeServerGroup {
///     fn account(&self) -> Option<&str> {
///         Some(&self.account)
///     }
/// }
///
/// impl OperationDescription for ResizeServerGroup {
///     fn description_type(&self) -> &str {
///         "ResizeServerGroup"
///     }
///
///     fn as_account_nameable(&self) -> Option<&dyn AccountNameable> {
///         Some(self)
///     }
/// }
/// ```
pub trait OperationDescription {
    /// Short type name, used as the `descriptionClass` metric dimension.
    fn description_type(&self) -> &str;

    fn as_account_nameable(&self) -> Option<&dyn AccountNameable> {
        None
    }

    fn as_application_nameable(&self) -> Option<&dyn ApplicationNameable> {
        None
    }

    fn as_resources_nameable(&self) -> Option<&dyn ResourcesNameable> {
        None
    }
}
