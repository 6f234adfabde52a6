//! Resource kinds and access levels understood by the permission backend.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kind of resource a permission is checked against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceType {
    Account,
    Application,
}

/// Access level requested on a resource.
///
/// Mutating operations always ask for [`Authorization::Write`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Authorization {
    Read,
    Write,
    Execute,
    Create,
}

macro_rules! impl_wire_name {
    ($t:ty, $name:literal, { $($variant:path => $wire:literal),+ $(,)? }) => {
        impl $t {
            /// Stable upper-case name used by permission backends.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $wire,)+
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($wire => Ok($variant),)+
                    other => Err(DomainError::validation(format!("{}: unknown value '{}'", $name, other))),
                }
            }
        }
    };
}

impl_wire_name!(ResourceType, "ResourceType", {
    ResourceType::Account => "ACCOUNT",
    ResourceType::Application => "APPLICATION",
});

impl_wire_name!(Authorization, "Authorization", {
    Authorization::Read => "READ",
    Authorization::Write => "WRITE",
    Authorization::Execute => "EXECUTE",
    Authorization::Create => "CREATE",
});
