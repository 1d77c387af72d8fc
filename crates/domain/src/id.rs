//! Typed record and run identifiers.
//!
//! Every id wraps a v4 UUID and travels as its hyphenated string, in JSON
//! and in the database alike. Distinct types keep a `ClientId` from being
//! passed where a `ProjectId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// A fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Identity of an [`AutomationRule`](crate::rule::AutomationRule).
    RuleId
);

define_id!(
    /// Identity of an authenticated user; also the owner of rules and records.
    UserId
);

define_id!(
    /// Identity of a [`Client`](crate::record::Client).
    ClientId
);

define_id!(
    /// Identity of a [`Meeting`](crate::record::Meeting).
    MeetingId
);

define_id!(
    /// Identity of a [`Project`](crate::record::Project).
    ProjectId
);

define_id!(
    /// Traceability tag of one orchestration run. Never used as entity identity.
    ExecutionId
);
