//! Identifier newtypes.
//!
//! Everything that references another entity does so through one of these,
//! never through a direct reference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifies a team member (and that member's individual checklist).
    MemberId
);
string_id!(
    /// Identifies a work order.
    WorkId
);
string_id!(
    /// Identifies a project point within a work.
    PointId
);
string_id!(
    /// Identifies a network extension within a work.
    ExtensionId
);

impl PointId {
    /// A fresh identifier for a point created in the field.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("pt-{}", Uuid::new_v4().simple()))
    }
}

/// Addresses one checklist in a session.
///
/// The literal `apr` selects the shared pre-shift checklist; anything else
/// names the team member whose individual checklist is meant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChecklistRef {
    Apr,
    Member(MemberId),
}

impl ChecklistRef {
    pub const APR: &'static str = "apr";
}

impl FromStr for ChecklistRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == Self::APR {
            Self::Apr
        } else {
            Self::Member(MemberId::new(s))
        })
    }
}

impl fmt::Display for ChecklistRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apr => f.write_str(Self::APR),
            Self::Member(id) => write!(f, "{id}"),
        }
    }
}
