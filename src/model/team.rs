//! Crew types: who is on the team and what they drive.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::MemberId;

/// The logged-in user. Always a member of the available roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
}

/// A person who can be put on a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,

    /// National identity document number, used for roster search.
    pub document: String,

    pub role: Role,
}

impl TeamMember {
    /// The first whitespace-separated word of the member's name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

/// Closed set of crew roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Leads the crew. Exactly one per team.
    Foreman,
    Lineworker,
    Driver,
    Helper,
    /// Lineworker qualified for energized (live-line) work.
    LiveLineLineworker,
}

impl Role {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Foreman => "Foreman",
            Self::Lineworker => "Lineworker",
            Self::Driver => "Driver",
            Self::Helper => "Helper",
            Self::LiveLineLineworker => "Live-line lineworker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A crew vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub plate: String,
    pub model: String,
}
