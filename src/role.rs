use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's role on the platform.
///
/// Role names that are not provisioned yet are kept as `Unprovisioned` so a
/// user record referencing them still parses; they resolve to deny-all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Driver,
    Dispatcher,
    Broker,
    Manager,
    Admin,
    Instructor,
    Unprovisioned(String),
}

impl Role {
    /// Every provisioned role.
    pub const PROVISIONED: [Role; 6] = [
        Role::Driver,
        Role::Dispatcher,
        Role::Broker,
        Role::Manager,
        Role::Admin,
        Role::Instructor,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Role::Driver => "driver",
            Role::Dispatcher => "dispatcher",
            Role::Broker => "broker",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Unprovisioned(name) => name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_provisioned(&self) -> bool {
        !matches!(self, Role::Unprovisioned(_))
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(input: &str) -> Result<Role, Self::Err> {
        Ok(match input.to_lowercase().as_str() {
            "driver" => Role::Driver,
            "dispatcher" => Role::Dispatcher,
            "broker" => Role::Broker,
            "manager" => Role::Manager,
            "admin" => Role::Admin,
            "instructor" => Role::Instructor,
            _ => Role::Unprovisioned(input.to_string()),
        })
    }
}

impl From<String> for Role {
    fn from(input: String) -> Self {
        match input.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
