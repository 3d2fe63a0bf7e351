use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles are closed: every authorization check matches on all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Collaborator,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Collaborator => "collaborator",
            Role::Assistant => "assistant",
        }
    }

    /// Roles that can hold assignments and show up in performance reports.
    pub fn is_assignable(&self) -> bool {
        match self {
            Role::Manager => false,
            Role::Collaborator | Role::Assistant => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Role::Manager),
            "collaborator" => Ok(Role::Collaborator),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role {:?}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub user_id: u32,
    pub user_name: String,
    pub user_role: Role,
    #[serde(default)]
    pub competence: Option<String>,
}

/// Trimmed view handed to pickers (assign / reassign dropdowns).
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UserSummary {
    pub user_id: u32,
    pub user_name: String,
    pub user_role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name.clone(),
            user_role: user.user_role,
        }
    }
}
