//! User accounts and capability tokens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Capability required to create users through the API
pub const CREATE_OTHER_USERS: &str = "create-other-users";

/// Capability required to delete users through the API
pub const DELETE_OTHER_USERS: &str = "delete-other-users";

/// Every capability the console checks
pub const ALL_CAPABILITIES: [&str; 2] = [CREATE_OTHER_USERS, DELETE_OTHER_USERS];

pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub permissions: BTreeSet<String>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.permissions.contains(capability)
    }

    /// Public view returned by the account API
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Validated input for a new account; the password is still in clear text
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Profile fields a user may change on their own account
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
