//! In-process account store

use chrono::Utc;
use flangio_common::{FlangioError, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::password::{hash_password, verify_password};
use crate::user::{NewUser, ProfileUpdate, User, UserId, ALL_CAPABILITIES};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";
pub const INACTIVE_ACCOUNT_MESSAGE: &str = "Your account is inactive so you may not log in.";

#[derive(Debug, Default)]
struct Accounts {
    next_id: UserId,
    users: BTreeMap<UserId, User>,
}

impl Accounts {
    fn by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    fn by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }
}

/// Users keyed by id, unique on email (case-insensitive) and username
#[derive(Debug, Default)]
pub struct AccountStore {
    inner: RwLock<Accounts>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an active account without capabilities
    pub fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.insert(new_user, BTreeSet::new())
    }

    /// Create an active account holding every capability
    pub fn create_admin(&self, new_user: NewUser) -> Result<User> {
        let permissions = ALL_CAPABILITIES.iter().map(|c| c.to_string()).collect();
        self.insert(new_user, permissions)
    }

    /// Create the configured administrator unless the email is taken
    pub fn bootstrap_admin(&self, email: &str, password: &str) -> Result<Option<User>> {
        if self.find_by_email(email).is_some() {
            debug!(email, "bootstrap administrator already present");
            return Ok(None);
        }
        let username = email.split('@').next().unwrap_or(email).to_string();
        let admin = self.create_admin(NewUser {
            username,
            email: email.to_string(),
            password: password.to_string(),
            ..NewUser::default()
        })?;
        info!(username = %admin.username, "bootstrap administrator created");
        Ok(Some(admin))
    }

    fn insert(&self, new_user: NewUser, permissions: BTreeSet<String>) -> Result<User> {
        let mut accounts = self.inner.write();
        if accounts.by_email(&new_user.email).is_some() {
            return Err(FlangioError::Validation(format!(
                "A user with email {} already exists.",
                new_user.email
            )));
        }
        if accounts.by_username(&new_user.username).is_some() {
            return Err(FlangioError::Validation(format!(
                "A user with username {} already exists.",
                new_user.username
            )));
        }

        accounts.next_id += 1;
        let user = User {
            id: accounts.next_id,
            username: new_user.username,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            password_hash: hash_password(&new_user.password),
            is_active: true,
            permissions,
            date_joined: Utc::now(),
        };
        accounts.users.insert(user.id, user.clone());
        info!(id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.inner.read().users.get(&id).cloned()
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.inner.read().by_email(email).cloned()
    }

    /// Look a user up by username, falling back to email
    pub fn find_by_login(&self, login: &str) -> Option<User> {
        let accounts = self.inner.read();
        accounts
            .by_username(login)
            .or_else(|| accounts.by_email(login))
            .cloned()
    }

    /// Check credentials. Unknown users and wrong passwords share one error.
    pub fn authenticate(&self, login: &str, password: &str) -> Result<User> {
        let user = self
            .find_by_login(login)
            .filter(|u| verify_password(password, &u.password_hash))
            .ok_or_else(|| FlangioError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()))?;
        if !user.is_active {
            return Err(FlangioError::Forbidden(INACTIVE_ACCOUNT_MESSAGE.to_string()));
        }
        Ok(user)
    }

    pub fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User> {
        let mut accounts = self.inner.write();
        if accounts
            .by_email(&update.email)
            .is_some_and(|other| other.id != id)
        {
            return Err(FlangioError::Validation(format!(
                "A user with email {} already exists.",
                update.email
            )));
        }
        let user = accounts
            .users
            .get_mut(&id)
            .ok_or_else(|| FlangioError::NotFound(format!("User {} does not exist.", id)))?;
        user.email = update.email;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        debug!(id, "profile updated");
        Ok(user.clone())
    }

    pub fn set_password(&self, id: UserId, password: &str) -> Result<()> {
        let mut accounts = self.inner.write();
        let user = accounts
            .users
            .get_mut(&id)
            .ok_or_else(|| FlangioError::NotFound(format!("User {} does not exist.", id)))?;
        user.password_hash = hash_password(password);
        info!(id, "password changed");
        Ok(())
    }

    pub fn set_active(&self, id: UserId, active: bool) -> Result<()> {
        let mut accounts = self.inner.write();
        let user = accounts
            .users
            .get_mut(&id)
            .ok_or_else(|| FlangioError::NotFound(format!("User {} does not exist.", id)))?;
        user.is_active = active;
        Ok(())
    }

    pub fn grant(&self, id: UserId, capability: &str) -> Result<()> {
        let mut accounts = self.inner.write();
        let user = accounts
            .users
            .get_mut(&id)
            .ok_or_else(|| FlangioError::NotFound(format!("User {} does not exist.", id)))?;
        user.permissions.insert(capability.to_string());
        Ok(())
    }

    /// Remove the account registered under `email`
    pub fn delete_by_email(&self, email: &str) -> Result<User> {
        let mut accounts = self.inner.write();
        let id = accounts
            .by_email(email)
            .map(|u| u.id)
            .ok_or_else(|| FlangioError::NotFound(format!("User {} does not exist.", email)))?;
        let removed = accounts
            .users
            .remove(&id)
            .ok_or_else(|| FlangioError::Internal(format!("user {} vanished during delete", id)))?;
        info!(id, email, "user deleted");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{CREATE_OTHER_USERS, DELETE_OTHER_USERS};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_create_and_authenticate() {
        let store = AccountStore::new();
        let user = store.create_user(new_user("alice", "alice@example.com")).unwrap();
        assert!(user.is_active);
        assert!(user.permissions.is_empty());

        assert_eq!(store.authenticate("alice", "secret").unwrap().id, user.id);
        assert_eq!(store.authenticate("ALICE@example.com", "secret").unwrap().id, user.id);
    }

    #[test]
    fn test_bad_credentials_share_message() {
        let store = AccountStore::new();
        store.create_user(new_user("alice", "alice@example.com")).unwrap();

        let wrong = store.authenticate("alice", "nope").unwrap_err();
        let unknown = store.authenticate("bob", "secret").unwrap_err();
        assert_eq!(wrong.to_string(), INVALID_CREDENTIALS_MESSAGE);
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS_MESSAGE);
        assert_eq!(wrong.status_code(), 401);
    }

    #[test]
    fn test_inactive_cannot_log_in() {
        let store = AccountStore::new();
        let user = store.create_user(new_user("alice", "alice@example.com")).unwrap();
        store.set_active(user.id, false).unwrap();
        let err = store.authenticate("alice", "secret").unwrap_err();
        assert_eq!(err.to_string(), INACTIVE_ACCOUNT_MESSAGE);
    }

    #[test]
    fn test_unique_email_and_username() {
        let store = AccountStore::new();
        store.create_user(new_user("alice", "alice@example.com")).unwrap();
        assert!(store.create_user(new_user("alice2", "Alice@Example.com")).is_err());
        assert!(store.create_user(new_user("alice", "other@example.com")).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_profile_and_password() {
        let store = AccountStore::new();
        let alice = store.create_user(new_user("alice", "alice@example.com")).unwrap();
        store.create_user(new_user("bob", "bob@example.com")).unwrap();

        let taken = ProfileUpdate {
            email: "bob@example.com".to_string(),
            ..ProfileUpdate::default()
        };
        assert!(store.update_profile(alice.id, taken).is_err());

        let updated = store
            .update_profile(
                alice.id,
                ProfileUpdate {
                    email: "alice@new.example.com".to_string(),
                    first_name: "Alice".to_string(),
                    last_name: "Liddell".to_string(),
                },
            )
            .unwrap();
        assert_eq!(updated.first_name, "Alice");

        store.set_password(alice.id, "changed").unwrap();
        assert!(store.authenticate("alice", "secret").is_err());
        assert!(store.authenticate("alice@new.example.com", "changed").is_ok());
    }

    #[test]
    fn test_delete_by_email() {
        let store = AccountStore::new();
        store.create_user(new_user("alice", "alice@example.com")).unwrap();
        store.delete_by_email("alice@example.com").unwrap();
        assert!(store.is_empty());

        let err = store.delete_by_email("alice@example.com").unwrap_err();
        assert_eq!(err.to_string(), "User alice@example.com does not exist.");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_bootstrap_admin_once() {
        let store = AccountStore::new();
        let admin = store
            .bootstrap_admin("root@example.com", "pw")
            .unwrap()
            .unwrap();
        assert_eq!(admin.username, "root");
        assert!(admin.has_capability(CREATE_OTHER_USERS));
        assert!(admin.has_capability(DELETE_OTHER_USERS));
        assert!(store.bootstrap_admin("root@example.com", "pw").unwrap().is_none());
    }

    #[test]
    fn test_grant_capability() {
        let store = AccountStore::new();
        let user = store.create_user(new_user("alice", "alice@example.com")).unwrap();
        store.grant(user.id, CREATE_OTHER_USERS).unwrap();
        assert!(store.get(user.id).unwrap().has_capability(CREATE_OTHER_USERS));
    }
}
