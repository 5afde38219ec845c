//! Login sessions: opaque token → user id

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::user::UserId;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "flangio_session";

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, UserId>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `user_id` and return its token
    pub fn create(&self, user_id: UserId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.write().insert(token.clone(), user_id);
        token
    }

    pub fn user_id(&self, token: &str) -> Option<UserId> {
        self.sessions.read().get(token).copied()
    }

    /// Close the session; unknown tokens are ignored
    pub fn destroy(&self, token: &str) {
        self.sessions.write().remove(token);
    }

    /// Close every session belonging to `user_id`
    pub fn destroy_for_user(&self, user_id: UserId) {
        self.sessions.write().retain(|_, owner| *owner != user_id);
    }
}
