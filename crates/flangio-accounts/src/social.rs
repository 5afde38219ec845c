//! Social graph between accounts
//!
//! An edge `grantor → grantee` means the grantor shares with the grantee.
//! Edges are unique per ordered pair.

use chrono::{DateTime, Utc};
use flangio_common::{FlangioError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::user::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialGraphEdge {
    pub grantor: UserId,
    pub grantee: UserId,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SocialGraph {
    edges: RwLock<Vec<SocialGraphEdge>>,
}

impl SocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge; an existing (grantor, grantee) pair is rejected
    pub fn connect(&self, grantor: UserId, grantee: UserId) -> Result<SocialGraphEdge> {
        let mut edges = self.edges.write();
        if edges.iter().any(|e| e.grantor == grantor && e.grantee == grantee) {
            return Err(FlangioError::Validation(format!(
                "User {} already shares with user {}.",
                grantor, grantee
            )));
        }
        let edge = SocialGraphEdge {
            grantor,
            grantee,
            created: Utc::now(),
        };
        edges.push(edge.clone());
        debug!(grantor, grantee, "social graph edge added");
        Ok(edge)
    }

    pub fn contains(&self, grantor: UserId, grantee: UserId) -> bool {
        self.edges
            .read()
            .iter()
            .any(|e| e.grantor == grantor && e.grantee == grantee)
    }

    /// Users `grantor` shares with
    pub fn grantees_of(&self, grantor: UserId) -> Vec<UserId> {
        self.edges
            .read()
            .iter()
            .filter(|e| e.grantor == grantor)
            .map(|e| e.grantee)
            .collect()
    }

    /// Drop every edge touching `user`
    pub fn remove_user(&self, user: UserId) {
        self.edges
            .write()
            .retain(|e| e.grantor != user && e.grantee != user);
    }

    pub fn len(&self) -> usize {
        self.edges.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.read().is_empty()
    }
}
