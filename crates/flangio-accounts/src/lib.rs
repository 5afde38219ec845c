//! Accounts for the flangio console
//!
//! Users with salted password hashes and capability tokens, login sessions,
//! and the social graph linking accounts. All stores are in-process and
//! guarded by `parking_lot` locks that are never held across an await.

pub mod password;
pub mod session;
pub mod social;
pub mod store;
pub mod user;

pub use password::{constant_time_eq, hash_password, verify_password};
pub use session::{SessionStore, SESSION_COOKIE};
pub use social::{SocialGraph, SocialGraphEdge};
pub use store::{AccountStore, INACTIVE_ACCOUNT_MESSAGE, INVALID_CREDENTIALS_MESSAGE};
pub use user::{
    NewUser, ProfileUpdate, User, UserId, UserSummary, ALL_CAPABILITIES, CREATE_OTHER_USERS,
    DELETE_OTHER_USERS,
};
