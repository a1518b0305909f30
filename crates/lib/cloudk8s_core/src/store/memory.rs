//! In-process credential store.

use std::sync::RwLock;

use async_trait::async_trait;

use super::{CredentialStore, StoreError, login_matches};
use crate::models::auth::StoredUser;

/// Holds users in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<StoredUser>>,
}

impl MemoryStore {
    pub fn with_users(users: impl IntoIterator<Item = StoredUser>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
        }
    }

    /// Marks the user inactive. Returns false if the id is unknown.
    pub fn deactivate(&self, id: i64) -> bool {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = false;
                true
            }
            None => false,
        }
    }

    fn find(&self, login: &str) -> Option<StoredUser> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users
            .iter()
            .filter(|u| u.is_active && login_matches(&u.login, login))
            .min_by_key(|u| u.id)
            .cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, login: &str) -> Result<Option<StoredUser>, StoreError> {
        Ok(self.find(login))
    }

    async fn exists(&self, login: &str) -> Result<bool, StoreError> {
        Ok(self.find(login).is_some())
    }
}
