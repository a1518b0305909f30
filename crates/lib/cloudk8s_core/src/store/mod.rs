//! Credential store: where non-administrator identities come from.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::StoredUser;

pub use memory::MemoryStore;
pub use postgres::PgEmployeeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("credential store schema is not usable: {0}")]
    Schema(String),
}

/// Lookup of active users by login.
///
/// A login matches a stored login case-insensitively, either exactly or as
/// the account part of a `DOMAIN\login` value.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the active user for `login`, if any.
    async fn get(&self, login: &str) -> Result<Option<StoredUser>, StoreError>;

    /// True only if an active user with `login` exists.
    async fn exists(&self, login: &str) -> Result<bool, StoreError>;
}

/// Case-insensitive match of `login` against a stored `DOMAIN\login` or `login`.
pub fn login_matches(stored: &str, login: &str) -> bool {
    if login.is_empty() {
        return false;
    }
    let stored = stored.to_lowercase();
    let login = login.to_lowercase();
    stored == login || stored.ends_with(&format!("\\{login}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_matching_rules() {
        assert!(login_matches("jdoe", "JDoe"));
        assert!(login_matches("CORP\\jdoe", "jdoe"));
        assert!(login_matches("corp\\JDOE", "jdoe"));
        assert!(!login_matches("CORP\\xjdoe", "jdoe"));
        assert!(!login_matches("CORP\\jdoe", "doe"));
        assert!(!login_matches("jdoe", ""));
    }
}
