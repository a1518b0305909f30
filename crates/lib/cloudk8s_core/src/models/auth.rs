//! Authentication domain models.
//!
//! `UserIdentity` is what an authenticator produces and what a token carries;
//! `TokenClaims` is the full JWT payload; `StoredUser` is a credential-store row.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Group every administrator belongs to.
pub const GLOBAL_ADMIN_GROUP: i64 = 1;
/// Group every authenticated store user belongs to.
pub const AUTHENTICATED_GROUP: i64 = 0;

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub login: String,
    pub is_admin: bool,
    #[serde(default)]
    pub groups: BTreeSet<i64>,
}

impl UserIdentity {
    pub fn is_member_of(&self, group: i64) -> bool {
        self.groups.contains(&group)
    }
}

/// JWT payload: registered claims plus the embedded identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Unique token id.
    pub jti: String,
    /// Issuer.
    pub iss: String,
    /// Subject, the application the token was issued for.
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Not before (unix timestamp).
    pub nbf: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    pub user: UserIdentity,
}

/// A row of the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
}

impl StoredUser {
    /// "Last, First", or whichever of the two is set.
    pub fn display_name(&self) -> String {
        match (self.last_name.trim(), self.first_name.trim()) {
            ("", first) => first.to_string(),
            (last, "") => last.to_string(),
            (last, first) => format!("{last}, {first}"),
        }
    }
}
