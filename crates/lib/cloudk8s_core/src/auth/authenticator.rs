//! Authenticators: turn a login and a password hash into a [`UserIdentity`].
//!
//! [`AdminAuthenticator`] knows only the configured administrator.
//! [`StoreAuthenticator`] additionally accepts any active user of a
//! [`CredentialStore`].

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::AuthError;
use super::password::{hash_password, secure_compare};
use super::validation::{validate_login, validate_password_hash};
use crate::config::AdminConfig;
use crate::models::auth::{AUTHENTICATED_GROUP, GLOBAL_ADMIN_GROUP, UserIdentity};
use crate::store::CredentialStore;

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// True when `password_hash` proves `login`. Never errors: failures are
    /// logged and reported as `false`.
    async fn authenticate_user(&self, login: &str, password_hash: &str) -> bool;

    /// Identity of an already authenticated login.
    async fn user_info_from_login(&self, login: &str) -> Result<UserIdentity, AuthError>;
}

/// The configured administrator, with the password kept only as its digest.
#[derive(Clone)]
pub struct AdminAccount {
    pub user_id: i64,
    pub external_id: i64,
    pub login: String,
    pub email: String,
    password_hash: String,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("user_id", &self.user_id)
            .field("external_id", &self.external_id)
            .field("login", &self.login)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AdminAccount {
    pub fn new(user_id: i64, external_id: i64, login: &str, email: &str, password: &str) -> Self {
        Self {
            user_id,
            external_id,
            login: login.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(
            config.user_id,
            config.external_id,
            &config.login,
            &config.email,
            &config.password,
        )
    }

    pub fn is_admin_login(&self, login: &str) -> bool {
        login == self.login
    }

    /// Constant-time check of the supplied digest; hex case is ignored.
    pub fn verify(&self, login: &str, password_hash: &str) -> bool {
        let supplied = password_hash.to_ascii_lowercase();
        let hash_ok = secure_compare(&supplied, &self.password_hash);
        self.is_admin_login(login) && hash_ok
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            user_id: self.user_id,
            external_id: Some(self.external_id),
            name: format!("Administrator {}", self.login),
            email: self.email.clone(),
            login: self.login.clone(),
            is_admin: true,
            groups: BTreeSet::from([GLOBAL_ADMIN_GROUP]),
        }
    }
}

/// Accepts only the configured administrator.
#[derive(Debug, Clone)]
pub struct AdminAuthenticator {
    admin: AdminAccount,
}

impl AdminAuthenticator {
    pub fn new(admin: AdminAccount) -> Self {
        info!(admin_login = %admin.login, "admin authenticator created");
        Self { admin }
    }
}

#[async_trait]
impl Authenticator for AdminAuthenticator {
    async fn authenticate_user(&self, login: &str, password_hash: &str) -> bool {
        info!(login, "authenticate user");
        if self.admin.verify(login, password_hash) {
            return true;
        }
        info!(login, "user was not authenticated");
        false
    }

    async fn user_info_from_login(&self, login: &str) -> Result<UserIdentity, AuthError> {
        if !self.admin.is_admin_login(login) {
            return Err(AuthError::UserNotFound(login.to_string()));
        }
        Ok(self.admin.identity())
    }
}

/// Accepts the administrator and every active user of the store.
///
/// Store users are trusted on existence alone: the upstream proxy has already
/// authenticated them, and the store holds no password material.
pub struct StoreAuthenticator {
    admin: AdminAccount,
    store: Arc<dyn CredentialStore>,
    admin_ids: BTreeSet<i64>,
}

impl StoreAuthenticator {
    /// `admin_ids` lists store user ids granted administrator rights.
    pub fn new(
        admin: AdminAccount,
        store: Arc<dyn CredentialStore>,
        admin_ids: BTreeSet<i64>,
    ) -> Self {
        info!(
            admin_login = %admin.login,
            admin_ids = ?admin_ids,
            "store authenticator created"
        );
        Self {
            admin,
            store,
            admin_ids,
        }
    }
}

#[async_trait]
impl Authenticator for StoreAuthenticator {
    async fn authenticate_user(&self, login: &str, password_hash: &str) -> bool {
        info!(login, "authenticate user");
        if let Err(e) = validate_login(login) {
            warn!(login, error = %e, "invalid user login");
            return false;
        }
        if let Err(e) = validate_password_hash(password_hash) {
            warn!(login, error = %e, "invalid password hash");
            return false;
        }
        // The admin login never falls through to the store.
        if self.admin.is_admin_login(login) {
            let ok = self.admin.verify(login, password_hash);
            if !ok {
                warn!(login, "admin password hash mismatch");
            }
            return ok;
        }
        match self.store.exists(login).await {
            Ok(true) => true,
            Ok(false) => {
                warn!(login, "user will not be authenticated");
                false
            }
            Err(e) => {
                warn!(login, error = %e, "credential store lookup failed");
                false
            }
        }
    }

    async fn user_info_from_login(&self, login: &str) -> Result<UserIdentity, AuthError> {
        if self.admin.is_admin_login(login) {
            return Ok(self.admin.identity());
        }
        let user = self
            .store
            .get(login)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(login.to_string()))?;

        let is_admin = self.admin_ids.contains(&user.id);
        let mut groups = BTreeSet::from([AUTHENTICATED_GROUP]);
        if is_admin {
            groups.insert(GLOBAL_ADMIN_GROUP);
        }
        Ok(UserIdentity {
            user_id: user.id,
            external_id: Some(user.id),
            name: user.display_name(),
            email: user.email,
            login: login.to_string(),
            is_admin,
            groups,
        })
    }
}
