//! Credential store backed by the `employe` table.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use super::{CredentialStore, StoreError};
use crate::models::auth::StoredUser;

type EmployeeRow = (i64, String, String, String, String, bool);

const SELECT_COLUMNS: &str = "SELECT idemploye::BIGINT, mainntlogin, COALESCE(prenom, ''), \
     COALESCE(nom, ''), COALESCE(email, ''), isactive FROM employe";

// Exact login, or the account part of DOMAIN\login. `_` and `%` in a login
// match literally.
const LOGIN_FILTER: &str = "isactive = true AND (lower(mainntlogin) = lower($1) \
     OR right(lower(mainntlogin), char_length($1) + 1) = '\\' || lower($1))";

/// Reads active employees from PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    /// Verifies that the `employe` table and the columns it reads are present.
    pub async fn new(pool: PgPool) -> Result<Self, StoreError> {
        let active = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM employe WHERE isactive = true",
        )
        .fetch_one(&pool)
        .await
        .map_err(|e| StoreError::Schema(format!("cannot count rows of table employe: {e}")))?;
        info!(count = active, "found active rows in table employe");

        let sample = sqlx::query_as::<_, EmployeeRow>(&format!(
            "{SELECT_COLUMNS} WHERE isactive = true ORDER BY idemploye LIMIT 1"
        ))
        .fetch_optional(&pool)
        .await
        .map_err(|e| StoreError::Schema(format!("cannot read columns of table employe: {e}")))?;
        if let Some((id, ..)) = sample {
            info!(id, "found all fields in table employe");
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for PgEmployeeStore {
    async fn get(&self, login: &str) -> Result<Option<StoredUser>, StoreError> {
        debug!(login, "store get");
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "{SELECT_COLUMNS} WHERE {LOGIN_FILTER} ORDER BY idemploye LIMIT 1"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(
            |(id, login, first_name, last_name, email, is_active)| StoredUser {
                id,
                login,
                first_name,
                last_name,
                email,
                is_active,
            },
        ))
    }

    async fn exists(&self, login: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM employe WHERE {LOGIN_FILTER})"
        ))
        .bind(login)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| warn!(login, error = %e, "store exists query failed"))?;
        debug!(login, exists, "store exists");
        Ok(exists)
    }
}
