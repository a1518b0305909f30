//! Schema-version registry shared by the services using one database.
//!
//! Each service records the version it runs with in `go_metadata_db_schema`
//! at startup.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{Database, DbError};

pub const DEFAULT_SCHEMA: &str = "public";
pub const META_TABLE_NAME: &str = "go_metadata_db_schema";

const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS go_metadata_db_schema
(
    id          serial    CONSTRAINT go_metadata_db_schema_pk PRIMARY KEY,
    service     text                             NOT NULL,
    schema      text      DEFAULT 'public'::text NOT NULL,
    table_name  text                             NOT NULL,
    version     text                             NOT NULL,
    create_time timestamp DEFAULT now()          NOT NULL,
    CONSTRAINT go_metadata_db_schema_unique_service_schema_table
        UNIQUE (service, schema, table_name)
)"#;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("unable to create the table go_metadata_db_schema: {0}")]
    CreateTable(#[source] DbError),

    #[error("unable to retrieve version for service {service}: {source}")]
    GetVersion {
        service: String,
        #[source]
        source: DbError,
    },

    #[error("unable to set version for service {service}: {source}")]
    SetVersion {
        service: String,
        #[source]
        source: DbError,
    },
}

/// What `set_service_version` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChange {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct MetadataService {
    db: Database,
}

impl MetadataService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the registry table if it is missing.
    pub async fn create_metadata_table(&self) -> Result<(), MetadataError> {
        let exists = self
            .db
            .table_exists(DEFAULT_SCHEMA, META_TABLE_NAME)
            .await
            .map_err(MetadataError::CreateTable)?;
        if exists {
            match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM go_metadata_db_schema")
                .fetch_one(self.db.pool())
                .await
            {
                Ok(0) => warn!("database does not contain any registered service in metadata"),
                Ok(count) => info!(count, "database contains service(s) in metadata"),
                Err(e) => warn!(error = %e, "problem counting the rows in metadata table"),
            }
            return Ok(());
        }

        warn!("database does not contain the metadata table, creating it");
        sqlx::query(CREATE_META_TABLE)
            .execute(self.db.pool())
            .await
            .map_err(|e| MetadataError::CreateTable(e.into()))?;
        info!(table = META_TABLE_NAME, "metadata table created");
        Ok(())
    }

    /// Version registered for `service`, if any.
    pub async fn get_service_version(&self, service: &str) -> Result<Option<String>, MetadataError> {
        debug!(service, "get service version");
        sqlx::query_scalar::<_, String>(
            "SELECT version FROM go_metadata_db_schema WHERE service = $1 ORDER BY id LIMIT 1",
        )
        .bind(service)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| MetadataError::GetVersion {
            service: service.to_string(),
            source: e.into(),
        })
    }

    /// Inserts or updates the version registered for `service`.
    pub async fn set_service_version(
        &self,
        service: &str,
        version: &str,
    ) -> Result<VersionChange, MetadataError> {
        let set_err = |e: sqlx::Error| MetadataError::SetVersion {
            service: service.to_string(),
            source: e.into(),
        };

        let change = match self.get_service_version(service).await? {
            Some(current) if current == version => {
                info!(service, version, "service already registered with this version");
                VersionChange::Unchanged
            }
            Some(current) => {
                sqlx::query("UPDATE go_metadata_db_schema SET version = $2 WHERE service = $1")
                    .bind(service)
                    .bind(version)
                    .execute(self.db.pool())
                    .await
                    .map_err(set_err)?;
                info!(service, from = %current, to = version, "service version updated");
                VersionChange::Updated
            }
            None => {
                sqlx::query(
                    "INSERT INTO go_metadata_db_schema (service, schema, table_name, version) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(service)
                .bind(DEFAULT_SCHEMA)
                .bind(service.to_lowercase())
                .bind(version)
                .execute(self.db.pool())
                .await
                .map_err(set_err)?;
                info!(service, version, "service registered in metadata");
                VersionChange::Inserted
            }
        };
        Ok(change)
    }
}
