use crate::config::DatabaseConfig;
use crate::errors::{ImportError, ImportResult};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub mod organisations;

/// Fixed table layout of a store. Every statement is idempotent.
pub const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS fs_entity (
        factset_entity_id  TEXT NOT NULL,
        entity_name        TEXT NOT NULL,
        entity_proper_name TEXT NOT NULL,
        primary_sic_code   TEXT NOT NULL,
        industry_code      TEXT NOT NULL,
        sector_code        TEXT NOT NULL,
        iso_country        TEXT NOT NULL,
        metro_area         TEXT NOT NULL,
        state_province     TEXT NOT NULL,
        zip_postal_code    TEXT NOT NULL,
        web_site           TEXT NOT NULL,
        entity_type        TEXT NOT NULL,
        entity_sub_type    TEXT NOT NULL,
        year_founded       TEXT NOT NULL,
        iso_country_incorp TEXT NOT NULL,
        iso_country_cor    TEXT NOT NULL,
        nace_code          TEXT NOT NULL
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS fs_entity_fsid ON fs_entity (factset_entity_id)",
    r#"CREATE TABLE IF NOT EXISTS fs_structure (
        factset_entity_id                 TEXT NOT NULL,
        factset_parent_entity_id          TEXT NOT NULL,
        factset_ultimate_parent_entity_id TEXT NOT NULL
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS fs_structure_fsid ON fs_structure (factset_entity_id)",
    r#"CREATE TABLE IF NOT EXISTS fs_names (
        factset_entity_id TEXT NOT NULL,
        entity_name_type  TEXT NOT NULL,
        entity_name_value TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS fs_names_fsid ON fs_names (factset_entity_id)",
    r#"CREATE TABLE IF NOT EXISTS fs_changes (
        factset_entity_id TEXT NOT NULL,
        change_type       TEXT NOT NULL,
        change_date       TEXT NOT NULL,
        old_value         TEXT NOT NULL,
        new_value         TEXT NOT NULL,
        audit_type        TEXT NOT NULL,
        comments          TEXT NOT NULL,
        audit_id          TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS fs_changes_fsid ON fs_changes (factset_entity_id)",
    r#"CREATE TABLE IF NOT EXISTS fs_identifiers (
        factset_entity_id TEXT NOT NULL,
        entity_id_type    TEXT NOT NULL,
        entity_id_value   TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS fs_identifiers_fsid ON fs_identifiers (factset_entity_id)",
    r#"CREATE TABLE IF NOT EXISTS uuid_to_fsid (
        uuid              TEXT NOT NULL,
        factset_entity_id TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS uuid_to_fsid_uuid ON uuid_to_fsid (uuid)",
];

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub fn pool(&self) -> Pool<Sqlite> {
        self.pool.clone()
    }

    /// SQLite URL of the named store
    pub fn store_url(config: &DatabaseConfig, store_name: &str) -> String {
        let path = config.data_dir.join(format!("{}.db", store_name));
        format!("sqlite://{}", path.display())
    }

    /// Create a brand new store and provision its schema. An existing store
    /// is a bootstrap failure: every import is a full reload into an empty
    /// target.
    pub async fn create(config: &DatabaseConfig, store_name: &str) -> ImportResult<Self> {
        let url = Self::store_url(config, store_name);

        if Sqlite::database_exists(&url).await? {
            return Err(ImportError::bootstrap(format!(
                "store '{}' already exists at {}",
                store_name, url
            )));
        }

        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            ImportError::bootstrap(format!(
                "cannot create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;

        let database = Self::connect(config, &url, true).await?;
        database.provision_schema().await?;
        info!("Created store '{}' at {}", store_name, url);

        Ok(database)
    }

    /// Open an existing store for lookups
    pub async fn open(config: &DatabaseConfig, store_name: &str) -> ImportResult<Self> {
        let url = Self::store_url(config, store_name);

        if !Sqlite::database_exists(&url).await? {
            return Err(ImportError::bootstrap(format!(
                "store '{}' does not exist at {}",
                store_name, url
            )));
        }

        let database = Self::connect(config, &url, false).await?;
        database.provision_schema().await?;
        Ok(database)
    }

    async fn connect(config: &DatabaseConfig, url: &str, create: bool) -> ImportResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(create)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn provision_schema(&self) -> ImportResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
