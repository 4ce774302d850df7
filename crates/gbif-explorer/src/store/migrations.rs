//! Database lifecycle and schema migrations.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqliteConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};

use super::Database;
use crate::error::{StoreError, StoreResult};

impl Database {
    /// Open the database, creating the file and its directory if needed,
    /// and bring the schema up to date.
    pub async fn new(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::Connection(format!("Failed to create database directory: {e}"))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| StoreError::Connection(format!("Failed to parse database path: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.run_migrations().await?;

        tracing::info!(path = %path.display(), "Database ready");
        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            StoreError::Connection(format!("Failed to acquire connection: {e}"))
        })?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            StoreError::Migration(format!("Failed to create schema_version table: {e}"))
        })?;

        let current_version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| StoreError::Migration(format!("Failed to query schema version: {e}")))?;

        if current_version.unwrap_or(0) < 1 {
            Self::migrate_v1(&mut conn).await?;
        }

        Ok(())
    }

    /// Migration v1: searches and occurrences.
    async fn migrate_v1(conn: &mut SqliteConnection) -> StoreResult<()> {
        tracing::info!("Applying database migration v1");

        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::Migration(format!("Failed to begin transaction: {e}")))?;

        let result = async {
            Self::create_searches_schema(conn).await?;
            Self::create_occurrences_schema(conn).await?;
            sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (1, ?)")
                .bind(chrono::Utc::now().timestamp())
                .execute(&mut *conn)
                .await?;
            Ok::<(), sqlx::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await.map_err(|e| {
                    StoreError::Migration(format!("Failed to commit migration v1: {e}"))
                })?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(StoreError::Migration(format!("Migration v1 failed: {e}")));
            }
        }

        tracing::info!("Database migration v1 complete");
        Ok(())
    }

    async fn create_searches_schema(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE searches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                person_name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                result_count INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending',
                error_message TEXT
            )
            ",
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query("CREATE INDEX idx_searches_person_name ON searches(person_name)")
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    async fn create_occurrences_schema(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE occurrences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                search_id INTEGER NOT NULL REFERENCES searches(id) ON DELETE CASCADE,
                gbif_id TEXT NOT NULL UNIQUE,
                occurrence_key TEXT,
                recorded_by TEXT,
                identified_by TEXT,
                associated_persons TEXT,
                scientific_name TEXT,
                kingdom TEXT,
                phylum TEXT,
                class_name TEXT,
                order_name TEXT,
                family TEXT,
                genus TEXT,
                species TEXT,
                taxon_rank TEXT,
                country TEXT,
                country_code TEXT,
                state_province TEXT,
                locality TEXT,
                decimal_latitude REAL,
                decimal_longitude REAL,
                coordinate_uncertainty REAL,
                elevation REAL,
                event_date TEXT,
                year INTEGER,
                month INTEGER,
                day INTEGER,
                basis_of_record TEXT,
                identification_verification_status TEXT,
                coordinate_precision REAL,
                issues TEXT NOT NULL DEFAULT '',
                institution_code TEXT,
                collection_code TEXT,
                catalog_number TEXT,
                gbif_url TEXT,
                created_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&mut *conn)
        .await?;

        for index in [
            "CREATE INDEX idx_occurrences_search_id ON occurrences(search_id)",
            "CREATE INDEX idx_occurrences_recorded_by ON occurrences(recorded_by)",
            "CREATE INDEX idx_occurrences_identified_by ON occurrences(identified_by)",
            "CREATE INDEX idx_occurrences_scientific_name ON occurrences(scientific_name)",
            "CREATE INDEX idx_occurrences_family ON occurrences(family)",
            "CREATE INDEX idx_occurrences_genus ON occurrences(genus)",
            "CREATE INDEX idx_occurrences_country ON occurrences(country)",
            "CREATE INDEX idx_occurrences_year ON occurrences(year)",
        ] {
            sqlx::query(index).execute(&mut *conn).await?;
        }

        Ok(())
    }

    /// Close the connection pool.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
