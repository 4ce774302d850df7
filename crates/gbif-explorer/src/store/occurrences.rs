//! Occurrence inserts and lookups.

use sqlx::{Sqlite, SqliteConnection};

use super::{Database, RECORD_COLUMNS};
use crate::error::StoreResult;
use crate::models::{OccurrenceRecord, StoredOccurrence};

impl Database {
    /// Store one record under `search_id`.
    ///
    /// Returns `false` without touching the database if a record with the
    /// same `gbif_id` already exists, under this or any other search.
    pub async fn insert_occurrence(
        &self,
        search_id: i64,
        record: &OccurrenceRecord,
    ) -> StoreResult<bool> {
        let mut conn = self.pool.acquire().await?;
        insert_record(&mut conn, search_id, record, chrono::Utc::now().timestamp()).await
    }

    /// Store a batch of records in one transaction.
    ///
    /// Duplicates are skipped as in [`Database::insert_occurrence`].
    /// Returns the number of records actually inserted.
    pub async fn insert_occurrences(
        &self,
        search_id: i64,
        records: &[OccurrenceRecord],
    ) -> StoreResult<usize> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for record in records {
            if insert_record(&mut tx, search_id, record, now).await? {
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// All records owned by a search, in insertion order.
    pub async fn occurrences_for_search(&self, search_id: i64) -> StoreResult<Vec<StoredOccurrence>> {
        let rows = sqlx::query_as::<_, StoredOccurrence>(&format!(
            "SELECT id, search_id, created_at, {RECORD_COLUMNS} \
             FROM occurrences WHERE search_id = ? ORDER BY id"
        ))
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of records owned by a search.
    pub async fn count_occurrences(&self, search_id: i64) -> StoreResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM occurrences WHERE search_id = ?")
            .bind(search_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Look up a record by its GBIF id.
    pub async fn find_by_gbif_id(&self, gbif_id: &str) -> StoreResult<Option<StoredOccurrence>> {
        let row = sqlx::query_as::<_, StoredOccurrence>(&format!(
            "SELECT id, search_id, created_at, {RECORD_COLUMNS} FROM occurrences WHERE gbif_id = ?"
        ))
        .bind(gbif_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

async fn insert_record(
    conn: &mut SqliteConnection,
    search_id: i64,
    record: &OccurrenceRecord,
    created_at: i64,
) -> StoreResult<bool> {
    let sql = format!(
        "INSERT INTO occurrences (search_id, created_at, {RECORD_COLUMNS}) VALUES \
         (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, \
         ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(gbif_id) DO NOTHING"
    );

    let result = sqlx::query::<Sqlite>(&sql)
        .bind(search_id)
        .bind(created_at)
        .bind(&record.gbif_id)
        .bind(&record.occurrence_key)
        .bind(&record.recorded_by)
        .bind(&record.identified_by)
        .bind(&record.associated_persons)
        .bind(&record.scientific_name)
        .bind(&record.kingdom)
        .bind(&record.phylum)
        .bind(&record.class_name)
        .bind(&record.order)
        .bind(&record.family)
        .bind(&record.genus)
        .bind(&record.species)
        .bind(&record.taxon_rank)
        .bind(&record.country)
        .bind(&record.country_code)
        .bind(&record.state_province)
        .bind(&record.locality)
        .bind(record.decimal_latitude)
        .bind(record.decimal_longitude)
        .bind(record.coordinate_uncertainty)
        .bind(record.elevation)
        .bind(&record.event_date)
        .bind(record.year)
        .bind(record.month)
        .bind(record.day)
        .bind(&record.basis_of_record)
        .bind(&record.identification_verification_status)
        .bind(record.coordinate_precision)
        .bind(&record.issues)
        .bind(&record.institution_code)
        .bind(&record.collection_code)
        .bind(&record.catalog_number)
        .bind(&record.gbif_url)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        tracing::trace!(gbif_id = %record.gbif_id, "Skipping existing occurrence");
        return Ok(false);
    }

    Ok(true)
}
