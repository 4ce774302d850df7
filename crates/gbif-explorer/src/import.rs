//! Import of one person's occurrences into the store.

use crate::client::{FetchProgress, GbifClient, ProgressSink};
use crate::error::{AppResult, FetchError};
use crate::models::OccurrenceRecord;
use crate::store::Database;

/// Result of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Search session that owns the new records.
    pub search_id: i64,
    /// Records returned by GBIF.
    pub fetched: usize,
    /// Records newly stored.
    pub inserted: usize,
    /// Records already stored, or without a GBIF key.
    pub skipped: usize,
}

/// Fetch every occurrence recorded by `person_name` and store it under a new search.
///
/// The search is created in the `downloading` state before the fetch and
/// ends up `completed` or `error`. A blank name is rejected before any
/// search is created.
///
/// # Errors
///
/// Returns [`FetchError::QueryInvalid`] for a blank name, the fetch's
/// terminal error if GBIF cannot be reached, or a store error.
pub async fn import_person(
    db: &Database,
    client: &GbifClient,
    person_name: &str,
) -> AppResult<ImportOutcome> {
    let person_name = person_name.trim();
    if person_name.is_empty() {
        return Err(FetchError::QueryInvalid.into());
    }

    let search_id = db.create_search(person_name).await?;
    tracing::info!(search_id, person_name, "Starting import");

    match run_import(db, client, search_id, person_name).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            tracing::error!(search_id, error = %e, "Import failed");
            if let Err(mark) = db.fail_search(search_id, &e.to_string()).await {
                tracing::error!(search_id, error = %mark, "Failed to mark search as failed");
            }
            Err(e)
        }
    }
}

/// Everything after the search row exists. Any error here leaves the
/// search to be marked failed by the caller.
async fn run_import(
    db: &Database,
    client: &GbifClient,
    search_id: i64,
    person_name: &str,
) -> AppResult<ImportOutcome> {
    let mut progress = ProgressLog::new(search_id);
    let occurrences = client.fetch_all(person_name, &mut progress).await?;

    let records: Vec<OccurrenceRecord> = occurrences
        .iter()
        .filter_map(|occ| {
            let record = OccurrenceRecord::from_occurrence(occ);
            if record.is_none() {
                tracing::warn!(search_id, "Skipping occurrence without a GBIF key");
            }
            record
        })
        .collect();

    let inserted = db.insert_occurrences(search_id, &records).await?;
    let fetched = occurrences.len();
    db.complete_search(search_id, fetched as i64).await?;

    let outcome = ImportOutcome { search_id, fetched, inserted, skipped: fetched - inserted };
    tracing::info!(
        search_id,
        fetched,
        inserted,
        skipped = outcome.skipped,
        pages = progress.state.pages,
        "Import complete"
    );

    Ok(outcome)
}

/// Progress sink that logs each page.
struct ProgressLog {
    search_id: i64,
    state: FetchProgress,
}

impl ProgressLog {
    fn new(search_id: i64) -> Self {
        Self { search_id, state: FetchProgress::default() }
    }
}

impl ProgressSink for ProgressLog {
    fn on_page(&mut self, fetched: usize, total: u64) {
        self.state.on_page(fetched, total);
        tracing::info!(
            search_id = self.search_id,
            percent = (self.state.ratio() * 100.0).round(),
            "Downloaded {fetched}/{total} records"
        );
    }
}
