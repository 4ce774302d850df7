//! SQLite persistence for searches and their occurrences.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`searches`] — Search session CRUD
//! - [`occurrences`] — Occurrence inserts and lookups

use sqlx::sqlite::SqlitePool;

mod migrations;
mod occurrences;
mod searches;

/// Columns of the `occurrences` table that map onto
/// [`OccurrenceRecord`](crate::models::OccurrenceRecord), in table order.
const RECORD_COLUMNS: &str = "gbif_id, occurrence_key, recorded_by, identified_by, \
    associated_persons, scientific_name, kingdom, phylum, class_name, order_name, family, \
    genus, species, taxon_rank, country, country_code, state_province, locality, \
    decimal_latitude, decimal_longitude, coordinate_uncertainty, elevation, event_date, \
    year, month, day, basis_of_record, identification_verification_status, \
    coordinate_precision, issues, institution_code, collection_code, catalog_number, gbif_url";

/// Handle to the SQLite database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}
