//! Data models for GBIF occurrences and search sessions.
//!
//! API models use `#[serde(default)]` for every field and
//! `#[serde(rename_all = "camelCase")]` to match GBIF naming.

mod occurrence;
mod record;
mod search;

pub use occurrence::{Occurrence, PageResponse};
pub use record::{OccurrenceRecord, StoredOccurrence};
pub use search::{Search, SearchStatus};
