//! Flattened occurrence record, the shape stored in the database.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Occurrence;
use crate::config::api;

/// An occurrence flattened for storage, filtering and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OccurrenceRecord {
    /// GBIF key as a decimal string. Unique across the database.
    pub gbif_id: String,
    pub occurrence_key: Option<String>,

    pub recorded_by: Option<String>,
    pub identified_by: Option<String>,
    /// Always empty; GBIF exposes associated persons only through extensions.
    pub associated_persons: Option<String>,

    pub scientific_name: Option<String>,
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class_name: Option<String>,
    #[sqlx(rename = "order_name")]
    pub order: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub taxon_rank: Option<String>,

    pub country: Option<String>,
    pub country_code: Option<String>,
    pub state_province: Option<String>,
    pub locality: Option<String>,
    pub decimal_latitude: Option<f64>,
    pub decimal_longitude: Option<f64>,
    pub coordinate_uncertainty: Option<f64>,
    pub elevation: Option<f64>,

    pub event_date: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,

    pub basis_of_record: Option<String>,
    pub identification_verification_status: Option<String>,
    pub coordinate_precision: Option<f64>,
    /// Issue flags joined with `,`.
    pub issues: String,

    pub institution_code: Option<String>,
    pub collection_code: Option<String>,
    pub catalog_number: Option<String>,

    pub gbif_url: Option<String>,
}

impl OccurrenceRecord {
    /// Flatten an API occurrence.
    ///
    /// Returns `None` when the occurrence has no GBIF key, since such a
    /// record cannot be deduplicated or linked.
    #[must_use]
    pub fn from_occurrence(occ: &Occurrence) -> Option<Self> {
        let key = occ.key?;

        Some(Self {
            gbif_id: key.to_string(),
            occurrence_key: occ.occurrence_id.clone(),
            recorded_by: occ.recorded_by.clone(),
            identified_by: occ.identified_by.clone(),
            associated_persons: None,
            scientific_name: occ.scientific_name.clone(),
            kingdom: occ.kingdom.clone(),
            phylum: occ.phylum.clone(),
            class_name: occ.class_name.clone(),
            order: occ.order.clone(),
            family: occ.family.clone(),
            genus: occ.genus.clone(),
            species: occ.species.clone(),
            taxon_rank: occ.taxon_rank.clone(),
            country: occ.country.clone(),
            country_code: occ.country_code.clone(),
            state_province: occ.state_province.clone(),
            locality: occ.locality.clone(),
            decimal_latitude: occ.decimal_latitude,
            decimal_longitude: occ.decimal_longitude,
            coordinate_uncertainty: occ.coordinate_uncertainty_in_meters,
            elevation: occ.elevation,
            event_date: occ.event_date.clone(),
            year: occ.year,
            month: occ.month,
            day: occ.day,
            basis_of_record: occ.basis_of_record.clone(),
            identification_verification_status: occ.identification_verification_status.clone(),
            coordinate_precision: occ.coordinate_precision,
            issues: occ.issues.join(","),
            institution_code: occ.institution_code.clone(),
            collection_code: occ.collection_code.clone(),
            catalog_number: occ.catalog_number.clone(),
            gbif_url: Some(format!("{}/{key}", api::OCCURRENCE_PAGE_URL)),
        })
    }

    /// True when both latitude and longitude are present.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.decimal_latitude.is_some() && self.decimal_longitude.is_some()
    }

    /// Scientific name, falling back to "Unknown taxon".
    #[must_use]
    pub fn name_or_default(&self) -> &str {
        self.scientific_name.as_deref().unwrap_or("Unknown taxon")
    }

    /// Date for display: the event date, or the year if that is all we have.
    #[must_use]
    pub fn display_date(&self) -> String {
        match (&self.event_date, self.year) {
            (Some(date), _) => date.clone(),
            (None, Some(year)) => year.to_string(),
            (None, None) => String::new(),
        }
    }
}

impl AsRef<Self> for OccurrenceRecord {
    fn as_ref(&self) -> &Self {
        self
    }
}

/// A record as stored, with its row id and owning search.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredOccurrence {
    pub id: i64,
    pub search_id: i64,
    /// Unix timestamp of insertion.
    pub created_at: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: OccurrenceRecord,
}

impl AsRef<OccurrenceRecord> for StoredOccurrence {
    fn as_ref(&self) -> &OccurrenceRecord {
        &self.record
    }
}
