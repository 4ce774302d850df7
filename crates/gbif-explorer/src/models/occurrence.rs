//! Occurrence search response matching the GBIF API schema.

use serde::{Deserialize, Serialize};

/// One page of the occurrence search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    /// Total matches reported by GBIF. Only the first page's value is used.
    #[serde(default)]
    pub count: u64,

    /// Offset echoed back by the API.
    #[serde(default)]
    pub offset: u64,

    /// Limit echoed back by the API.
    #[serde(default)]
    pub limit: u64,

    /// GBIF's own end marker. Informational only; pagination stops on a short page.
    #[serde(default)]
    pub end_of_records: Option<bool>,

    /// Records on this page.
    #[serde(default)]
    pub results: Vec<Occurrence>,
}

/// An occurrence record as returned by GBIF.
///
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// GBIF occurrence key.
    #[serde(default)]
    pub key: Option<i64>,

    /// Publisher's occurrence identifier.
    #[serde(default, rename = "occurrenceID")]
    pub occurrence_id: Option<String>,

    #[serde(default)]
    pub recorded_by: Option<String>,

    #[serde(default)]
    pub identified_by: Option<String>,

    #[serde(default)]
    pub scientific_name: Option<String>,

    #[serde(default)]
    pub kingdom: Option<String>,

    #[serde(default)]
    pub phylum: Option<String>,

    #[serde(default, rename = "class")]
    pub class_name: Option<String>,

    #[serde(default)]
    pub order: Option<String>,

    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub genus: Option<String>,

    #[serde(default)]
    pub species: Option<String>,

    #[serde(default)]
    pub taxon_rank: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub country_code: Option<String>,

    #[serde(default)]
    pub state_province: Option<String>,

    #[serde(default)]
    pub locality: Option<String>,

    #[serde(default)]
    pub decimal_latitude: Option<f64>,

    #[serde(default)]
    pub decimal_longitude: Option<f64>,

    /// Coordinate uncertainty in meters.
    #[serde(default)]
    pub coordinate_uncertainty_in_meters: Option<f64>,

    #[serde(default)]
    pub elevation: Option<f64>,

    /// Event date as published (ISO 8601, possibly a range).
    #[serde(default)]
    pub event_date: Option<String>,

    #[serde(default)]
    pub year: Option<i32>,

    #[serde(default)]
    pub month: Option<i32>,

    #[serde(default)]
    pub day: Option<i32>,

    #[serde(default)]
    pub basis_of_record: Option<String>,

    #[serde(default)]
    pub identification_verification_status: Option<String>,

    #[serde(default)]
    pub coordinate_precision: Option<f64>,

    /// GBIF data quality flags.
    #[serde(default)]
    pub issues: Vec<String>,

    #[serde(default)]
    pub institution_code: Option<String>,

    #[serde(default)]
    pub collection_code: Option<String>,

    #[serde(default)]
    pub catalog_number: Option<String>,
}
