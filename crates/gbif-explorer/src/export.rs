//! CSV export of stored occurrences.

use chrono::{DateTime, Utc};

use crate::models::StoredOccurrence;

/// Header row, in column order.
pub const CSV_COLUMNS: &[&str] = &[
    "id",
    "gbif_id",
    "recorded_by",
    "identified_by",
    "scientific_name",
    "family",
    "genus",
    "species",
    "country",
    "locality",
    "decimal_latitude",
    "decimal_longitude",
    "coordinate_uncertainty",
    "event_date",
    "year",
    "month",
    "day",
    "basis_of_record",
    "identification_verification_status",
    "institution_code",
    "collection_code",
    "catalog_number",
    "gbif_url",
];

/// Format records as CSV with a header row.
#[must_use]
pub fn format_csv(records: &[StoredOccurrence]) -> String {
    let mut output = CSV_COLUMNS.join(",");
    output.push('\n');

    for stored in records {
        let r = &stored.record;
        let row = [
            stored.id.to_string(),
            csv_escape(&r.gbif_id),
            text(r.recorded_by.as_deref()),
            text(r.identified_by.as_deref()),
            text(r.scientific_name.as_deref()),
            text(r.family.as_deref()),
            text(r.genus.as_deref()),
            text(r.species.as_deref()),
            text(r.country.as_deref()),
            text(r.locality.as_deref()),
            number(r.decimal_latitude),
            number(r.decimal_longitude),
            number(r.coordinate_uncertainty),
            text(r.event_date.as_deref()),
            number(r.year),
            number(r.month),
            number(r.day),
            text(r.basis_of_record.as_deref()),
            text(r.identification_verification_status.as_deref()),
            text(r.institution_code.as_deref()),
            text(r.collection_code.as_deref()),
            text(r.catalog_number.as_deref()),
            text(r.gbif_url.as_deref()),
        ];
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

/// Attachment name for an export of `search_id` taken at `at`.
#[must_use]
pub fn export_filename(search_id: i64, at: DateTime<Utc>) -> String {
    format!("gbif_export_{search_id}_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

fn text(value: Option<&str>) -> String {
    value.map(csv_escape).unwrap_or_default()
}

fn number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Escape a string for CSV output.
fn csv_escape(s: &str) -> String {
    let formula = s.starts_with(['=', '+', '-', '@']);

    if s.contains([',', '"', '\n', '\r']) {
        // Prefix with single quote to prevent formula injection in spreadsheets
        let escaped = s.replace('"', "\"\"");
        if formula { format!("\"'{escaped}\"") } else { format!("\"{escaped}\"") }
    } else if formula {
        format!("'{s}")
    } else {
        s.to_string()
    }
}
