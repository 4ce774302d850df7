//! JSON output formatting.

use serde_json::{Value, json};

use crate::filters::Page;
use crate::models::{Search, StoredOccurrence};

/// Create a compact occurrence representation for JSON output.
///
/// Absent fields are omitted rather than written as `null`.
#[must_use]
pub fn compact_occurrence(stored: &StoredOccurrence) -> Value {
    let r = &stored.record;
    let mut obj = json!({
        "id": stored.id,
        "gbifId": r.gbif_id,
        "scientificName": r.name_or_default(),
    });

    let text_fields = [
        ("recordedBy", &r.recorded_by),
        ("identifiedBy", &r.identified_by),
        ("family", &r.family),
        ("genus", &r.genus),
        ("species", &r.species),
        ("country", &r.country),
        ("locality", &r.locality),
        ("eventDate", &r.event_date),
        ("basisOfRecord", &r.basis_of_record),
        ("institutionCode", &r.institution_code),
        ("catalogNumber", &r.catalog_number),
        ("url", &r.gbif_url),
    ];
    for (key, value) in text_fields {
        if let Some(v) = value {
            obj[key] = json!(v);
        }
    }

    if let Some(year) = r.year {
        obj["year"] = json!(year);
    }

    if let (Some(lat), Some(lon)) = (r.decimal_latitude, r.decimal_longitude) {
        obj["coordinates"] = json!([lat, lon]);
    }

    obj
}

/// A page of occurrences with its search and paging metadata.
#[must_use]
pub fn occurrence_page(search: &Search, page: &Page<StoredOccurrence>) -> Value {
    json!({
        "search": {
            "id": search.id,
            "personName": search.person_name,
            "status": search.status,
            "resultCount": search.result_count,
        },
        "page": page.page,
        "perPage": page.per_page,
        "total": page.total,
        "pages": page.pages(),
        "items": page.items.iter().map(compact_occurrence).collect::<Vec<_>>(),
    })
}
