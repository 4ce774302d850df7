#![no_main]

use gbif_explorer::models::{OccurrenceRecord, PageResponse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding and flattening must never panic, only return Ok or Err
    if let Ok(page) = serde_json::from_slice::<PageResponse>(data) {
        for occ in &page.results {
            let _ = OccurrenceRecord::from_occurrence(occ);
        }
    }
});
