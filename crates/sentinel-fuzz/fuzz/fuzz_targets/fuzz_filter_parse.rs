#![no_main]

use gbif_explorer::filters::{OccurrenceFilter, PageQuery};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary query strings from the results form
    if let Ok(filter) = serde_urlencoded::from_bytes::<OccurrenceFilter>(data) {
        let _ = filter.to_query_pairs();
    }
    let _ = serde_urlencoded::from_bytes::<PageQuery>(data);
});
