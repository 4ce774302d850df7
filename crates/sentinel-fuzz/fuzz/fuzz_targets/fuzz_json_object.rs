#![no_main]

use gbif_explorer::models::{Occurrence, PageResponse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First try to parse as valid JSON
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        // Then try each model type
        let _ = serde_json::from_value::<PageResponse>(json.clone());
        let _ = serde_json::from_value::<Occurrence>(json);
    }
});
