//! Fuzzing library for gbif-explorer.
//!
//! This crate provides fuzzing targets for decoding GBIF search responses
//! and the filter query strings accepted by the web interface.
//!
//! # Usage
//!
//! ```bash
//! cd crates/sentinel-fuzz
//! cargo +nightly fuzz run fuzz_page_parse -- -max_total_time=60
//! ```

pub use gbif_explorer::{filters, models};
