//! Output formatters for HTML pages and JSON responses.

pub mod html;
pub mod json;

pub use json::{compact_occurrence, occurrence_page};
