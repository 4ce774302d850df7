//! Search session model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    #[default]
    Pending,
    Downloading,
    Completed,
    Error,
}

impl SearchStatus {
    /// Database and display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "downloading" => Ok(Self::Downloading),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown search status: {other}")),
        }
    }
}

impl TryFrom<String> for SearchStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

/// One import run for one person name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Search {
    pub id: i64,
    pub person_name: String,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Records reported by the fetch (not the number newly stored).
    pub result_count: i64,
    #[sqlx(try_from = "String")]
    pub status: SearchStatus,
    pub error_message: Option<String>,
}

impl Search {
    /// Creation time formatted for display.
    #[must_use]
    pub fn created_at_display(&self) -> String {
        chrono::DateTime::from_timestamp(self.created_at, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }
}
