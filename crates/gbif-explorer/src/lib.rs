//! GBIF Explorer
//!
//! Downloads every GBIF occurrence recorded by a person, stores the records
//! in SQLite, and serves them back filtered, paginated and as CSV.
//!
//! # Features
//!
//! - **Paginated fetch**: Walks the occurrence search API page by page until exhausted
//! - **Retrying**: Fixed-delay retries on every failed page request
//! - **Deduplicated storage**: Each GBIF record is stored once
//! - **Filtering and export**: In-memory filters, pagination and CSV download
//!
//! # Example
//!
//! ```no_run
//! use gbif_explorer::{client::GbifClient, config::Config, import::import_person, store::Database};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::new(&config.database_path).await?;
//!     let client = GbifClient::new(&config)?;
//!
//!     let outcome = import_person(&db, &client, "Jane Doe").await?;
//!     println!("stored {} records", outcome.inserted);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod formatters;
pub mod import;
pub mod models;
pub mod server;
pub mod store;

pub use client::GbifClient;
pub use config::Config;
pub use error::{AppError, ClientError, FetchError, StoreError};
pub use store::Database;
