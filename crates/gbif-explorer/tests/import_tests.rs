//! End-to-end import tests: mocked GBIF API into a temporary database.

use gbif_explorer::client::GbifClient;
use gbif_explorer::config::Config;
use gbif_explorer::error::{AppError, FetchError};
use gbif_explorer::import::import_person;
use gbif_explorer::models::SearchStatus;
use gbif_explorer::store::Database;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, GbifClient, Database, TempDir) {
    let server = MockServer::start().await;
    let client = GbifClient::new(&Config::for_testing(&server.uri())).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(&dir.path().join("gbif.db")).await.unwrap();
    (server, client, db, dir)
}

async fn mount_results(server: &MockServer, results: serde_json::Value) {
    let count = results.as_array().map_or(0, Vec::len);
    Mock::given(method("GET"))
        .and(path("/occurrence/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "count": count, "results": results })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_import_stores_records_and_completes() {
    let (server, client, db, _dir) = setup().await;
    mount_results(
        &server,
        json!([
            { "key": 11, "recordedBy": "Jane Doe", "country": "Peru", "year": 1950,
              "decimalLatitude": -12.1, "decimalLongitude": -77.0, "issues": ["ZERO_COORDINATE"] },
            { "key": 12, "recordedBy": "Jane Doe", "family": "Poaceae" },
        ]),
    )
    .await;

    let outcome = import_person(&db, &client, "  Jane Doe ").await.unwrap();

    assert_eq!(outcome.fetched, 2);
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.skipped, 0);

    let search = db.get_search(outcome.search_id).await.unwrap().unwrap();
    assert_eq!(search.person_name, "Jane Doe");
    assert_eq!(search.status, SearchStatus::Completed);
    assert_eq!(search.result_count, 2);

    let stored = db.occurrences_for_search(outcome.search_id).await.unwrap();
    assert_eq!(stored[0].record.gbif_id, "11");
    assert_eq!(stored[0].record.issues, "ZERO_COORDINATE");
    assert_eq!(
        stored[0].record.gbif_url.as_deref(),
        Some("https://www.gbif.org/occurrence/11")
    );
    assert_eq!(stored[1].record.family.as_deref(), Some("Poaceae"));
}

#[tokio::test]
async fn test_import_skips_records_without_key() {
    let (server, client, db, _dir) = setup().await;
    mount_results(&server, json!([{ "key": 1 }, { "scientificName": "Keyless" }])).await;

    let outcome = import_person(&db, &client, "Jane Doe").await.unwrap();

    assert_eq!(outcome.fetched, 2);
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.skipped, 1);
}

#[tokio::test]
async fn test_repeat_import_stores_nothing_new() {
    let (server, client, db, _dir) = setup().await;
    mount_results(&server, json!([{ "key": 1 }, { "key": 2 }])).await;

    let first = import_person(&db, &client, "Jane Doe").await.unwrap();
    let second = import_person(&db, &client, "Jane Doe").await.unwrap();

    assert_ne!(first.search_id, second.search_id);
    assert_eq!(second.fetched, 2);
    assert_eq!(second.inserted, 0);
    assert_eq!(db.count_occurrences(second.search_id).await.unwrap(), 0);
    assert_eq!(db.get_search(second.search_id).await.unwrap().unwrap().result_count, 2);
}

#[tokio::test]
async fn test_blank_name_creates_no_search() {
    let (_server, client, db, _dir) = setup().await;

    let err = import_person(&db, &client, "   ").await.unwrap_err();

    assert!(matches!(err, AppError::Fetch(FetchError::QueryInvalid)));
    assert!(db.recent_searches(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_fetch_marks_search_as_error() {
    let (server, client, db, _dir) = setup().await;
    Mock::given(method("GET"))
        .and(path("/occurrence/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = import_person(&db, &client, "Jane Doe").await.unwrap_err();
    assert!(matches!(err, AppError::Fetch(FetchError::TransportFailure { attempts: 3, .. })));

    let searches = db.recent_searches(10).await.unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].status, SearchStatus::Error);
    assert!(searches[0].error_message.as_deref().unwrap_or_default().contains("3 attempts"));
}

#[tokio::test]
async fn test_store_failure_after_fetch_marks_search_as_error() {
    let (server, client, db, dir) = setup().await;
    mount_results(&server, json!([{ "key": 1 }, { "key": 2 }])).await;

    // Break the occurrences table from a second connection so the insert fails
    let other = sqlx::SqlitePool::connect(&format!("sqlite:{}", dir.path().join("gbif.db").display()))
        .await
        .unwrap();
    sqlx::query("DROP TABLE occurrences").execute(&other).await.unwrap();
    other.close().await;

    let err = import_person(&db, &client, "Jane Doe").await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    let searches = db.recent_searches(10).await.unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].status, SearchStatus::Error);
    assert!(searches[0].error_message.as_deref().unwrap_or_default().contains("occurrences"));
}
