//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use gbif_explorer::client::GbifClient;
use gbif_explorer::config::Config;
use gbif_explorer::server::{AppState, create_router};
use gbif_explorer::store::Database;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    router: Router,
    db: Database,
    server: MockServer,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let mut config = Config::for_testing(&server.uri());
        config.results_per_page = 2;

        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("gbif.db")).await.unwrap();
        let client = GbifClient::new(&config).unwrap();

        let router = create_router(AppState {
            db: db.clone(),
            client,
            config: Arc::new(config),
        });

        Self { router, db, server, _dir: dir }
    }

    async fn mount_occurrences(&self) {
        let results = json!([
            { "key": 1, "recordedBy": "Jane Doe", "country": "Peru", "family": "Poaceae",
              "year": 1950, "decimalLatitude": -12.0, "decimalLongitude": -77.0 },
            { "key": 2, "recordedBy": "Jane Doe", "country": "Chile", "family": "Asteraceae",
              "year": 1962 },
            { "key": 3, "recordedBy": "Jane Doe", "country": "Peru", "family": "Fabaceae",
              "year": 1958, "scientificName": "=SUM(A1)" },
        ]);
        Mock::given(method("GET"))
            .and(path("/occurrence/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "count": 3, "results": results })),
            )
            .mount(&self.server)
            .await;
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> axum::response::Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_search(&self, name: &str) -> axum::response::Response {
        let body = serde_urlencoded::to_string(vec![("person_name", name)]).unwrap();
        self.send(
            Request::post("/search")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

fn location(response: &axum::response::Response) -> String {
    response.headers()[header::LOCATION].to_str().unwrap().to_string()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_index_shows_notice_and_form() {
    let app = TestApp::new().await;
    let response = app.get("/?notice=Hello%20%3Cthere%3E&level=success").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("name=\"person_name\""));
    assert!(html.contains("Hello &lt;there&gt;"));
}

#[tokio::test]
async fn test_blank_search_redirects_with_error() {
    let app = TestApp::new().await;
    let response = app.post_search("   ").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/?"));
    assert!(target.contains("level=error"));
    assert!(target.contains("Please+enter+a+person+name"));
    assert!(app.db.recent_searches(10).await.unwrap().is_empty());
    assert!(app.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_imports_and_redirects_to_results() {
    let app = TestApp::new().await;
    app.mount_occurrences().await;

    let response = app.post_search("Jane Doe").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/results/1?"));
    assert!(target.contains("level=success"));

    let response = app.get(&target).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Successfully downloaded 3 occurrences"));
    assert!(html.contains("Page 1 of 2"));
}

#[tokio::test]
async fn test_failed_search_redirects_home_with_error() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/occurrence/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.server)
        .await;

    let response = app.post_search("Jane Doe").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/?"));
    assert!(target.contains("level=error"));
}

#[tokio::test]
async fn test_unknown_search_is_not_found() {
    let app = TestApp::new().await;

    for uri in ["/results/42", "/export/42", "/api/searches/42/occurrences"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let response = app
        .send(Request::post("/delete/42").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_filters_and_paginates() {
    let app = TestApp::new().await;
    app.mount_occurrences().await;
    app.post_search("Jane Doe").await;

    let response = app.get("/api/searches/1/occurrences?country=peru&year_min=1955").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["gbifId"], "3");

    let response = app.get("/api/searches/1/occurrences?page=2").await;
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["page"], 2);
    assert_eq!(json["pages"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_export_is_csv_attachment() {
    let app = TestApp::new().await;
    app.mount_occurrences().await;
    app.post_search("Jane Doe").await;

    let response = app.get("/export/1?has_coordinates=no").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=gbif_export_1_"));
    assert!(disposition.ends_with(".csv"));

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[0].starts_with("id,gbif_id,"));
    // Header plus the two records without coordinates
    assert_eq!(lines.len(), 3);
    assert!(csv.contains("'=SUM(A1)"));
}

#[tokio::test]
async fn test_delete_removes_search() {
    let app = TestApp::new().await;
    app.mount_occurrences().await;
    app.post_search("Jane Doe").await;

    let response = app
        .send(Request::post("/delete/1").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).contains("deleted+successfully"));

    assert!(app.db.get_search(1).await.unwrap().is_none());
    assert_eq!(app.get("/results/1").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dropped_search_request_still_completes_import() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/occurrence/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "count": 2, "results": [{ "key": 1 }, { "key": 2 }] }))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&app.server)
        .await;

    // The client gives up long before GBIF answers
    let abandoned =
        tokio::time::timeout(std::time::Duration::from_millis(100), app.post_search("Jane Doe")).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let search = app.db.get_search(1).await.unwrap().unwrap();
    assert_eq!(search.status, gbif_explorer::models::SearchStatus::Completed);
    assert_eq!(app.db.count_occurrences(1).await.unwrap(), 2);
}
