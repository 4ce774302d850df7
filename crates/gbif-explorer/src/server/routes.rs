//! HTTP routes.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::client::GbifClient;
use crate::config::{Config, display};
use crate::error::{AppError, AppResult};
use crate::export;
use crate::filters::{Facets, OccurrenceFilter, Page, PageQuery};
use crate::formatters::{self, html::Notice};
use crate::import::import_person;
use crate::models::{Search, StoredOccurrence};
use crate::store::Database;

/// Shared state for HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub client: GbifClient,
    pub config: Arc<Config>,
}

/// Search form body.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub person_name: String,
}

/// Create the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/search", post(submit_search))
        .route("/results/{id}", get(results))
        .route("/export/{id}", get(export_csv))
        .route("/delete/{id}", post(delete_search))
        .route("/api/searches/{id}/occurrences", get(api_occurrences))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gbif-explorer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn index(State(state): State<AppState>, Query(notice): Query<Notice>) -> AppResult<Html<String>> {
    let recent = state.db.recent_searches(display::RECENT_SEARCHES).await?;
    Ok(Html(formatters::html::index_page(&recent, &notice)))
}

/// POST /search - download every occurrence for a person and store it.
///
/// The import runs on its own task so a client that disconnects mid-import
/// does not cancel the fetch or leave the search half-finished.
async fn submit_search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Redirect {
    let name = form.person_name.trim().to_string();

    let task = {
        let (db, client, name) = (state.db.clone(), state.client.clone(), name.clone());
        tokio::spawn(async move { import_person(&db, &client, &name).await })
    };

    match task.await {
        Ok(Ok(outcome)) => {
            let message = format!(
                "Successfully downloaded {} occurrences for \"{name}\"",
                outcome.fetched
            );
            Redirect::to(&format!(
                "/results/{}?{}",
                outcome.search_id,
                Notice::query(&message, "success")
            ))
        }
        Ok(Err(e)) => {
            tracing::warn!(person_name = %name, error = %e, "Search failed");
            Redirect::to(&format!("/?{}", Notice::query(&e.to_user_message(), "error")))
        }
        Err(e) => {
            tracing::error!(person_name = %name, error = %e, "Import task panicked");
            Redirect::to(&format!("/?{}", Notice::query("The import stopped unexpectedly", "error")))
        }
    }
}

/// GET /results/{id} - filtered, paginated occurrences.
async fn results(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(filter): Query<OccurrenceFilter>,
    Query(paging): Query<PageQuery>,
    Query(notice): Query<Notice>,
) -> AppResult<Html<String>> {
    let (search, occurrences) = load_search(&state, id).await?;

    let facets = Facets::from_records(&occurrences);
    let page = filtered_page(&state, occurrences, &filter, paging);

    Ok(Html(formatters::html::results_page(&search, &page, &facets, &filter, &notice)))
}

/// GET /api/searches/{id}/occurrences - the same view as JSON.
async fn api_occurrences(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(filter): Query<OccurrenceFilter>,
    Query(paging): Query<PageQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let (search, occurrences) = load_search(&state, id).await?;
    let page = filtered_page(&state, occurrences, &filter, paging);

    Ok(Json(formatters::occurrence_page(&search, &page)))
}

/// GET /export/{id} - filtered occurrences as a CSV attachment.
async fn export_csv(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(filter): Query<OccurrenceFilter>,
) -> AppResult<Response> {
    let (_, occurrences) = load_search(&state, id).await?;
    let occurrences = filter.apply(occurrences);

    let body = export::format_csv(&occurrences);
    let filename = export::export_filename(id, chrono::Utc::now());
    tracing::info!(search_id = id, rows = occurrences.len(), %filename, "Exporting CSV");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={filename}")),
        ],
        body,
    )
        .into_response())
}

/// POST /delete/{id} - remove a search and its occurrences.
async fn delete_search(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let search = state
        .db
        .get_search(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("search {id}")))?;

    state.db.delete_search(id).await?;
    tracing::info!(search_id = id, "Deleted search");

    let message = format!("Search \"{}\" deleted successfully", search.person_name);
    Ok(Redirect::to(&format!("/?{}", Notice::query(&message, "success"))))
}

async fn load_search(state: &AppState, id: i64) -> AppResult<(Search, Vec<StoredOccurrence>)> {
    let search = state
        .db
        .get_search(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("search {id}")))?;
    let occurrences = state.db.occurrences_for_search(id).await?;
    Ok((search, occurrences))
}

fn filtered_page(
    state: &AppState,
    occurrences: Vec<StoredOccurrence>,
    filter: &OccurrenceFilter,
    paging: PageQuery,
) -> Page<StoredOccurrence> {
    let matching = filter.apply(occurrences);
    Page::paginate(matching, paging.page.unwrap_or(1), state.config.results_per_page)
}
