//! HTTP surface for the search service
//!
//! One endpoint per mode plus a health check and a small demo page. All
//! handlers share one immutable catalog store; each request runs its own
//! independent search pipeline.

use crate::error::AppError;
use crate::search::{Mode, SearchEngine};
use crate::store::MemoryStore;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Shared server state: the loaded catalog
#[derive(Clone)]
struct AppState {
    store: Arc<MemoryStore>,
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

/// Load the catalog and serve the search API until interrupted
pub async fn run(host: &str, port: u16, catalog: &Path) -> anyhow::Result<()> {
    let store = MemoryStore::load(catalog)
        .map_err(|e| anyhow::anyhow!("failed to load catalog: {}", e))?;

    let state = AppState {
        store: Arc::new(store),
    };

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("medsearch listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(demo_page))
        .route("/health", get(health))
        .route("/search/prefix", get(search_prefix))
        .route("/search/substring", get(search_substring))
        .route("/search/smart", get(search_smart))
        // legacy wire name for smart mode
        .route("/search/fulltext", get(search_smart))
        .route("/search/fuzzy", get(search_fuzzy))
        .with_state(state)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": self.error_code(),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "medicines_count": state.store.len(),
    }))
}

async fn search_prefix(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    run_search(&state, Mode::Prefix, &params.q)
}

async fn search_substring(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    run_search(&state, Mode::Substring, &params.q)
}

async fn search_smart(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    run_search(&state, Mode::Smart, &params.q)
}

async fn search_fuzzy(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    run_search(&state, Mode::Fuzzy, &params.q)
}

fn run_search(state: &AppState, mode: Mode, q: &str) -> Result<Response, AppError> {
    let engine = SearchEngine::new(Arc::clone(&state.store));
    let response = engine.search(mode, q)?;
    Ok(Json(response).into_response())
}

async fn demo_page() -> Html<&'static str> {
    Html(DEMO_PAGE)
}

const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Medicine Search</title>
</head>
<body>
  <h1>Medicine Search</h1>
  <input id="q" type="text" placeholder="Search medicines..." autofocus>
  <select id="mode">
    <option value="prefix">Prefix</option>
    <option value="substring">Substring</option>
    <option value="smart" selected>Smart</option>
    <option value="fuzzy">Fuzzy</option>
  </select>
  <button onclick="go()">Search</button>
  <pre id="out"></pre>
  <script>
    async function go() {
      const q = document.getElementById('q').value;
      const mode = document.getElementById('mode').value;
      const res = await fetch(`/search/${mode}?q=${encodeURIComponent(q)}`);
      document.getElementById('out').textContent =
        JSON.stringify(await res.json(), null, 2);
    }
    document.getElementById('q').addEventListener('keypress', e => {
      if (e.key === 'Enter') go();
    });
  </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Medicine;

    fn test_state() -> AppState {
        AppState {
            store: Arc::new(MemoryStore::from_records(vec![
                Medicine::named("Paracetamol 500mg"),
                Medicine::named("Ibuprofen 200mg"),
            ])),
        }
    }

    #[test]
    fn test_run_search_ok() {
        let state = test_state();
        assert!(run_search(&state, Mode::Prefix, "para").is_ok());
    }

    #[test]
    fn test_run_search_invalid_query() {
        let state = test_state();
        assert!(matches!(
            run_search(&state, Mode::Prefix, "  "),
            Err(AppError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_health_reports_count() {
        let Json(body) = health(State(test_state())).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["medicines_count"], 2);
    }

    #[test]
    fn test_error_status_codes() {
        let bad = AppError::InvalidQuery("x".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let down = AppError::StoreUnavailable("x".into()).into_response();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
