use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use docsearch_core::{FileSource, SearchError, SearchHit, SearchIndex, SearchSession};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Path of the index artifact.
    pub index: PathBuf,
    /// Built site to serve for every non-API path.
    pub site: Option<PathBuf>,
    pub admin_token: Option<String>,
    /// Comma-separated allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl ServerConfig {
    /// Paths from the command line, secrets and CORS from `ADMIN_TOKEN` / `CORS_ALLOW_ORIGIN`.
    pub fn from_env(index: PathBuf, site: Option<PathBuf>) -> Self {
        Self {
            index,
            site,
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SearchSession<FileSource>>,
    /// Set once the single retry after a failed load has been spent.
    retried: Arc<AtomicBool>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(session: SearchSession<FileSource>, admin_token: Option<String>) -> Self {
        Self { session: Arc::new(session), retried: Arc::new(AtomicBool::new(false)), admin_token }
    }

    /// The session's index, retrying a failed load at most once per session.
    fn index(&self) -> Result<Arc<SearchIndex>, SearchError> {
        match self.session.index() {
            Err(err) if err.is_unavailable() && !self.retried.swap(true, Ordering::SeqCst) => {
                tracing::warn!(error = %err, "retrying search index load");
                self.session.retry()
            }
            other => other,
        }
    }
}

pub fn build_app(config: ServerConfig) -> Router {
    let session = SearchSession::new(FileSource::new(&config.index));
    let state = AppState::new(session, config.admin_token.clone());

    let cors = match config.cors_allow_origin.as_deref() {
        Some(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/search", get(search_handler))
        .route("/api/status", get(status_handler))
        .route("/api/doc/:doc_id", get(doc_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state);
    if let Some(site) = config.site {
        app = app.fallback_service(ServeDir::new(site));
    }
    app.layer(cors).layer(TraceLayer::new_for_http())
}

fn unavailable(err: SearchError) -> Response {
    let body = serde_json::json!({ "error": "search unavailable", "reason": err.to_string() });
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let start = std::time::Instant::now();
    let index = match state.index() {
        Ok(index) => index,
        Err(err) => return unavailable(err),
    };

    let results = index.search(&params.q);
    let total_hits = results.total();
    let words = results.words().to_vec();
    let k = params.k.clamp(1, 100);
    let results: Vec<SearchHit> = results
        .hits(k)
        .into_iter()
        .map(|mut hit| {
            hit.snippet = hit.snippet.map(|s| highlight_terms(&s, &words));
            hit
        })
        .collect();

    let took_ms = start.elapsed().as_secs_f64() * 1000.0;
    Json(SearchResponse { query: params.q, took_ms, total_hits, results }).into_response()
}

pub async fn status_handler(State(state): State<AppState>) -> Response {
    Json(state.session.status()).into_response()
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u32>) -> Response {
    let index = match state.index() {
        Ok(index) => index,
        Err(err) => return unavailable(err),
    };
    match index.document(doc_id) {
        Some(doc) => Json(doc).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))).into_response(),
    }
}

/// Drop the loaded index and load the artifact again, e.g. after a site rebuild.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, (StatusCode, String)> {
    authorize(&state, &headers)?;
    state.session.unload();
    state.retried.store(false, Ordering::SeqCst);
    Ok(match state.session.index() {
        Ok(_) => Json(state.session.status()).into_response(),
        Err(err) => unavailable(err),
    })
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML-escape a snippet and wrap every case-insensitive occurrence of the words in `<em>`.
pub fn highlight_terms(snippet: &str, words: &[String]) -> String {
    let alternatives: Vec<String> = words.iter().filter(|w| !w.trim().is_empty()).map(|w| regex::escape(w)).collect();
    if alternatives.is_empty() {
        return escape_html(snippet);
    }
    let Ok(pat) = regex::RegexBuilder::new(&alternatives.join("|")).case_insensitive(true).build() else {
        return escape_html(snippet);
    };
    let mut out = String::with_capacity(snippet.len() + 16);
    let mut last = 0;
    for m in pat.find_iter(snippet) {
        out.push_str(&escape_html(&snippet[last..m.start()]));
        out.push_str("<em>");
        out.push_str(&escape_html(m.as_str()));
        out.push_str("</em>");
        last = m.end();
    }
    out.push_str(&escape_html(&snippet[last..]));
    out
}
