use crate::document::Document;
use crate::engine::{Query, SearchEngine, SearchPage, SortMode};
use crate::filter::DateRange;
use crate::params::{parse_page, UrlState};
use crate::session::{RecentSearches, RECENT_SEARCHES_KEY, TRENDING_TOPICS};
use crate::storage::KeyValueStore;
use axum::{
    extract::{Path, Query as QueryParams, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub store: Arc<dyn KeyValueStore>,
    /// Serialises load-record-save cycles on the recent-search list
    recent_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(engine: Arc<SearchEngine>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            engine,
            store,
            recent_lock: Arc::new(Mutex::new(())),
        }
    }

    fn recent(&self) -> anyhow::Result<RecentSearches> {
        RecentSearches::load(self.store.as_ref(), self.engine.config().recent_capacity)
    }

    /// Record `term` and return the updated list
    pub async fn record_search(&self, term: &str) -> anyhow::Result<Vec<String>> {
        let _guard = self.recent_lock.lock().await;
        let mut recent = self.recent()?;
        if recent.record(term) {
            recent.save(self.store.as_ref())?;
        }
        Ok(recent.entries().to_vec())
    }

    pub async fn clear_searches(&self) -> anyhow::Result<()> {
        let _guard = self.recent_lock.lock().await;
        self.store.remove(RECENT_SEARCHES_KEY)
    }
}

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date_range: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Kept as text so malformed values fall back instead of failing the request
    #[serde(default)]
    pub page: Option<String>,
}

impl SearchRequest {
    fn to_query(&self) -> Query {
        Query {
            text: self.q.clone(),
            category: self.category.clone(),
            date_range: self
                .date_range
                .as_deref()
                .map(DateRange::parse)
                .unwrap_or_default(),
            sort: self.sort_by.as_deref().map(SortMode::parse).unwrap_or_default(),
        }
    }

    fn page(&self) -> usize {
        self.page.as_deref().map_or(1, parse_page)
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordSearchRequest {
    pub term: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    #[serde(flatten)]
    pub page: SearchPage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub category: String,
    pub date: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    pub featured: bool,
}

impl From<&Document> for PostSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            excerpt: doc.excerpt.clone(),
            category: doc.category.clone(),
            date: doc.date.clone(),
            tags: doc.tags.clone(),
            read_time: doc.read_time.clone(),
            featured: doc.featured,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub posts: Vec<PostSummary>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.0);
        tracing::error!("API error: {}", message);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(message)),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn search_posts(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let query = req.to_query();
    let page = state.engine.search_page(&query, req.page());

    if !query.is_blank() {
        state.record_search(&query.text).await?;
    }

    Ok(Json(ApiResponse::success(SearchResponse {
        query: req.q,
        page,
    })))
}

async fn list_posts(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let raw = query.as_deref().unwrap_or_default();
    let url_state = UrlState::parse(raw, state.engine.corpus());
    let listing = state.engine.browse(&url_state.to_listing_query());

    Ok(Json(ApiResponse::success(ListingResponse {
        posts: listing.posts.into_iter().map(PostSummary::from).collect(),
        total: listing.total,
        page: listing.page,
        total_pages: listing.total_pages,
    })))
}

async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.engine.corpus().find_by_slug(&slug) {
        Some(doc) => Json(ApiResponse::success(doc.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("Post '{}' not found", slug))),
        )
            .into_response(),
    }
}

async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let categories: Vec<String> = state
        .engine
        .corpus()
        .categories()
        .into_iter()
        .map(String::from)
        .collect();
    Json(ApiResponse::success(categories))
}

async fn trending() -> impl IntoResponse {
    Json(ApiResponse::success(TRENDING_TOPICS.to_vec()))
}

async fn get_recent(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let recent = state.recent()?;
    Ok(Json(ApiResponse::success(recent.entries().to_vec())))
}

async fn record_recent(
    State(state): State<AppState>,
    Json(req): Json<RecordSearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.record_search(&req.term).await?;
    Ok(Json(ApiResponse::success(entries)))
}

async fn clear_recent(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.clear_searches().await?;
    Ok(Json(ApiResponse::success("Recent searches cleared")))
}

// ========== Router ==========

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search_posts))
        .route("/posts", get(list_posts))
        .route("/posts/:slug", get(get_post))
        .route("/categories", get(list_categories))
        .route("/trending", get(trending))
        .route("/recent", get(get_recent).post(record_recent).delete(clear_recent))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(SearchEngine::builtin().unwrap());
        let router = create_router(AppState::new(engine, store.clone()));
        (router, store)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app();
        let (status, body) = send(router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_search_records_recent() {
        let (router, store) = app();
        let (status, body) = send(router.clone(), get("/search?q=ethereum&sortBy=nonsense")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["hits"][0]["id"], 1);
        assert_eq!(body["data"]["hits"][0]["bestMatch"], true);
        assert_eq!(body["data"]["page"], 1);

        assert_eq!(store.get(RECENT_SEARCHES_KEY).unwrap().as_deref(), Some("[\"ethereum\"]"));

        let (_, body) = send(router, get("/search?q=&category=DeFi")).await;
        assert_eq!(body["data"]["totalMatches"], 0);
        assert_eq!(store.get(RECENT_SEARCHES_KEY).unwrap().as_deref(), Some("[\"ethereum\"]"));
    }

    #[tokio::test]
    async fn test_listing_and_post() {
        let (router, _) = app();
        let (_, body) = send(router.clone(), get("/posts?page=2")).await;
        assert_eq!(body["data"]["total"], 8);
        assert_eq!(body["data"]["totalPages"], 2);
        assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 2);

        let slug = "/posts/defi-2-evolution-decentralized-finance";
        let (status, body) = send(router.clone(), get(slug)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["category"], "DeFi");

        let (status, body) = send(router, get("/posts/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_recent_endpoints() {
        let (router, _) = app();
        let post = Request::builder()
            .method(Method::POST)
            .uri("/recent")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"term": "staking"}"#))
            .unwrap();
        let (_, body) = send(router.clone(), post).await;
        assert_eq!(body["data"], serde_json::json!(["staking"]));

        let delete = Request::builder()
            .method(Method::DELETE)
            .uri("/recent")
            .body(Body::empty())
            .unwrap();
        send(router.clone(), delete).await;

        let (_, body) = send(router, get("/recent")).await;
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_page_falls_back() {
        let (router, _) = app();
        for uri in ["/posts?page=abc", "/posts?page=-1", "/posts?page=0"] {
            let (status, body) = send(router.clone(), get(uri)).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["data"]["page"], 1, "{uri}");
            assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 6, "{uri}");
        }

        let (status, body) = send(router.clone(), get("/search?q=the&page=2nd")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["page"], 2);
        assert_eq!(body["data"]["hits"].as_array().unwrap().len(), 2);

        let (status, body) = send(router, get("/search?q=defi&page=abc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["page"], 1);
    }

    #[tokio::test]
    async fn test_listing_drops_unknown_category() {
        let (router, _) = app();
        let (status, body) = send(router.clone(), get("/posts?category=Memecoins")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 8);

        let (_, body) = send(router, get("/posts?category=DeFi")).await;
        assert_eq!(body["data"]["total"], 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(SearchEngine::builtin().unwrap());
        let state = AppState::new(engine, store);

        let terms = ["defi", "nft", "dao", "zk", "staking"];
        let tasks: Vec<_> = terms
            .iter()
            .copied()
            .map(|term| {
                let state = state.clone();
                tokio::spawn(async move { state.record_search(term).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut entries = state.recent().unwrap().entries().to_vec();
        entries.sort();
        let mut expected: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        expected.sort();
        assert_eq!(entries, expected);

        state.clear_searches().await.unwrap();
        assert!(state.recent().unwrap().entries().is_empty());
    }

    #[tokio::test]
    async fn test_categories_and_trending() {
        let (router, _) = app();
        let (_, body) = send(router.clone(), get("/categories")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 8);

        let (_, body) = send(router, get("/trending")).await;
        assert_eq!(body["data"][2], "Layer 2");
    }
}
