use crate::corpus::Corpus;
use crate::document::Document;
use crate::filter::{apply_filters, DateRange};
use crate::listing::{browse, Listing, ListingQuery};
use crate::ranking::{rank_documents, ScoredDocument, Scorer, Weights};
use crate::tokenizer::Tokenizer;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 6;
pub const DEFAULT_BEST_MATCH_THRESHOLD: u32 = 20;
pub const DEFAULT_RECENT_CAPACITY: usize = 5;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortMode {
    /// Score descending
    #[default]
    Relevance,
    /// Publication date descending, undated posts last
    Date,
}

impl SortMode {
    /// Parse leniently; anything unrecognised means `Relevance`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" | "latest" | "newest" | "date-desc" | "date_desc" => Self::Date,
            _ => Self::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
        }
    }
}

impl From<String> for SortMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortMode> for String {
    fn from(value: SortMode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default)]
    pub text: String,
    /// `None`, blank or "all" disables the category filter
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default, alias = "sortBy")]
    pub sort: SortMode,
}

impl Query {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Full ordered match list for one query
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    pub results: Vec<ScoredDocument<'a>>,
    pub total_matches: usize,
}

impl<'a> SearchResult<'a> {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            total_matches: 0,
        }
    }

    /// One page of the results (1-indexed)
    pub fn page(&self, page: usize, page_size: usize) -> &[ScoredDocument<'a>] {
        paginate(&self.results, page, page_size)
    }
}

/// Score, filter and sort `corpus` for `query` as of `today`.
///
/// Pure: identical inputs always give identical, identically ordered output.
/// Blank query text yields no results regardless of filters.
pub fn search<'a>(
    corpus: &'a Corpus,
    query: &Query,
    today: NaiveDate,
    scorer: &Scorer,
) -> SearchResult<'a> {
    let terms = Tokenizer::new().analyze(&query.text);
    if terms.is_empty() {
        return SearchResult::empty();
    }

    let scored = rank_documents(&terms, corpus, scorer);
    let mut results = apply_filters(scored, query.category.as_deref(), query.date_range, today);
    sort_results(&mut results, query.sort);

    SearchResult {
        total_matches: results.len(),
        results,
    }
}

/// Stable sort; equal keys keep corpus order
pub fn sort_results(results: &mut [ScoredDocument<'_>], mode: SortMode) {
    match mode {
        SortMode::Relevance => results.sort_by(|a, b| b.score.cmp(&a.score)),
        SortMode::Date => results.sort_by(|a, b| newest_first(a.document, b.document)),
    }
}

fn newest_first(a: &Document, b: &Document) -> Ordering {
    match (a.published_on(), b.published_on()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Slice out page `page` (1-indexed); out-of-range pages are empty
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `total` items
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Tunables shared by the engine and its callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub page_size: usize,
    pub best_match_threshold: u32,
    pub recent_capacity: usize,
    #[serde(with = "millis")]
    pub debounce: Duration,
    pub weights: Weights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            best_match_threshold: DEFAULT_BEST_MATCH_THRESHOLD,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            debounce: DEFAULT_DEBOUNCE,
            weights: Weights::default(),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Owned summary of one hit, detached from the corpus borrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub category: String,
    pub date: String,
    pub tags: Vec<String>,
    pub score: u32,
    pub best_match: bool,
}

impl SearchHit {
    pub fn from_scored(scored: &ScoredDocument<'_>, best_match_threshold: u32) -> Self {
        let doc = scored.document;
        Self {
            id: doc.id,
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            excerpt: doc.excerpt.clone(),
            category: doc.category.clone(),
            date: doc.date.clone(),
            tags: doc.tags.clone(),
            score: scored.score,
            best_match: scored.is_best_match(best_match_threshold),
        }
    }
}

/// One page of hits plus the totals needed to render pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub total_matches: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Main search engine: an immutable corpus plus configuration.
///
/// Holds no per-query state; each call captures `today` once and delegates to
/// the pure [`search`] function.
pub struct SearchEngine {
    corpus: Arc<Corpus>,
    scorer: Scorer,
    config: EngineConfig,
}

impl SearchEngine {
    pub fn new(corpus: Corpus, config: EngineConfig) -> Self {
        Self::from_shared(Arc::new(corpus), config)
    }

    pub fn from_shared(corpus: Arc<Corpus>, config: EngineConfig) -> Self {
        Self {
            corpus,
            scorer: Scorer::new(config.weights),
            config,
        }
    }

    /// Engine over the bundled sample posts with default settings
    pub fn builtin() -> anyhow::Result<Self> {
        Ok(Self::new(Corpus::builtin()?, EngineConfig::default()))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search as of the local calendar date
    pub fn search(&self, query: &Query) -> SearchResult<'_> {
        self.search_at(query, Local::now().date_naive())
    }

    pub fn search_at(&self, query: &Query, today: NaiveDate) -> SearchResult<'_> {
        let result = search(&self.corpus, query, today, &self.scorer);
        tracing::debug!(
            query = %query.text,
            category = ?query.category,
            date_range = %query.date_range,
            sort = %query.sort,
            matches = result.total_matches,
            "search"
        );
        result
    }

    /// One owned page of hits as of the local calendar date
    pub fn search_page(&self, query: &Query, page: usize) -> SearchPage {
        self.search_page_at(query, page, Local::now().date_naive())
    }

    pub fn search_page_at(&self, query: &Query, page: usize, today: NaiveDate) -> SearchPage {
        let result = self.search_at(query, today);
        let threshold = self.config.best_match_threshold;

        SearchPage {
            hits: result
                .page(page, self.config.page_size)
                .iter()
                .map(|sd| SearchHit::from_scored(sd, threshold))
                .collect(),
            total_matches: result.total_matches,
            page,
            total_pages: page_count(result.total_matches, self.config.page_size),
        }
    }

    /// Listing-page view: category plus plain substring match, no scoring
    pub fn browse(&self, query: &ListingQuery) -> Listing<'_> {
        browse(&self.corpus, query, self.config.page_size)
    }
}
