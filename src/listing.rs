//! Blog listing view.
//!
//! This is the "browse all" path that callers take instead of scoring: posts
//! are filtered by category and, when a search term is present, by a plain
//! substring match of the whole term. Corpus order is preserved.

use crate::corpus::Corpus;
use crate::document::{Document, LoweredFields};
use crate::engine::{page_count, paginate};
use crate::filter::matches_category;
use serde::{Deserialize, Serialize};

/// Listing filters as carried in the page URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: String,
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: String::new(),
            page: first_page(),
        }
    }
}

/// One page of the listing
#[derive(Debug, Clone)]
pub struct Listing<'a> {
    pub posts: Vec<&'a Document>,
    /// Posts matching the filters across all pages
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// True when `doc` should appear in a listing filtered by `term`
pub fn matches_term(doc: &Document, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    LoweredFields::of(doc).contains(&term.to_lowercase())
}

pub fn browse<'a>(corpus: &'a Corpus, query: &ListingQuery, page_size: usize) -> Listing<'a> {
    let matching: Vec<&Document> = corpus
        .iter()
        .filter(|doc| matches_category(doc, query.category.as_deref()))
        .filter(|doc| matches_term(doc, &query.search))
        .collect();

    Listing {
        posts: paginate(&matching, query.page, page_size).to_vec(),
        total: matching.len(),
        page: query.page,
        total_pages: page_count(matching.len(), page_size),
    }
}
