//! Deep-link query parameters (`category`, `search`, `page`).

use crate::corpus::Corpus;
use crate::filter::category_filter;
use crate::listing::ListingQuery;
use url::form_urlencoded;

/// Listing state as encoded in a URL query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: usize,
}

impl UrlState {
    /// Decode a query string (with or without the leading `?`).
    ///
    /// Unknown categories are dropped, and the page falls back to 1 when it is
    /// missing, unparsable or below 1.
    pub fn parse(query: &str, corpus: &Corpus) -> Self {
        let mut state = Self {
            page: 1,
            ..Self::default()
        };

        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match &*key {
                "category" if corpus.has_category(&value) => {
                    state.category = Some(value.into_owned())
                }
                "search" if !value.is_empty() => state.search = Some(value.into_owned()),
                "page" => state.page = parse_page(&value),
                _ => {}
            }
        }

        state
    }

    /// Encode, omitting defaults (no category, empty search, page 1)
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(category) = category_filter(self.category.as_deref()) {
            serializer.append_pair("category", category);
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            serializer.append_pair("search", search);
        }
        if self.page > 1 {
            serializer.append_pair("page", &self.page.to_string());
        }

        serializer.finish()
    }

    /// Path plus query string, or the bare path when everything is default
    pub fn href(&self, path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        }
    }

    pub fn to_listing_query(&self) -> ListingQuery {
        ListingQuery {
            category: self.category.clone(),
            search: self.search.clone().unwrap_or_default(),
            page: self.page.max(1),
        }
    }
}

/// Leading-integer page parse; anything else is page 1
pub fn parse_page(value: &str) -> usize {
    let value = value.trim();
    let digits_end = value
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(value.len(), |(i, _)| i);

    value[..digits_end].parse::<i64>().map_or(1, |n| n.max(1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::builtin().unwrap()
    }

    #[test]
    fn test_parse_full() {
        let state = UrlState::parse("?category=Layer+2&search=zk%20rollups&page=2", &corpus());
        assert_eq!(state.category.as_deref(), Some("Layer 2"));
        assert_eq!(state.search.as_deref(), Some("zk rollups"));
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let state = UrlState::parse("category=Memecoins", &corpus());
        assert_eq!(state.category, None);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_parse_page_fallbacks() {
        let corpus = corpus();
        assert_eq!(UrlState::parse("page=abc", &corpus).page, 1);
        assert_eq!(UrlState::parse("page=-4", &corpus).page, 1);
        assert_eq!(UrlState::parse("page=0", &corpus).page, 1);
        assert_eq!(UrlState::parse("page=3rd", &corpus).page, 3);
    }

    #[test]
    fn test_serialize_omits_defaults() {
        let state = UrlState {
            category: Some("All".to_string()),
            search: Some(String::new()),
            page: 1,
        };
        assert_eq!(state.to_query_string(), "");
        assert_eq!(state.href("/blog"), "/blog");

        let state = UrlState {
            category: Some("DeFi".to_string()),
            search: Some("yield farming".to_string()),
            page: 3,
        };
        assert_eq!(state.href("/blog"), "/blog?category=DeFi&search=yield+farming&page=3");
    }

    #[test]
    fn test_to_listing_query() {
        let state = UrlState::parse("search=dao&page=2", &corpus());
        let listing = state.to_listing_query();
        assert_eq!(listing.search, "dao");
        assert_eq!(listing.page, 2);
        assert_eq!(listing.category, None);
    }
}
