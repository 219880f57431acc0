use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Document represents a single blog post in the corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// ISO calendar date, kept as written so a malformed value never fails a load
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Document {
    pub fn new(id: u64, title: &str, excerpt: &str, content: &str, category: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            slug: slugify(title),
            excerpt: excerpt.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            tags: Vec::new(),
            date: String::new(),
            cover_image: None,
            read_time: None,
            featured: false,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.to_string();
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// Calendar date of the post, or `None` when missing or malformed.
    ///
    /// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps (truncated to the date).
    pub fn published_on(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}

/// Lowercased copies of the searchable fields, computed once per document per query
#[derive(Debug, Clone)]
pub struct LoweredFields {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl LoweredFields {
    pub fn of(doc: &Document) -> Self {
        Self {
            title: doc.title.to_lowercase(),
            excerpt: doc.excerpt.to_lowercase(),
            content: doc.content.to_lowercase(),
            category: doc.category.to_lowercase(),
            tags: doc.tags.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// True when `needle` occurs in any searchable field
    pub fn contains(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.excerpt.contains(needle)
            || self.content.contains(needle)
            || self.category.contains(needle)
            || self.tags.iter().any(|t| t.contains(needle))
    }
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
