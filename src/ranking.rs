use crate::corpus::Corpus;
use crate::document::{Document, LoweredFields};
use serde::{Deserialize, Serialize};

/// Field weights for relevance scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weights {
    /// Title contains the term
    pub title: u32,
    /// Title starts with the term, on top of `title`
    pub title_prefix: u32,
    pub excerpt: u32,
    /// Per occurrence in the content body
    pub content_occurrence: u32,
    /// Ceiling on the content contribution of a single term
    pub content_cap: u32,
    pub category: u32,
    /// Any tag contains the term
    pub tag: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            title: 10,
            title_prefix: 5,
            excerpt: 5,
            content_occurrence: 2,
            content_cap: 10,
            category: 8,
            tag: 6,
        }
    }
}

/// Additive weighted term scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    weights: Weights,
}

impl Scorer {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Calculate the relevance score of a document for lowercase query terms
    pub fn score(&self, query_terms: &[String], doc: &Document) -> u32 {
        self.score_fields(query_terms, &LoweredFields::of(doc))
    }

    fn score_fields(&self, query_terms: &[String], fields: &LoweredFields) -> u32 {
        let w = &self.weights;
        let mut score: u32 = 0;

        for term in query_terms {
            if fields.title.contains(term.as_str()) {
                score = score.saturating_add(w.title);
            }
            if fields.title.starts_with(term.as_str()) {
                score = score.saturating_add(w.title_prefix);
            }
            if fields.excerpt.contains(term.as_str()) {
                score = score.saturating_add(w.excerpt);
            }

            let occurrences = fields.content.matches(term.as_str()).count() as u32;
            let content = occurrences.saturating_mul(w.content_occurrence).min(w.content_cap);
            score = score.saturating_add(content);

            if fields.category.contains(term.as_str()) {
                score = score.saturating_add(w.category);
            }
            if fields.tags.iter().any(|tag| tag.contains(term.as_str())) {
                score = score.saturating_add(w.tag);
            }
        }

        score
    }
}

/// A corpus document paired with its score for one query
#[derive(Debug, Clone, Copy)]
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    pub score: u32,
    /// Index in the corpus, the tie-breaker for every ordering
    pub position: usize,
}

impl<'a> ScoredDocument<'a> {
    pub fn new(document: &'a Document, score: u32, position: usize) -> Self {
        Self {
            document,
            score,
            position,
        }
    }

    /// Presentational "best match" flag, strictly above the threshold
    pub fn is_best_match(&self, threshold: u32) -> bool {
        self.score > threshold
    }
}

/// Score every document and keep those with a positive score, in corpus order.
///
/// No terms means no results, never "everything scored zero".
pub fn rank_documents<'a>(
    query_terms: &[String],
    corpus: &'a Corpus,
    scorer: &Scorer,
) -> Vec<ScoredDocument<'a>> {
    if query_terms.is_empty() {
        return Vec::new();
    }

    corpus
        .iter()
        .enumerate()
        .filter_map(|(position, doc)| {
            let score = scorer.score(query_terms, doc);
            (score > 0).then(|| ScoredDocument::new(doc, score, position))
        })
        .collect()
}
