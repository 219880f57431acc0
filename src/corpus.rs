use crate::document::Document;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

const BUILTIN_POSTS: &str = include_str!("../data/posts.json");

/// Reasons a set of posts cannot form a corpus
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorpusError {
    #[error("duplicate post id {0}")]
    DuplicateId(u64),
    #[error("post {id} has an empty {field}")]
    EmptyField { id: u64, field: &'static str },
}

/// Immutable, ordered collection of posts.
///
/// Corpus order is significant: it is the tie-breaker for every sort.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Build a corpus, rejecting duplicate ids and empty text fields
    pub fn from_documents(documents: Vec<Document>) -> Result<Self, CorpusError> {
        let mut seen = HashSet::with_capacity(documents.len());

        for doc in &documents {
            if !seen.insert(doc.id) {
                return Err(CorpusError::DuplicateId(doc.id));
            }
            for (field, value) in [
                ("title", &doc.title),
                ("excerpt", &doc.excerpt),
                ("content", &doc.content),
            ] {
                if value.trim().is_empty() {
                    return Err(CorpusError::EmptyField { id: doc.id, field });
                }
            }
        }

        Ok(Self { documents })
    }

    /// Load a JSON array of posts, gunzipping when the path ends in `.gz`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open corpus {}", path.display()))?;

        let reader: Box<dyn Read> = if path.extension().map_or(false, |ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let documents: Vec<Document> = serde_json::from_reader(BufReader::new(reader))
            .with_context(|| format!("Failed to parse corpus {}", path.display()))?;

        let corpus = Self::from_documents(documents)?;
        tracing::info!("Loaded {} posts from {}", corpus.len(), path.display());
        Ok(corpus)
    }

    /// The sample posts bundled with the crate
    pub fn builtin() -> Result<Self> {
        let documents: Vec<Document> =
            serde_json::from_str(BUILTIN_POSTS).context("Failed to parse bundled posts")?;
        Ok(Self::from_documents(documents)?)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.slug == slug)
    }

    /// Distinct categories in order of first appearance
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.documents
            .iter()
            .map(|d| d.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.documents.iter().any(|d| d.category == category)
    }

    pub fn featured(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.featured)
    }

    /// The first `n` posts in corpus order
    pub fn recent(&self, n: usize) -> &[Document] {
        &self.documents[..n.min(self.documents.len())]
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
