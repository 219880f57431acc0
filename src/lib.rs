// Re-export main components
pub mod api;
pub mod config;
pub mod corpus;
pub mod debounce;
pub mod document;
pub mod engine;
pub mod filter;
pub mod listing;
pub mod params;
pub mod ranking;
pub mod session;
pub mod storage;
pub mod tokenizer;

// Re-export commonly used types
pub use corpus::{Corpus, CorpusError};
pub use debounce::{Debouncer, LiveSearch};
pub use document::Document;
pub use engine::{
    search, EngineConfig, Query, SearchEngine, SearchHit, SearchPage, SearchResult, SortMode,
};
pub use filter::DateRange;
pub use listing::{Listing, ListingQuery};
pub use params::UrlState;
pub use ranking::{ScoredDocument, Scorer, Weights};
pub use session::{RecentSearches, SearchSession};
pub use storage::{KeyValueStore, MemoryStore, SledStore};
pub use tokenizer::Tokenizer;

// Re-export error types
pub use anyhow::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
