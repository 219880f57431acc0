//! Debounced invocation for live-typing callers.
//!
//! The engine is synchronous and pure; this module only decides *when* to
//! call it. Each new input cancels the pending call and restarts the idle
//! timer.

use crate::engine::{Query, SearchEngine, SearchPage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Runs only the last of a burst of calls, once `delay` has passed without a new one
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `f`, cancelling whatever was scheduled before.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        }));
    }

    /// Drop the pending call, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Live search box: debounced queries published on a watch channel.
///
/// Receivers see `None` until the first search completes, and blank input
/// publishes an empty page straight away.
pub struct LiveSearch {
    engine: Arc<SearchEngine>,
    debouncer: Debouncer,
    results: Arc<watch::Sender<Option<SearchPage>>>,
}

impl LiveSearch {
    pub fn new(engine: Arc<SearchEngine>) -> (Self, watch::Receiver<Option<SearchPage>>) {
        let delay = engine.config().debounce;
        let (tx, rx) = watch::channel(None);
        (
            Self {
                engine,
                debouncer: Debouncer::new(delay),
                results: Arc::new(tx),
            },
            rx,
        )
    }

    /// Feed the current input; the search runs after the idle delay
    pub fn input(&mut self, query: Query) {
        if query.is_blank() {
            self.debouncer.cancel();
            self.results.send_replace(Some(SearchPage {
                hits: Vec::new(),
                total_matches: 0,
                page: 1,
                total_pages: 0,
            }));
            return;
        }

        let engine = Arc::clone(&self.engine);
        let results = Arc::clone(&self.results);
        self.debouncer.call(move || {
            let page = engine.search_page(&query, 1);
            tracing::debug!("Live search for '{}' found {}", query.text, page.total_matches);
            results.send_replace(Some(page));
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SearchPage>> {
        self.results.subscribe()
    }
}
