//! Product search: wire types, the search backend seam and the debounced
//! session the search panel drives.

mod debounce;
mod http;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SearchConfig;
use crate::element::ImageSource;

pub use debounce::Debouncer;
pub use http::{HttpProductSearch, parse_response};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Search service returned status {0}")]
    Status(u16),
    #[error("Malformed search response: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Product ids arrive as numbers or strings depending on the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{n}"),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

/// One search result. Unknown fields such as `price` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductHit {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl ProductHit {
    /// Hits without an image are listed but cannot be added to the board.
    pub fn is_selectable(&self) -> bool {
        self.image_url().is_some()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn image_source(&self) -> Option<ImageSource> {
        self.image_url().map(ImageSource::url)
    }
}

/// The backend may answer with a bare array or wrap it in `products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Wrapped { products: Vec<ProductHit> },
    Bare(Vec<ProductHit>),
}

impl SearchResponse {
    pub fn into_hits(self) -> Vec<ProductHit> {
        match self {
            SearchResponse::Wrapped { products } => products,
            SearchResponse::Bare(products) => products,
        }
    }
}

/// Anything that can answer a product query. Implementations block; the
/// session runs them off the UI thread.
pub trait ProductSearch: Send + Sync {
    fn search(&self, query: &str, per_page: u32) -> Result<Vec<ProductHit>, SearchError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// What the search panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub status: SearchStatus,
    pub results: Vec<ProductHit>,
}

struct SearchState {
    query: String,
    status: SearchStatus,
    results: Vec<ProductHit>,
    /// Sequence number of the newest dispatched request
    latest_seq: u64,
}

/// A query whose debounce delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
    pub per_page: u32,
}

impl SearchRequest {
    pub fn execute(self, backend: &dyn ProductSearch) -> SearchReply {
        debug!("Searching products for {:?} (#{})", self.query, self.seq);
        let outcome = backend.search(&self.query, self.per_page);
        SearchReply {
            seq: self.seq,
            query: self.query,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct SearchReply {
    pub seq: u64,
    pub query: String,
    pub outcome: Result<Vec<ProductHit>, SearchError>,
}

/// Debounced product search.
///
/// Every dispatched request carries a sequence number; a reply is only
/// applied if no newer request has been dispatched since, so a slow stale
/// response can never overwrite a fresher one.
pub struct SearchSession {
    backend: Arc<dyn ProductSearch>,
    per_page: u32,
    debouncer: Debouncer<String>,
    state: Arc<Mutex<SearchState>>,
    next_seq: u64,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn ProductSearch>, config: &SearchConfig) -> Self {
        Self {
            backend,
            per_page: config.per_page,
            debouncer: Debouncer::new(config.debounce()),
            state: Arc::new(Mutex::new(SearchState {
                query: String::new(),
                status: SearchStatus::Idle,
                results: Vec::new(),
                latest_seq: 0,
            })),
            next_seq: 0,
        }
    }

    /// Records a keystroke. A blank query clears results immediately and
    /// never reaches the backend.
    pub fn set_query(&mut self, query: &str, now: Instant) {
        let mut state = self.state.lock();
        if state.query == query {
            return;
        }
        state.query = query.to_owned();

        if query.trim().is_empty() {
            self.debouncer.cancel();
            // Invalidate anything still in flight
            self.next_seq += 1;
            state.latest_seq = self.next_seq;
            state.status = SearchStatus::Idle;
            state.results.clear();
        } else {
            self.debouncer.schedule(query.trim().to_owned(), now);
        }
    }

    /// Returns the request to dispatch once the debounce delay has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        let query = self.debouncer.take_ready(now)?;
        self.next_seq += 1;

        let mut state = self.state.lock();
        state.latest_seq = self.next_seq;
        state.status = SearchStatus::Loading;
        Some(SearchRequest {
            seq: self.next_seq,
            query,
            per_page: self.per_page,
        })
    }

    /// Applies a reply unless it has been superseded. Returns whether it was
    /// applied.
    pub fn apply(&self, reply: SearchReply) -> bool {
        apply_reply(&self.state, reply)
    }

    /// Runs `request` on a worker thread and applies the reply there.
    /// `notify` runs afterwards so the host can repaint.
    pub fn spawn(&self, request: SearchRequest, notify: impl FnOnce() + Send + 'static) {
        let backend = self.backend.clone();
        let state = self.state.clone();
        std::thread::spawn(move || {
            let reply = request.execute(backend.as_ref());
            apply_reply(&state, reply);
            notify();
        });
    }

    pub fn backend(&self) -> &dyn ProductSearch {
        self.backend.as_ref()
    }

    /// When the pending query becomes due, if one is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.lock();
        SearchSnapshot {
            query: state.query.clone(),
            status: state.status.clone(),
            results: state.results.clone(),
        }
    }
}

fn apply_reply(state: &Mutex<SearchState>, reply: SearchReply) -> bool {
    let mut state = state.lock();
    if reply.seq != state.latest_seq {
        debug!("Dropping stale search reply #{} for {:?}", reply.seq, reply.query);
        return false;
    }
    match reply.outcome {
        Ok(hits) => {
            info!("Search {:?} returned {} products", reply.query, hits.len());
            state.results = hits;
            state.status = SearchStatus::Ready;
        }
        Err(e) => {
            warn!("Search {:?} failed: {}", reply.query, e);
            state.results.clear();
            state.status = SearchStatus::Failed(e.to_string());
        }
    }
    true
}
