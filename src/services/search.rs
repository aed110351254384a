use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use crate::{
    db::ClientKey,
    models::MediaItem,
    services::{providers::MetadataProvider, ClientContext},
};

/// Results kept for the search dropdown
pub const SEARCH_RESULT_LIMIT: usize = 6;

/// Terms kept in a client's search history
pub const RECENT_SEARCH_LIMIT: usize = 5;

/// What the search box should currently show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchState {
    /// Nothing to show: initial state, or the input is too short
    Empty,
    Results { query: String, items: Vec<MediaItem> },
    Failed { query: String, message: String },
}

/// Search-as-you-type with a quiescence window
///
/// Every [`input`](DebouncedSearch::input) starts a new generation. A request
/// is only issued once the window passes without further input, and a result
/// is only published if no newer input arrived while it was in flight. The
/// superseded request itself is left to finish.
pub struct DebouncedSearch {
    provider: Arc<dyn MetadataProvider>,
    window: Duration,
    min_chars: usize,
    generation: Arc<AtomicU64>,
    state_tx: Arc<watch::Sender<SearchState>>,
}

impl DebouncedSearch {
    pub fn new(provider: Arc<dyn MetadataProvider>, window: Duration, min_chars: usize) -> Self {
        let (state_tx, _) = watch::channel(SearchState::Empty);
        Self {
            provider,
            window,
            min_chars,
            generation: Arc::new(AtomicU64::new(0)),
            state_tx: Arc::new(state_tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> SearchState {
        self.state_tx.borrow().clone()
    }

    /// Feeds the latest text of the search box; returns its generation
    pub fn input(&self, text: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = text.trim().to_string();

        if query.chars().count() < self.min_chars {
            self.state_tx.send_replace(SearchState::Empty);
            return generation;
        }

        let provider = self.provider.clone();
        let current = self.generation.clone();
        let state_tx = self.state_tx.clone();
        let window = self.window;

        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            let result = provider.search_multi(&query).await;

            let state = match result {
                Ok(page) => SearchState::Results {
                    items: page
                        .results
                        .into_iter()
                        .filter(|item| !item.is_person())
                        .take(SEARCH_RESULT_LIMIT)
                        .collect(),
                    query,
                },
                Err(e) => {
                    tracing::warn!(error = %e, query = %query, "Search failed");
                    SearchState::Failed {
                        message: e.to_string(),
                        query,
                    }
                }
            };

            let applied = state_tx.send_if_modified(|slot| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = state;
                true
            });
            if !applied {
                tracing::debug!(generation, "Discarding superseded search result");
            }
        });

        generation
    }
}

/// The client's recent search terms, most recent first
pub async fn recent_searches(ctx: &ClientContext) -> Vec<String> {
    match ctx.load::<Vec<String>>(ClientKey::RecentSearches).await {
        Ok(terms) => terms.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(client_id = %ctx.client_id(), error = %e, "Recent searches unavailable");
            Vec::new()
        }
    }
}

/// Moves `term` to the front of the history, dropping duplicates and the
/// oldest entries past [`RECENT_SEARCH_LIMIT`]
pub async fn remember_search(ctx: &ClientContext, term: &str) -> Vec<String> {
    let term = term.trim();
    let history = recent_searches(ctx).await;
    if term.is_empty() {
        return history;
    }

    let updated: Vec<String> = std::iter::once(term.to_string())
        .chain(history.into_iter().filter(|t| t != term))
        .take(RECENT_SEARCH_LIMIT)
        .collect();

    if let Err(e) = ctx.save(ClientKey::RecentSearches, &updated).await {
        tracing::warn!(client_id = %ctx.client_id(), error = %e, "Failed to save recent searches");
    }

    updated
}
