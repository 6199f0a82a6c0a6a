//! Smart Search
//!
//! View-local semantic search state. Independent of the task store: a search never
//! touches the task list.

use serde::{Deserialize, Serialize};

use crate::backend::SemanticSearch;
use crate::domain::{Priority, TaskId, TaskStatus};
use crate::error::BackendError;

/// Results at or below this similarity are not shown
pub const SIMILARITY_FLOOR: f64 = 0.3;

/// One ranked hit from `smart-search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Cosine similarity in [0, 1]
    pub similarity: f64,
}

impl SearchResult {
    /// Similarity as a whole percentage for display
    pub fn match_percent(&self) -> u32 {
        (self.similarity * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

/// Drop low-confidence hits, keeping the remote ranking order
pub fn filter_relevant(results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.into_iter().filter(|r| r.similarity > SIMILARITY_FLOOR).collect()
}

/// Mutually exclusive display phases of the search panel
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    /// Finished search; may be empty
    Results(Vec<SearchResult>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPanel {
    pub phase: SearchPhase,
    /// Message from the last failed search
    pub error: Option<String>,
}

impl SearchPanel {
    pub fn is_searching(&self) -> bool {
        matches!(self.phase, SearchPhase::Searching)
    }

    /// Enter the searching phase. Returns the trimmed query to send, or `None` when
    /// the query is blank or a search is already running.
    pub fn begin(&mut self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() || self.is_searching() {
            return None;
        }
        self.phase = SearchPhase::Searching;
        self.error = None;
        Some(query.to_string())
    }

    /// Apply the remote answer
    pub fn finish(&mut self, outcome: Result<Vec<SearchResult>, BackendError>) {
        match outcome {
            Ok(results) => {
                let shown = filter_relevant(results);
                log::debug!("[SEARCH] {} results above floor", shown.len());
                self.phase = SearchPhase::Results(shown);
            }
            Err(e) => {
                log::warn!("[SEARCH] search failed: {}", e);
                self.error = Some(e.to_string());
                self.phase = SearchPhase::Results(Vec::new());
            }
        }
    }

    pub fn results(&self) -> Option<&[SearchResult]> {
        match &self.phase {
            SearchPhase::Results(results) => Some(results),
            _ => None,
        }
    }
}

/// Run one search end to end against `backend`
pub async fn run_search<S: SemanticSearch + ?Sized>(
    panel: &mut SearchPanel,
    backend: &S,
    query: &str,
    user_id: Option<&str>,
) {
    let Some(query) = panel.begin(query) else {
        return;
    };
    let outcome = backend.smart_search(&query, user_id).await;
    panel.finish(outcome);
}
