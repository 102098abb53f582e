//! Tab selection event DTO.

use serde::{Deserialize, Serialize};

use crate::ids::TabId;

/// Why a tab became selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionCause {
    /// Direct user choice.
    User,
    /// A newly created tab took focus.
    New,
    /// The previously selected tab was closed.
    Close,
    /// The embedder is shutting a collection down.
    Exit,
    /// A closed tab was restored.
    Undo,
}

/// A tab selection reported by the embedder's tab model.
///
/// Producers: platform selection bridges (via [`crate::SelectionFeed`]).
/// Consumers: overview coordinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    /// The tab that became selected.
    pub tab: TabId,
    /// Timestamp in milliseconds since epoch.
    pub timestamp_ms: i64,
    /// What caused the selection.
    pub cause: SelectionCause,
}

impl SelectionEvent {
    /// Create an event stamped with the current wall time.
    pub fn now(tab: TabId, cause: SelectionCause) -> Self {
        Self {
            tab,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            cause,
        }
    }
}
