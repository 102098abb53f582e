//! Capabilities the overview coordinator is constructed with.

use tabshell_events::{CollectionId, TabId};

use crate::properties::Favicon;

/// A point-in-time view of the active tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSnapshot {
    pub id: TabId,
    pub title: String,
    pub url: String,
}

/// Read access to the embedder's current tab and collection.
pub trait ActiveTabProvider: Send + Sync {
    /// The currently selected tab, if any exists.
    fn active_tab(&self) -> Option<TabSnapshot>;
    /// The collection the embedder currently displays.
    fn active_collection(&self) -> CollectionId;
}

pub type VisualsCallback = Box<dyn FnOnce(Favicon) + Send>;

/// Asynchronous favicon lookup.
///
/// `done` is invoked later on the same logical thread as coordinator
/// operations, or never if the lookup fails.
pub trait VisualsProvider: Send + Sync {
    fn fetch_visuals(&self, url: &str, done: VisualsCallback);
}

/// Provider that reports no active tab. Useful in tests and during
/// embedder bring-up.
pub struct NullActiveTabProvider;

impl ActiveTabProvider for NullActiveTabProvider {
    fn active_tab(&self) -> Option<TabSnapshot> {
        None
    }

    fn active_collection(&self) -> CollectionId {
        CollectionId(0)
    }
}

/// Provider whose lookups never complete.
pub struct NullVisualsProvider;

impl VisualsProvider for NullVisualsProvider {
    fn fetch_visuals(&self, _url: &str, _done: VisualsCallback) {}
}
