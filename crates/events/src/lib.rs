//! Shared event contracts for tabshell components.
//!
//! This crate defines the formal contracts for events that flow between
//! the platform-facing adapters and the coordinators that consume them:
//! tab/collection ids, the selection event DTO, the ordered
//! [`ObserverRegistry`], and the per-event-family source traits with
//! their in-memory pass-through feeds. Feeds perform no filtering; an
//! embedder bridges its native emitter by calling `emit` on the feed.

mod feed;
mod ids;
mod registry;
mod selection;

pub use feed::{
    CollectionSwitchFeed, CollectionSwitchObserver, CollectionSwitchSource, SelectionFeed,
    SelectionObserver, SelectionSource,
};
pub use ids::{CollectionId, TabId};
pub use registry::ObserverRegistry;
pub use selection::{SelectionCause, SelectionEvent};
