//! Event-source traits and in-memory pass-through feeds.
//!
//! A *source* is the subscription surface a coordinator sees; a *feed*
//! is the concrete adapter an embedder drives by calling `emit` from
//! whatever native callback reports the event. Feeds forward every
//! event unfiltered, in observer registration order.

use std::sync::Arc;

use crate::ids::CollectionId;
use crate::registry::ObserverRegistry;
use crate::selection::SelectionEvent;

/// Receives tab selection events.
pub trait SelectionObserver: Send + Sync {
    fn on_tab_selected(&self, event: SelectionEvent);
}

/// A stream of tab selection events a coordinator can subscribe to.
pub trait SelectionSource: Send + Sync {
    fn subscribe(&self, observer: Arc<dyn SelectionObserver>);
    fn unsubscribe(&self, observer: &Arc<dyn SelectionObserver>);
}

/// Receives collection switch events.
pub trait CollectionSwitchObserver: Send + Sync {
    fn on_collection_switched(&self, collection: CollectionId);
}

/// A stream of collection switch events a coordinator can subscribe to.
pub trait CollectionSwitchSource: Send + Sync {
    fn subscribe(&self, observer: Arc<dyn CollectionSwitchObserver>);
    fn unsubscribe(&self, observer: &Arc<dyn CollectionSwitchObserver>);
}

/// Pass-through selection source backed by an [`ObserverRegistry`].
pub struct SelectionFeed {
    observers: ObserverRegistry<dyn SelectionObserver>,
}

impl SelectionFeed {
    pub fn new() -> Self {
        Self {
            observers: ObserverRegistry::new(),
        }
    }

    /// Forward `event` to every subscriber.
    pub fn emit(&self, event: SelectionEvent) {
        tracing::trace!(tab = %event.tab, cause = ?event.cause, "selection event");
        self.observers.for_each(|observer| observer.on_tab_selected(event));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl SelectionSource for SelectionFeed {
    fn subscribe(&self, observer: Arc<dyn SelectionObserver>) {
        self.observers.add(observer);
    }

    fn unsubscribe(&self, observer: &Arc<dyn SelectionObserver>) {
        self.observers.remove(observer);
    }
}

impl Default for SelectionFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Pass-through collection switch source backed by an [`ObserverRegistry`].
pub struct CollectionSwitchFeed {
    observers: ObserverRegistry<dyn CollectionSwitchObserver>,
}

impl CollectionSwitchFeed {
    pub fn new() -> Self {
        Self {
            observers: ObserverRegistry::new(),
        }
    }

    /// Forward a switch to `collection` to every subscriber.
    pub fn emit(&self, collection: CollectionId) {
        tracing::trace!(%collection, "collection switch");
        self.observers
            .for_each(|observer| observer.on_collection_switched(collection));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl CollectionSwitchSource for CollectionSwitchFeed {
    fn subscribe(&self, observer: Arc<dyn CollectionSwitchObserver>) {
        self.observers.add(observer);
    }

    fn unsubscribe(&self, observer: &Arc<dyn CollectionSwitchObserver>) {
        self.observers.remove(observer);
    }
}

impl Default for CollectionSwitchFeed {
    fn default() -> Self {
        Self::new()
    }
}
