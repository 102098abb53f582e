//! Content margins derived from browser-controls geometry.
//!
//! Top and bottom control bars slide in and out; content below them
//! needs its margins updated on every geometry change.
//! [`ControlsMarginSupplier`] subscribes to a [`ControlsSource`],
//! recomputes [`Margins`] from each [`ControlsOffsets`] report and
//! publishes them through an observable supplier.

use std::sync::{Arc, Weak};

use tabshell_events::ObserverRegistry;
use tabshell_props::{ObservableSupplier, SupplierObserver};

/// Geometry of the top and bottom control bars, in pixels.
///
/// Offsets are scroll displacements: a fully visible top bar has
/// `top_offset == 0`, a fully scrolled-off one `-top_height`. The
/// bottom bar's offset grows positive as it scrolls off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsOffsets {
    pub top_height: i32,
    pub top_offset: i32,
    pub bottom_height: i32,
    pub bottom_offset: i32,
}

/// Margins the content area should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: i32,
    pub bottom: i32,
}

impl From<ControlsOffsets> for Margins {
    fn from(offsets: ControlsOffsets) -> Self {
        Self {
            top: offsets.top_height + offsets.top_offset,
            bottom: offsets.bottom_height - offsets.bottom_offset,
        }
    }
}

/// Receives controls geometry changes.
pub trait ControlsObserver: Send + Sync {
    fn on_controls_changed(&self, offsets: ControlsOffsets);
}

/// A stream of controls geometry changes.
pub trait ControlsSource: Send + Sync {
    fn subscribe(&self, observer: Arc<dyn ControlsObserver>);
    fn unsubscribe(&self, observer: &Arc<dyn ControlsObserver>);
}

/// Pass-through controls source backed by an `ObserverRegistry`.
pub struct ControlsFeed {
    observers: ObserverRegistry<dyn ControlsObserver>,
}

impl ControlsFeed {
    pub fn new() -> Self {
        Self {
            observers: ObserverRegistry::new(),
        }
    }

    pub fn emit(&self, offsets: ControlsOffsets) {
        self.observers
            .for_each(|observer| observer.on_controls_changed(offsets));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl ControlsSource for ControlsFeed {
    fn subscribe(&self, observer: Arc<dyn ControlsObserver>) {
        self.observers.add(observer);
    }

    fn unsubscribe(&self, observer: &Arc<dyn ControlsObserver>) {
        self.observers.remove(observer);
    }
}

impl Default for ControlsFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes up-to-date content [`Margins`] for the current controls
/// geometry. Subscribes at construction and seeds the supplier from
/// the initial geometry, so late observers catch up immediately.
pub struct ControlsMarginSupplier {
    source: Arc<dyn ControlsSource>,
    margins: ObservableSupplier<Margins>,
    bridge: Arc<dyn ControlsObserver>,
}

impl ControlsMarginSupplier {
    pub fn new(source: Arc<dyn ControlsSource>, initial: ControlsOffsets) -> Arc<Self> {
        let supplier = Arc::new_cyclic(|weak: &Weak<Self>| Self {
            source,
            margins: ObservableSupplier::with_value(Margins::from(initial)),
            bridge: Arc::new(ControlsBridge(weak.clone())),
        });
        supplier.source.subscribe(supplier.bridge.clone());
        supplier
    }

    /// Current margins.
    pub fn get(&self) -> Margins {
        // Seeded at construction and only ever replaced.
        self.margins.get().unwrap_or_default()
    }

    /// Observe margin changes; returns the current margins.
    pub fn add_observer(&self, observer: SupplierObserver<Margins>) -> Option<Margins> {
        self.margins.add_observer(observer)
    }

    pub fn remove_observer(&self, observer: &SupplierObserver<Margins>) {
        self.margins.remove_observer(observer)
    }

    /// Stop following the controls source.
    pub fn destroy(&self) {
        self.source.unsubscribe(&self.bridge);
    }

    fn handle_controls_changed(&self, offsets: ControlsOffsets) {
        let margins = Margins::from(offsets);
        tracing::trace!(top = margins.top, bottom = margins.bottom, "margins updated");
        self.margins.set(margins);
    }
}

struct ControlsBridge(Weak<ControlsMarginSupplier>);

impl ControlsObserver for ControlsBridge {
    fn on_controls_changed(&self, offsets: ControlsOffsets) {
        if let Some(supplier) = self.0.upgrade() {
            supplier.handle_controls_changed(offsets);
        }
    }
}
