//! Overview mediator: lifecycle, view-model population and selection
//! de-duplication.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tabshell_events::{
    CollectionId, CollectionSwitchObserver, CollectionSwitchSource, ObserverRegistry,
    SelectionEvent, SelectionObserver, SelectionSource, TabId,
};
use tabshell_props::{PropertyKey, PropertyModel, PropertyValue};

use crate::properties::{ClickCallback, CLICK_LISTENER, FAVICON, TITLE};
use crate::provider::{ActiveTabProvider, VisualsProvider};
use crate::state::{OverviewObserver, OverviewState};

/// Receives de-duplicated tab selections as `(timestamp_ms, tab)`.
pub type SelectionListener = Arc<dyn Fn(i64, TabId) + Send + Sync>;

struct Inner {
    state: OverviewState,
    /// Last tab forwarded to the selection listener; selections of the
    /// same tab are swallowed until this is cleared.
    last_forwarded: Option<TabId>,
    subscribed: bool,
    /// Collection that was active when the overview last started
    /// showing.
    home_collection: Option<CollectionId>,
    /// True after the active collection left the home collection;
    /// returning home re-arms the selection filter.
    switched_away: bool,
    listener: Option<SelectionListener>,
}

/// Coordinates the single-tab overview surface.
///
/// Owns the view model the presentation layer observes, tracks the
/// hidden/showing/shown/hiding lifecycle, and forwards tab selections
/// to the application listener with duplicate suppression. All state
/// lives behind one mutex that is released before any observer or
/// listener runs, so re-entrant calls from callbacks cannot deadlock.
pub struct OverviewMediator {
    model: PropertyModel,
    observers: ObserverRegistry<dyn OverviewObserver>,
    inner: Mutex<Inner>,
    /// Bumped on hide; visuals results carrying an older generation
    /// are discarded.
    generation: AtomicU64,
    tabs: Arc<dyn ActiveTabProvider>,
    visuals: Arc<dyn VisualsProvider>,
    selections: Arc<dyn SelectionSource>,
    switches: Arc<dyn CollectionSwitchSource>,
    selection_bridge: Arc<dyn SelectionObserver>,
    switch_bridge: Arc<dyn CollectionSwitchObserver>,
    weak_self: Weak<OverviewMediator>,
}

impl OverviewMediator {
    pub fn new(
        tabs: Arc<dyn ActiveTabProvider>,
        visuals: Arc<dyn VisualsProvider>,
        selections: Arc<dyn SelectionSource>,
        switches: Arc<dyn CollectionSwitchSource>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let click = {
                let weak = weak.clone();
                ClickCallback::new(move || {
                    if let Some(mediator) = weak.upgrade() {
                        mediator.handle_click();
                    }
                })
            };
            let model = PropertyModel::builder()
                .with(&TITLE, String::new())
                .with(&FAVICON, None)
                .with(&CLICK_LISTENER, Some(click))
                .build();
            Self {
                model,
                observers: ObserverRegistry::new(),
                inner: Mutex::new(Inner {
                    state: OverviewState::Hidden,
                    last_forwarded: None,
                    subscribed: false,
                    home_collection: None,
                    switched_away: false,
                    listener: None,
                }),
                generation: AtomicU64::new(0),
                tabs,
                visuals,
                selections,
                switches,
                selection_bridge: Arc::new(SelectionBridge(weak.clone())),
                switch_bridge: Arc::new(SwitchBridge(weak.clone())),
                weak_self: weak.clone(),
            }
        })
    }

    /// The view model driving the presentation layer.
    pub fn model(&self) -> &PropertyModel {
        &self.model
    }

    pub fn state(&self) -> OverviewState {
        self.inner.lock().expect("mediator state poisoned").state
    }

    /// Set or clear the listener that receives forwarded selections.
    /// With no listener set, selections are skipped without consuming
    /// the de-duplication slot.
    pub fn set_selection_listener(&self, listener: Option<SelectionListener>) {
        let mut inner = self.inner.lock().expect("mediator state poisoned");
        inner.listener = listener;
    }

    pub fn add_observer(&self, observer: Arc<dyn OverviewObserver>) {
        self.observers.add(observer);
    }

    pub fn remove_observer(&self, observer: &Arc<dyn OverviewObserver>) {
        self.observers.remove(observer);
    }

    /// Bring the overview up. No-op while already showing or shown.
    ///
    /// Resets the selection filter, records the home collection,
    /// subscribes to the event sources on first show, populates the
    /// view model from the active tab and emits the
    /// `started_showing`/`finished_showing` pair.
    pub fn show_overview(&self) {
        {
            let inner = self.inner.lock().expect("mediator state poisoned");
            if matches!(inner.state, OverviewState::Showing | OverviewState::Shown) {
                return;
            }
        }
        let home = self.tabs.active_collection();
        let snapshot = self.tabs.active_tab();
        let need_subscribe = {
            let mut inner = self.inner.lock().expect("mediator state poisoned");
            inner.state = OverviewState::Showing;
            inner.last_forwarded = None;
            inner.switched_away = false;
            inner.home_collection = Some(home);
            !std::mem::replace(&mut inner.subscribed, true)
        };
        if need_subscribe {
            self.selections.subscribe(self.selection_bridge.clone());
            self.switches.subscribe(self.switch_bridge.clone());
        }
        if let Some(tab) = snapshot {
            self.set_model(&TITLE, tab.title.clone());
            self.start_visuals_fetch(&tab.url);
        }
        self.observers.for_each(|observer| observer.started_showing());
        {
            let mut inner = self.inner.lock().expect("mediator state poisoned");
            inner.state = OverviewState::Shown;
        }
        self.observers.for_each(|observer| observer.finished_showing());
        tracing::debug!(home = %home, "overview shown");
    }

    /// Take the overview down. No-op while already hidden or hiding.
    ///
    /// Emits the `started_hiding`/`finished_hiding` pair, invalidates
    /// in-flight visuals fetches and clears the bound title. Event
    /// source subscriptions persist so that collection switches keep
    /// being tracked while hidden.
    pub fn hide_overview(&self) {
        {
            let mut inner = self.inner.lock().expect("mediator state poisoned");
            if matches!(inner.state, OverviewState::Hidden | OverviewState::Hiding) {
                return;
            }
            inner.state = OverviewState::Hiding;
        }
        self.observers.for_each(|observer| observer.started_hiding());
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.set_model(&TITLE, String::new());
        {
            let mut inner = self.inner.lock().expect("mediator state poisoned");
            inner.state = OverviewState::Hidden;
        }
        self.observers.for_each(|observer| observer.finished_hiding());
        tracing::debug!("overview hidden");
    }

    /// Tear the mediator down: unsubscribe from the event sources and
    /// drop the selection listener and lifecycle observers.
    pub fn destroy(&self) {
        let was_subscribed = {
            let mut inner = self.inner.lock().expect("mediator state poisoned");
            inner.listener = None;
            std::mem::replace(&mut inner.subscribed, false)
        };
        if was_subscribed {
            self.selections.unsubscribe(&self.selection_bridge);
            self.switches.unsubscribe(&self.switch_bridge);
        }
        self.observers.clear();
    }

    fn handle_tab_selected(&self, event: SelectionEvent) {
        let listener = {
            let mut inner = self.inner.lock().expect("mediator state poisoned");
            if inner.state != OverviewState::Shown {
                return;
            }
            if inner.last_forwarded == Some(event.tab) {
                return;
            }
            let Some(listener) = inner.listener.clone() else {
                return;
            };
            inner.last_forwarded = Some(event.tab);
            listener
        };
        tracing::debug!(tab = %event.tab, cause = ?event.cause, "forwarding tab selection");
        listener(event.timestamp_ms, event.tab);
    }

    fn handle_collection_switched(&self, collection: CollectionId) {
        let mut inner = self.inner.lock().expect("mediator state poisoned");
        let Some(home) = inner.home_collection else {
            return;
        };
        if collection != home {
            inner.switched_away = true;
        } else if inner.switched_away {
            inner.switched_away = false;
            inner.last_forwarded = None;
            tracing::debug!(%collection, "returned to home collection, selection filter re-armed");
        }
    }

    /// Tap on the tab card: forward the current active tab straight to
    /// the listener. A tap is an explicit user action, so it bypasses
    /// the duplicate filter and leaves it untouched.
    fn handle_click(&self) {
        let listener = {
            let inner = self.inner.lock().expect("mediator state poisoned");
            inner.listener.clone()
        };
        let (Some(listener), Some(tab)) = (listener, self.tabs.active_tab()) else {
            return;
        };
        listener(chrono::Utc::now().timestamp_millis(), tab.id);
    }

    fn start_visuals_fetch(&self, url: &str) {
        let generation = self.generation.load(Ordering::SeqCst);
        let weak = self.weak_self.clone();
        self.visuals.fetch_visuals(
            url,
            Box::new(move |favicon| {
                let Some(mediator) = weak.upgrade() else {
                    return;
                };
                if mediator.generation.load(Ordering::SeqCst) != generation {
                    tracing::trace!("discarding stale visuals result");
                    return;
                }
                mediator.set_model(&FAVICON, Some(favicon));
            }),
        );
    }

    fn set_model<T: PropertyValue>(&self, key: &PropertyKey<T>, value: T) {
        // Keys are declared at construction, so writes cannot fail in
        // practice.
        if let Err(error) = self.model.set(key, value) {
            tracing::error!(%error, key = key.name(), "view model write rejected");
        }
    }
}

struct SelectionBridge(Weak<OverviewMediator>);

impl SelectionObserver for SelectionBridge {
    fn on_tab_selected(&self, event: SelectionEvent) {
        if let Some(mediator) = self.0.upgrade() {
            mediator.handle_tab_selected(event);
        }
    }
}

struct SwitchBridge(Weak<OverviewMediator>);

impl CollectionSwitchObserver for SwitchBridge {
    fn on_collection_switched(&self, collection: CollectionId) {
        if let Some(mediator) = self.0.upgrade() {
            mediator.handle_collection_switched(collection);
        }
    }
}
