//! Soft-keyboard visibility coordination.

use std::sync::{Arc, Mutex, Weak};

use tabshell_events::ObserverRegistry;
use tabshell_props::{PropertyKey, PropertyModel};

/// Whether the coordinator should be listening for visibility changes.
pub static VISIBLE: PropertyKey<bool> = PropertyKey::new("visible");

/// Whether the soft keyboard may show at all.
pub static ALLOW_SOFT_KEYBOARD: PropertyKey<bool> = PropertyKey::new("allow_soft_keyboard");

/// Receives keyboard visibility changes.
pub trait KeyboardVisibilityObserver: Send + Sync {
    fn on_keyboard_visibility_changed(&self, visible: bool);
}

/// A stream of keyboard visibility changes.
pub trait KeyboardVisibilitySource: Send + Sync {
    fn subscribe(&self, observer: Arc<dyn KeyboardVisibilityObserver>);
    fn unsubscribe(&self, observer: &Arc<dyn KeyboardVisibilityObserver>);
}

/// Control over the platform soft keyboard.
pub trait KeyboardController: Send + Sync {
    fn is_keyboard_showing(&self) -> bool;
    fn hide_keyboard(&self);
}

/// Pass-through visibility source backed by an `ObserverRegistry`.
pub struct KeyboardFeed {
    observers: ObserverRegistry<dyn KeyboardVisibilityObserver>,
}

impl KeyboardFeed {
    pub fn new() -> Self {
        Self {
            observers: ObserverRegistry::new(),
        }
    }

    pub fn emit(&self, visible: bool) {
        self.observers
            .for_each(|observer| observer.on_keyboard_visibility_changed(visible));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl KeyboardVisibilitySource for KeyboardFeed {
    fn subscribe(&self, observer: Arc<dyn KeyboardVisibilityObserver>) {
        self.observers.add(observer);
    }

    fn unsubscribe(&self, observer: &Arc<dyn KeyboardVisibilityObserver>) {
        self.observers.remove(observer);
    }
}

impl Default for KeyboardFeed {
    fn default() -> Self {
        Self::new()
    }
}

struct Flags {
    listening: bool,
    allow_soft_keyboard: bool,
}

/// Enables or disables the soft keyboard for an embedding surface.
///
/// While listening, every visibility change is reported to the
/// delegate; a keyboard that shows while showing is disallowed gets
/// hidden right away.
pub struct KeyboardCoordinator {
    controller: Arc<dyn KeyboardController>,
    source: Arc<dyn KeyboardVisibilitySource>,
    delegate: Arc<dyn Fn(bool) + Send + Sync>,
    flags: Mutex<Flags>,
    bridge: Arc<dyn KeyboardVisibilityObserver>,
}

impl KeyboardCoordinator {
    pub fn new(
        controller: Arc<dyn KeyboardController>,
        source: Arc<dyn KeyboardVisibilitySource>,
        delegate: Arc<dyn Fn(bool) + Send + Sync>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| Self {
            controller,
            source,
            delegate,
            flags: Mutex::new(Flags {
                listening: false,
                allow_soft_keyboard: true,
            }),
            bridge: Arc::new(VisibilityBridge(weak.clone())),
        })
    }

    /// Wire a view model to this coordinator: writes to [`VISIBLE`]
    /// toggle listening, writes to [`ALLOW_SOFT_KEYBOARD`] gate the
    /// keyboard.
    pub fn bind_model(self: &Arc<Self>, model: &PropertyModel) {
        let weak = Arc::downgrade(self);
        model.add_observer(Arc::new(move |model: &PropertyModel, key: &'static str| {
            let Some(coordinator) = weak.upgrade() else {
                return;
            };
            if key == VISIBLE.name() {
                if let Ok(visible) = model.get(&VISIBLE) {
                    coordinator.enable_listening(visible);
                }
            } else if key == ALLOW_SOFT_KEYBOARD.name() {
                if let Ok(allowed) = model.get(&ALLOW_SOFT_KEYBOARD) {
                    coordinator.set_allow_soft_keyboard(allowed);
                }
            }
        }));
    }

    pub fn is_keyboard_showing(&self) -> bool {
        self.controller.is_keyboard_showing()
    }

    pub fn hide_keyboard(&self) {
        self.controller.hide_keyboard();
    }

    /// Start or stop listening for visibility changes. Idempotent.
    pub fn enable_listening(&self, enabled: bool) {
        let changed = {
            let mut flags = self.flags.lock().expect("keyboard flags poisoned");
            if flags.listening == enabled {
                false
            } else {
                flags.listening = enabled;
                true
            }
        };
        if !changed {
            return;
        }
        if enabled {
            self.source.subscribe(self.bridge.clone());
        } else {
            self.source.unsubscribe(&self.bridge);
        }
    }

    /// Allow or disallow the soft keyboard. Disallowing hides it
    /// immediately.
    pub fn set_allow_soft_keyboard(&self, allowed: bool) {
        {
            let mut flags = self.flags.lock().expect("keyboard flags poisoned");
            flags.allow_soft_keyboard = allowed;
        }
        if !allowed {
            tracing::debug!("soft keyboard disallowed, hiding");
            self.controller.hide_keyboard();
        }
    }

    fn handle_visibility_changed(&self, visible: bool) {
        (self.delegate)(visible);
        let allowed = {
            let flags = self.flags.lock().expect("keyboard flags poisoned");
            flags.allow_soft_keyboard
        };
        // The keyboard can only be dismissed after it has shown; there
        // is no pre-show veto on the platform side.
        if visible && !allowed {
            self.controller.hide_keyboard();
        }
    }
}

struct VisibilityBridge(Weak<KeyboardCoordinator>);

impl KeyboardVisibilityObserver for VisibilityBridge {
    fn on_keyboard_visibility_changed(&self, visible: bool) {
        if let Some(coordinator) = self.0.upgrade() {
            coordinator.handle_visibility_changed(visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeController {
        showing: Mutex<bool>,
        hide_calls: AtomicUsize,
    }

    impl FakeController {
        fn new(showing: bool) -> Arc<Self> {
            Arc::new(Self {
                showing: Mutex::new(showing),
                hide_calls: AtomicUsize::new(0),
            })
        }
    }

    impl KeyboardController for FakeController {
        fn is_keyboard_showing(&self) -> bool {
            *self.showing.lock().unwrap()
        }

        fn hide_keyboard(&self) {
            *self.showing.lock().unwrap() = false;
            self.hide_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn coordinator(
        controller: Arc<FakeController>,
        feed: Arc<KeyboardFeed>,
    ) -> (Arc<KeyboardCoordinator>, Arc<Mutex<Vec<bool>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let coordinator = KeyboardCoordinator::new(
            controller,
            feed,
            Arc::new(move |visible| log.lock().unwrap().push(visible)),
        );
        (coordinator, seen)
    }

    #[test]
    fn enable_listening_is_idempotent() {
        let feed = Arc::new(KeyboardFeed::new());
        let (coordinator, _) = coordinator(FakeController::new(false), feed.clone());

        coordinator.enable_listening(true);
        coordinator.enable_listening(true);
        assert_eq!(feed.observer_count(), 1);

        coordinator.enable_listening(false);
        coordinator.enable_listening(false);
        assert_eq!(feed.observer_count(), 0);
    }

    #[test]
    fn disallowing_hides_keyboard_immediately() {
        let controller = FakeController::new(true);
        let feed = Arc::new(KeyboardFeed::new());
        let (coordinator, _) = coordinator(controller.clone(), feed);

        coordinator.set_allow_soft_keyboard(false);
        assert!(!coordinator.is_keyboard_showing());
        assert_eq!(controller.hide_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn visibility_change_notifies_delegate_and_force_hides_when_disallowed() {
        let controller = FakeController::new(false);
        let feed = Arc::new(KeyboardFeed::new());
        let (coordinator, seen) = coordinator(controller.clone(), feed.clone());

        coordinator.enable_listening(true);
        coordinator.set_allow_soft_keyboard(false);
        assert_eq!(controller.hide_calls.load(Ordering::SeqCst), 1);

        *controller.showing.lock().unwrap() = true;
        feed.emit(true);

        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert_eq!(controller.hide_calls.load(Ordering::SeqCst), 2);
        assert!(!coordinator.is_keyboard_showing());
    }

    #[test]
    fn visibility_change_with_keyboard_allowed_only_notifies() {
        let controller = FakeController::new(true);
        let feed = Arc::new(KeyboardFeed::new());
        let (coordinator, seen) = coordinator(controller.clone(), feed.clone());

        coordinator.enable_listening(true);
        feed.emit(true);
        feed.emit(false);

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        assert_eq!(controller.hide_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn model_writes_drive_the_coordinator() {
        let controller = FakeController::new(true);
        let feed = Arc::new(KeyboardFeed::new());
        let (coordinator, _) = coordinator(controller.clone(), feed.clone());

        let model = PropertyModel::builder()
            .with(&VISIBLE, false)
            .with(&ALLOW_SOFT_KEYBOARD, true)
            .build();
        coordinator.bind_model(&model);

        model.set(&VISIBLE, true).unwrap();
        assert_eq!(feed.observer_count(), 1);

        model.set(&ALLOW_SOFT_KEYBOARD, false).unwrap();
        assert_eq!(controller.hide_calls.load(Ordering::SeqCst), 1);

        model.set(&VISIBLE, false).unwrap();
        assert_eq!(feed.observer_count(), 0);
    }
}
