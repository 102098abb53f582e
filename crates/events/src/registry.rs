//! Ordered observer list with snapshot dispatch.

use std::sync::{Arc, Mutex};

/// An ordered set of listener callbacks.
///
/// Listeners are held as non-owning `Arc` references in registration
/// order. Dispatch iterates over a stable snapshot, so a listener may
/// remove itself or any other listener mid-dispatch without affecting
/// delivery within the current pass.
pub struct ObserverRegistry<T: ?Sized> {
    observers: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Append `observer` to the registry.
    pub fn add(&self, observer: Arc<T>) {
        let mut observers = self.observers.lock().expect("observer registry poisoned");
        observers.push(observer);
    }

    /// Remove `observer` by identity. Returns false (and does nothing)
    /// if it was not registered.
    pub fn remove(&self, observer: &Arc<T>) -> bool {
        let mut observers = self.observers.lock().expect("observer registry poisoned");
        let before = observers.len();
        observers.retain(|existing| !Arc::ptr_eq(existing, observer));
        observers.len() != before
    }

    /// Invoke `f` for every registered observer, over a snapshot taken
    /// before the first call.
    pub fn for_each(&self, mut f: impl FnMut(&Arc<T>)) {
        let snapshot: Vec<Arc<T>> = {
            let observers = self.observers.lock().expect("observer registry poisoned");
            observers.clone()
        };
        for observer in &snapshot {
            f(observer);
        }
    }

    /// Drop all registered observers.
    pub fn clear(&self) {
        let mut observers = self.observers.lock().expect("observer registry poisoned");
        observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.lock().expect("observer registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
