//! Single-slot observable value.

use std::sync::{Arc, Mutex};

use crate::model::PropertyValue;

/// Callback invoked with the new value after a supplier change.
pub type SupplierObserver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// One observable value with change-only notification.
///
/// Starts empty; [`set`] publishes a value and notifies registered
/// observers when it differs from the current one. Observers are
/// notified on a snapshot, so removal during dispatch is safe.
///
/// [`set`]: ObservableSupplier::set
pub struct ObservableSupplier<T> {
    value: Mutex<Option<T>>,
    observers: Mutex<Vec<SupplierObserver<T>>>,
}

impl<T: PropertyValue> ObservableSupplier<T> {
    /// Create an empty supplier.
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Create a supplier already holding `value`.
    pub fn with_value(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// The current value, if one has been published.
    pub fn get(&self) -> Option<T> {
        self.value.lock().expect("supplier mutex poisoned").clone()
    }

    /// Publish `value`, notifying observers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut current = self.value.lock().expect("supplier mutex poisoned");
            if current.as_ref() == Some(&value) {
                return;
            }
            *current = Some(value.clone());
        }

        let snapshot: Vec<SupplierObserver<T>> = {
            let observers = self
                .observers
                .lock()
                .expect("supplier observer mutex poisoned");
            observers.clone()
        };
        for observer in snapshot {
            observer(&value);
        }
    }

    /// Register an observer; returns the current value so new observers
    /// can catch up without waiting for the next change.
    pub fn add_observer(&self, observer: SupplierObserver<T>) -> Option<T> {
        let mut observers = self
            .observers
            .lock()
            .expect("supplier observer mutex poisoned");
        observers.push(observer);
        drop(observers);
        self.get()
    }

    /// Remove a previously registered observer. No-op if absent.
    pub fn remove_observer(&self, observer: &SupplierObserver<T>) {
        let mut observers = self
            .observers
            .lock()
            .expect("supplier observer mutex poisoned");
        observers.retain(|existing| !Arc::ptr_eq(existing, observer));
    }
}

impl<T: PropertyValue> Default for ObservableSupplier<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn starts_empty_and_publishes_values() {
        let supplier = ObservableSupplier::<i32>::new();
        assert_eq!(supplier.get(), None);

        supplier.set(7);
        assert_eq!(supplier.get(), Some(7));
    }

    #[test]
    fn equal_value_does_not_notify() {
        let supplier = ObservableSupplier::with_value(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        supplier.add_observer(Arc::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        supplier.set(1);
        supplier.set(2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn add_observer_returns_current_value() {
        let supplier = ObservableSupplier::with_value("margins".to_string());
        let current = supplier.add_observer(Arc::new(|_| {}));
        assert_eq!(current, Some("margins".to_string()));
    }

    #[test]
    fn removed_observer_stops_receiving() {
        let supplier = ObservableSupplier::<i32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let observer: SupplierObserver<i32> = Arc::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        supplier.add_observer(Arc::clone(&observer));
        supplier.set(1);
        supplier.remove_observer(&observer);
        supplier.set(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
