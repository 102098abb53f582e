//! The observable property store.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::PropertyError;
use crate::key::PropertyKey;

/// Value types storable in a [`PropertyModel`] slot.
///
/// `PartialEq` is required so that writing an unchanged value can skip
/// notification; `Clone` so reads hand out owned values.
pub trait PropertyValue: Any + Clone + PartialEq + Send + 'static {}

impl<T: Any + Clone + PartialEq + Send + 'static> PropertyValue for T {}

/// Callback invoked after a slot value changed, with the model and the
/// name of the key that changed.
pub type PropertyObserver = Arc<dyn Fn(&PropertyModel, &'static str) + Send + Sync>;

struct Slot {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

/// Builder collecting the fixed key set of a [`PropertyModel`].
#[derive(Default)]
pub struct PropertyModelBuilder {
    slots: HashMap<&'static str, Slot>,
}

impl PropertyModelBuilder {
    /// Declare `key` with its initial value. Re-declaring a name
    /// replaces the earlier slot.
    pub fn with<T: PropertyValue>(mut self, key: &PropertyKey<T>, initial: T) -> Self {
        let previous = self.slots.insert(
            key.name(),
            Slot {
                value: Box::new(initial),
                type_name: std::any::type_name::<T>(),
            },
        );
        if previous.is_some() {
            tracing::warn!(key = key.name(), "property key declared twice");
        }
        self
    }

    pub fn build(self) -> PropertyModel {
        PropertyModel {
            slots: Mutex::new(self.slots),
            observers: Mutex::new(Vec::new()),
        }
    }
}

/// A mapping from typed keys to current values that notifies registered
/// observers on change.
///
/// The key set is fixed at construction; reading or writing a key that
/// was not declared fails with [`PropertyError::UnknownKey`]. Writes
/// notify synchronously, in registration order, before [`set`] returns.
/// Notification runs on a snapshot of the observer list with no internal
/// lock held, so an observer may add or remove observers, or call `set`
/// again, from within its callback. Unbounded `set` recursion (observer
/// of key K writing K with a new value every time) is the caller's
/// responsibility to avoid.
///
/// [`set`]: PropertyModel::set
pub struct PropertyModel {
    slots: Mutex<HashMap<&'static str, Slot>>,
    observers: Mutex<Vec<PropertyObserver>>,
}

impl PropertyModel {
    pub fn builder() -> PropertyModelBuilder {
        PropertyModelBuilder::default()
    }

    /// Read the current value of `key`.
    pub fn get<T: PropertyValue>(&self, key: &PropertyKey<T>) -> Result<T, PropertyError> {
        let slots = self.slots.lock().expect("property model mutex poisoned");
        let slot = slots
            .get(key.name())
            .ok_or(PropertyError::UnknownKey(key.name()))?;
        let value = slot
            .value
            .downcast_ref::<T>()
            .ok_or(PropertyError::TypeMismatch {
                key: key.name(),
                stored: slot.type_name,
                requested: std::any::type_name::<T>(),
            })?;
        Ok(value.clone())
    }

    /// Store `value` under `key`, notifying observers if it changed.
    pub fn set<T: PropertyValue>(
        &self,
        key: &PropertyKey<T>,
        value: T,
    ) -> Result<(), PropertyError> {
        {
            let mut slots = self.slots.lock().expect("property model mutex poisoned");
            let slot = slots
                .get_mut(key.name())
                .ok_or(PropertyError::UnknownKey(key.name()))?;
            let current = slot
                .value
                .downcast_mut::<T>()
                .ok_or(PropertyError::TypeMismatch {
                    key: key.name(),
                    stored: slot.type_name,
                    requested: std::any::type_name::<T>(),
                })?;
            if *current == value {
                return Ok(());
            }
            *current = value;
        }

        tracing::debug!(key = key.name(), "property changed");
        let snapshot: Vec<PropertyObserver> = {
            let observers = self
                .observers
                .lock()
                .expect("property observer mutex poisoned");
            observers.clone()
        };
        for observer in snapshot {
            observer(self, key.name());
        }
        Ok(())
    }

    /// Whether `key` was declared on this model.
    pub fn contains<T>(&self, key: &PropertyKey<T>) -> bool {
        let slots = self.slots.lock().expect("property model mutex poisoned");
        slots.contains_key(key.name())
    }

    /// Register an observer called after any key changes.
    pub fn add_observer(&self, observer: PropertyObserver) {
        let mut observers = self
            .observers
            .lock()
            .expect("property observer mutex poisoned");
        observers.push(observer);
    }

    /// Remove a previously registered observer. No-op if absent.
    pub fn remove_observer(&self, observer: &PropertyObserver) {
        let mut observers = self
            .observers
            .lock()
            .expect("property observer mutex poisoned");
        observers.retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        let observers = self
            .observers
            .lock()
            .expect("property observer mutex poisoned");
        observers.len()
    }
}

impl std::fmt::Debug for PropertyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().expect("property model mutex poisoned");
        let mut keys: Vec<&&str> = slots.keys().collect();
        keys.sort();
        f.debug_struct("PropertyModel").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TITLE: PropertyKey<String> = PropertyKey::new("title");
    static VISIBLE: PropertyKey<bool> = PropertyKey::new("visible");
    static UNDECLARED: PropertyKey<bool> = PropertyKey::new("undeclared");
    static TITLE_AS_BOOL: PropertyKey<bool> = PropertyKey::new("title");

    fn model() -> PropertyModel {
        PropertyModel::builder()
            .with(&TITLE, String::new())
            .with(&VISIBLE, false)
            .build()
    }

    #[test]
    fn get_returns_initial_then_updated_value() {
        let model = model();
        assert_eq!(model.get(&TITLE).unwrap(), "");

        model.set(&TITLE, "hello".to_string()).unwrap();
        assert_eq!(model.get(&TITLE).unwrap(), "hello");
    }

    #[test]
    fn undeclared_key_fails_on_read_and_write() {
        let model = model();
        assert_eq!(
            model.get(&UNDECLARED),
            Err(PropertyError::UnknownKey("undeclared"))
        );
        assert_eq!(
            model.set(&UNDECLARED, true),
            Err(PropertyError::UnknownKey("undeclared"))
        );
    }

    #[test]
    fn mismatched_key_type_is_rejected() {
        let model = model();
        assert!(matches!(
            model.get(&TITLE_AS_BOOL),
            Err(PropertyError::TypeMismatch { key: "title", .. })
        ));
    }

    #[test]
    fn set_notifies_only_on_change() {
        let model = model();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        model.add_observer(Arc::new(move |_, _| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        model.set(&VISIBLE, true).unwrap();
        model.set(&VISIBLE, true).unwrap();
        model.set(&VISIBLE, false).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn observers_are_notified_in_registration_order() {
        let model = model();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            model.add_observer(Arc::new(move |_, key| {
                order.lock().unwrap().push((tag, key));
            }));
        }

        model.set(&VISIBLE, true).unwrap();
        let seen = order.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("first", "visible"),
                ("second", "visible"),
                ("third", "visible")
            ]
        );
    }

    #[test]
    fn observer_may_write_another_key_reentrantly() {
        let model = Arc::new(model());
        let model_clone = Arc::clone(&model);
        model.add_observer(Arc::new(move |_, key| {
            if key == "visible" {
                model_clone.set(&TITLE, "shown".to_string()).unwrap();
            }
        }));

        model.set(&VISIBLE, true).unwrap();
        assert_eq!(model.get(&TITLE).unwrap(), "shown");
    }

    #[test]
    fn removed_observer_is_not_notified() {
        let model = model();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let observer: PropertyObserver = Arc::new(move |_, _| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        model.add_observer(Arc::clone(&observer));
        model.set(&VISIBLE, true).unwrap();
        model.remove_observer(&observer);
        model.set(&VISIBLE, false).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Removing again is a no-op.
        model.remove_observer(&observer);
    }
}
