//! Property key definitions.

use std::marker::PhantomData;

/// Identifies one typed slot in a [`crate::PropertyModel`].
///
/// Keys are immutable and meant to be declared as `static`s next to the
/// component that owns the model, mirroring how a view-model layer pins
/// down its bindable surface in one place:
///
/// ```
/// use tabshell_props::PropertyKey;
///
/// pub static TITLE: PropertyKey<String> = PropertyKey::new("title");
/// ```
///
/// The name must be unique within a single model's key set; two keys
/// with the same name and different types are a declaration bug and
/// surface as [`crate::PropertyError::TypeMismatch`] on access.
pub struct PropertyKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PropertyKey<T> {
    /// Create a key. Usable in `static` initializers.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The key's declared name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> std::fmt::Debug for PropertyKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PropertyKey").field(&self.name).finish()
    }
}
