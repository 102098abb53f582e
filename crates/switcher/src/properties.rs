//! Property keys for the single-tab view model.

use std::fmt;
use std::sync::Arc;

use tabshell_props::PropertyKey;

/// Displayed tab title. Cleared to `""` whenever the overview hides.
pub static TITLE: PropertyKey<String> = PropertyKey::new("title");

/// Favicon for the displayed tab, once the visuals fetch completes.
pub static FAVICON: PropertyKey<Option<Favicon>> = PropertyKey::new("favicon");

/// Handler the presentation layer invokes when the tab card is tapped.
pub static CLICK_LISTENER: PropertyKey<Option<ClickCallback>> =
    PropertyKey::new("click_listener");

/// Encoded favicon image, cheaply cloneable.
#[derive(Clone, PartialEq, Eq)]
pub struct Favicon {
    bytes: Arc<[u8]>,
}

impl Favicon {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Favicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Favicon")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A zero-argument callback stored in a property slot.
///
/// Equality is identity: two callbacks compare equal only when they
/// wrap the same allocation, so re-storing the same handler does not
/// notify model observers.
#[derive(Clone)]
pub struct ClickCallback(Arc<dyn Fn() + Send + Sync>);

impl ClickCallback {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn invoke(&self) {
        (self.0)()
    }
}

impl PartialEq for ClickCallback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClickCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClickCallback")
    }
}
