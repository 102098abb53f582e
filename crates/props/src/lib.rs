//! Typed observable key-value slots for driving a presentation layer.
//!
//! A [`PropertyModel`] is a fixed set of typed slots declared once at
//! construction time. Writes notify registered observers synchronously,
//! in registration order, and only when the value actually changed. The
//! model never exposes the component that owns it; consumers observe
//! key changes and read values back.
//!
//! [`ObservableSupplier`] is the single-slot variant: one observable
//! value, same change-only notification contract.

mod error;
mod key;
mod model;
mod supplier;

pub use error::PropertyError;
pub use key::PropertyKey;
pub use model::{PropertyModel, PropertyModelBuilder, PropertyObserver, PropertyValue};
pub use supplier::{ObservableSupplier, SupplierObserver};
