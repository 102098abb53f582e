//! Overview coordinator.
//!
//! [`OverviewMediator`] mediates between the embedder's raw tab events
//! and a presentation layer: it owns a single-tab
//! [`PropertyModel`](tabshell_props::PropertyModel) (title, favicon,
//! click handler), runs the hidden/showing/shown/hiding lifecycle, and
//! forwards de-duplicated tab selections to an application listener.

mod mediator;
mod properties;
mod provider;
mod state;

pub use mediator::{OverviewMediator, SelectionListener};
pub use properties::{ClickCallback, Favicon, CLICK_LISTENER, FAVICON, TITLE};
pub use provider::{
    ActiveTabProvider, NullActiveTabProvider, NullVisualsProvider, TabSnapshot, VisualsCallback,
    VisualsProvider,
};
pub use state::{OverviewObserver, OverviewState};
