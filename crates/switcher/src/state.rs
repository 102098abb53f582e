//! Overview lifecycle states and observer contract.

/// Lifecycle phase of the overview surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewState {
    Hidden,
    Showing,
    Shown,
    Hiding,
}

/// Observes overview lifecycle transitions.
///
/// Callbacks always arrive in matched pairs: `started_showing` then
/// `finished_showing`, and `started_hiding` then `finished_hiding`.
/// All methods default to no-ops so implementors can pick the
/// transitions they care about.
pub trait OverviewObserver: Send + Sync {
    fn started_showing(&self) {}
    fn finished_showing(&self) {}
    fn started_hiding(&self) {}
    fn finished_hiding(&self) {}
}
