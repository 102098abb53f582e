//! Text-selection menu handling.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tabshell_props::ObservableSupplier;

pub const MENU_ITEM_SHARE: u32 = 1 << 0;
pub const MENU_ITEM_WEB_SEARCH: u32 = 1 << 1;
pub const MENU_ITEM_PROCESS_TEXT: u32 = 1 << 2;

/// Longest query forwarded to the search engine.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 1000;

/// Whether the user has completed first-run setup. Web search opens a
/// new tab, which is off limits before that.
pub trait FirstRunStatus: Send + Sync {
    fn first_run_complete(&self) -> bool;
}

/// An external activity offering to process the selected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTextTarget {
    pub label: String,
    pub package: String,
}

/// Drop process-text targets provided by web browsers or system
/// launchers; surfacing those would loop the selection back into
/// another browser surface.
pub fn filter_process_text_targets(
    targets: &[ProcessTextTarget],
    browsers: &HashSet<String>,
    launchers: &HashSet<String>,
) -> Vec<ProcessTextTarget> {
    targets
        .iter()
        .filter(|target| !browsers.contains(&target.package) && !launchers.contains(&target.package))
        .cloned()
        .collect()
}

/// Collapse whitespace runs to single spaces, trim, and cap the query
/// at `max_len` characters.
pub fn sanitize_search_query(query: &str, max_len: usize) -> String {
    let collapsed: String = query.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_len).collect()
}

/// Tracks the selection menu lifecycle and what it may offer.
///
/// `on_menu_created`/`on_menu_destroyed` are idempotent; the
/// contextual-bar visibility is published through an
/// [`ObservableSupplier`] so chrome above the content area can make
/// room.
pub struct SelectionMenuHandler {
    first_run: Arc<dyn FirstRunStatus>,
    active: Mutex<bool>,
    bar_visible: ObservableSupplier<bool>,
}

impl SelectionMenuHandler {
    pub fn new(first_run: Arc<dyn FirstRunStatus>) -> Self {
        Self {
            first_run,
            active: Mutex::new(false),
            bar_visible: ObservableSupplier::with_value(false),
        }
    }

    /// The menu is opening. Returns the bitmask of allowed menu items.
    pub fn on_menu_created(&self) -> u32 {
        {
            let mut active = self.active.lock().expect("menu state poisoned");
            *active = true;
        }
        self.bar_visible.set(true);
        self.allowed_menu_items()
    }

    pub fn on_menu_destroyed(&self) {
        {
            let mut active = self.active.lock().expect("menu state poisoned");
            *active = false;
        }
        self.bar_visible.set(false);
    }

    pub fn is_active(&self) -> bool {
        *self.active.lock().expect("menu state poisoned")
    }

    /// Supplier of the contextual-bar visibility.
    pub fn bar_visibility(&self) -> &ObservableSupplier<bool> {
        &self.bar_visible
    }

    fn allowed_menu_items(&self) -> u32 {
        let mut allowed = MENU_ITEM_SHARE | MENU_ITEM_PROCESS_TEXT;
        if self.first_run.first_run_complete() {
            allowed |= MENU_ITEM_WEB_SEARCH;
        }
        allowed
    }
}
