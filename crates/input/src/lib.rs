//! Input glue: soft-keyboard coordination and the text-selection menu.

mod keyboard;
mod menu;

pub use keyboard::{
    KeyboardController, KeyboardCoordinator, KeyboardFeed, KeyboardVisibilityObserver,
    KeyboardVisibilitySource, ALLOW_SOFT_KEYBOARD, VISIBLE,
};
pub use menu::{
    filter_process_text_targets, sanitize_search_query, FirstRunStatus, ProcessTextTarget,
    SelectionMenuHandler, MAX_SEARCH_QUERY_LENGTH, MENU_ITEM_PROCESS_TEXT, MENU_ITEM_SHARE,
    MENU_ITEM_WEB_SEARCH,
};
