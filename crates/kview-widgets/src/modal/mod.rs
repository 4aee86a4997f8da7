#![forbid(unsafe_code)]

//! Pure helpers behind dialog and menu overlays: panel placement and focus
//! cycling.

pub mod focus;
pub mod placement;

pub use focus::{MENU_ITEM_SELECTOR, focusables, next_focus};
pub use placement::place_menu;
