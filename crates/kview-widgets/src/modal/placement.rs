#![forbid(unsafe_code)]

//! Menu panel placement relative to its trigger.
//!
//! # Invariants
//!
//! 1. The panel opens below the trigger, `gap` pixels away, aligned to the
//!    trigger's left edge.
//! 2. If it would overflow the bottom of the viewport it flips above the
//!    trigger, but only when the flipped position is on screen.
//! 3. The result is then clamped so the panel keeps `gap` pixels from every
//!    viewport edge. When the panel is larger than the viewport the top/left
//!    margin wins.

use kview_core::{Point, Rect, Size, clamp_lenient};

/// Top-left corner for a menu panel of size `panel` opened from `anchor`.
#[must_use]
pub fn place_menu(anchor: Rect, panel: Size, viewport: Size, gap: f64) -> Point {
    let mut top = anchor.bottom() + gap;
    if top + panel.height > viewport.height {
        let above = anchor.top() - gap - panel.height;
        if above >= 0.0 {
            top = above;
        }
    }
    let left = clamp_lenient(anchor.left(), gap, viewport.width - panel.width - gap);
    let top = clamp_lenient(top, gap, viewport.height - panel.height - gap);
    Point::new(left, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    #[test]
    fn opens_below_the_trigger() {
        let at = place_menu(Rect::new(100.0, 50.0, 80.0, 30.0), Size::new(200.0, 150.0), VIEWPORT, 8.0);
        assert_eq!(at, Point::new(100.0, 88.0));
    }

    #[test]
    fn flips_above_when_there_is_no_room_below() {
        let at = place_menu(Rect::new(100.0, 500.0, 80.0, 30.0), Size::new(200.0, 150.0), VIEWPORT, 8.0);
        assert_eq!(at, Point::new(100.0, 342.0));
    }

    #[test]
    fn stays_clamped_when_neither_side_fits() {
        let at = place_menu(Rect::new(10.0, 100.0, 40.0, 20.0), Size::new(100.0, 550.0), VIEWPORT, 8.0);
        // Below overflows, above would be negative: clamp from below.
        assert_eq!(at, Point::new(10.0, 42.0));
    }

    #[test]
    fn right_edge_pushes_the_panel_left() {
        let at = place_menu(Rect::new(760.0, 10.0, 30.0, 20.0), Size::new(200.0, 100.0), VIEWPORT, 8.0);
        assert_eq!(at.x, 592.0);
    }

    #[test]
    fn oversized_panel_sticks_to_the_margin() {
        let at = place_menu(Rect::new(300.0, 300.0, 30.0, 20.0), Size::new(900.0, 700.0), VIEWPORT, 8.0);
        assert_eq!(at, Point::new(8.0, 8.0));
    }

    proptest! {
        #[test]
        fn result_respects_the_margin_when_the_panel_fits(
            x in 0.0f64..800.0,
            y in 0.0f64..600.0,
            w in 0.0f64..200.0,
            h in 0.0f64..100.0,
            pw in 0.0f64..780.0,
            ph in 0.0f64..580.0,
        ) {
            let gap = 8.0;
            let at = place_menu(Rect::new(x, y, w, h), Size::new(pw, ph), VIEWPORT, gap);
            let slack = 1e-9;
            prop_assert!(at.x >= gap - slack);
            prop_assert!(at.y >= gap - slack);
            if pw + 2.0 * gap <= VIEWPORT.width {
                prop_assert!(at.x + pw <= VIEWPORT.width - gap + slack);
            }
            if ph + 2.0 * gap <= VIEWPORT.height {
                prop_assert!(at.y + ph <= VIEWPORT.height - gap + slack);
            }
        }
    }
}
