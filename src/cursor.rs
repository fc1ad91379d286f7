//! The layout cursor: a (page, y, column) value threaded through pure functions.
//!
//! Nothing here touches a page. The assembler compares page indices before and
//! after a call to know when the writer must start a new physical page.

use tracing::debug;

use crate::geometry::{LayoutBox, PageGeometry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub page: usize,
    /// Top of the next block, measured from the top of the page
    pub y: f32,
    /// Column of the next grid cell
    pub column: usize,
}

impl LayoutState {
    pub fn start(geom: &PageGeometry) -> Self {
        Self {
            page: 0,
            y: geom.margin,
            column: 0,
        }
    }

    /// Nothing has been placed on the current page yet.
    pub fn is_at_page_top(&self, geom: &PageGeometry) -> bool {
        self.y <= geom.margin
    }
}

/// Move past a block of `height` plus the inter-block spacing.
/// Clamped to the bottom margin.
pub fn advance(state: LayoutState, height: f32, geom: &PageGeometry) -> LayoutState {
    LayoutState {
        y: (state.y + height + geom.spacing).min(geom.content_bottom()),
        ..state
    }
}

pub fn will_overflow(state: LayoutState, height: f32, geom: &PageGeometry) -> bool {
    state.y + height > geom.content_bottom()
}

pub fn break_page(state: LayoutState, geom: &PageGeometry) -> LayoutState {
    debug!(from = state.page, to = state.page + 1, "page break");
    LayoutState {
        page: state.page + 1,
        y: geom.margin,
        column: 0,
    }
}

/// Place a full-width block atomically: it either fits below the cursor or
/// moves whole to the next page.
///
/// A block taller than the printable height gets a page to itself with its
/// box clipped to the printable area, and the cursor is left at the bottom
/// margin so the following block starts a fresh page.
pub fn place_block(state: LayoutState, height: f32, geom: &PageGeometry) -> (LayoutBox, LayoutState) {
    let printable = geom.printable_height();

    if height > printable {
        let state = if state.is_at_page_top(geom) {
            state
        } else {
            break_page(state, geom)
        };
        let bbox = LayoutBox::new(geom.margin, state.y, geom.printable_width(), printable);
        let after = LayoutState {
            y: geom.content_bottom(),
            ..state
        };
        return (bbox, after);
    }

    let state = if will_overflow(state, height, geom) {
        break_page(state, geom)
    } else {
        state
    };
    let bbox = LayoutBox::new(geom.margin, state.y, geom.printable_width(), height);
    (bbox, advance(state, height, geom))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom() -> PageGeometry {
        // printable area 100 x 200
        PageGeometry::new(140.0, 240.0, 20.0, 10.0, 60.0).unwrap()
    }

    #[test]
    fn test_advance_adds_spacing() {
        let g = geom();
        let s = advance(LayoutState::start(&g), 30.0, &g);
        assert_eq!(s.y, 20.0 + 30.0 + 10.0);
        assert_eq!(s.page, 0);
    }

    #[test]
    fn test_advance_is_clamped_to_bottom_margin() {
        let g = geom();
        let s = advance(LayoutState { page: 0, y: 200.0, column: 0 }, 20.0, &g);
        assert_eq!(s.y, g.content_bottom());
    }

    #[test]
    fn test_will_overflow_boundary() {
        let g = geom();
        let s = LayoutState { page: 0, y: 180.0, column: 1 };
        assert!(!will_overflow(s, 40.0, &g)); // ends exactly on 220
        assert!(will_overflow(s, 40.5, &g));
    }

    #[test]
    fn test_break_page_resets_cursor() {
        let g = geom();
        let s = break_page(LayoutState { page: 3, y: 150.0, column: 1 }, &g);
        assert_eq!(s, LayoutState { page: 4, y: 20.0, column: 0 });
    }

    #[test]
    fn test_place_block_breaks_before_overflowing() {
        let g = geom();
        let (bbox, after) = place_block(LayoutState { page: 0, y: 190.0, column: 0 }, 50.0, &g);
        assert_eq!(bbox.y, g.margin);
        assert_eq!(after.page, 1);
        assert_eq!(after.y, 20.0 + 50.0 + 10.0);
    }

    #[test]
    fn test_place_block_keeps_fitting_block_on_page() {
        let g = geom();
        let (bbox, after) = place_block(LayoutState { page: 2, y: 100.0, column: 0 }, 50.0, &g);
        assert_eq!(bbox, LayoutBox::new(20.0, 100.0, 100.0, 50.0));
        assert_eq!(after.page, 2);
    }

    #[test]
    fn test_oversized_block_gets_exactly_one_page() {
        let g = geom();
        let start = LayoutState { page: 0, y: 60.0, column: 0 };

        let (bbox, after) = place_block(start, 1_000.0, &g);
        assert_eq!(after.page, 1);
        assert_eq!(bbox.y, g.margin);
        assert_eq!(bbox.height, g.printable_height());
        assert!(bbox.bottom() <= g.content_bottom());

        // the next block cannot share the oversized block's page
        let (next, next_state) = place_block(after, 10.0, &g);
        assert_eq!(next_state.page, 2);
        assert_eq!(next.y, g.margin);
    }

    #[test]
    fn test_oversized_block_on_fresh_page_does_not_break() {
        let g = geom();
        let (_, after) = place_block(LayoutState::start(&g), 5_000.0, &g);
        assert_eq!(after.page, 0);
    }
}
