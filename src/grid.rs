//! Two-column image grid placement.
//!
//! The plan depends only on how many images an item has. Whether a fetch
//! later succeeds decides if a cell is drawn, never where it sits.

use crate::cursor::{advance, break_page, will_overflow, LayoutState};
use crate::geometry::{LayoutBox, PageGeometry};

pub const COLUMNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Position of the image within its item
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub page: usize,
    pub bbox: LayoutBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub cells: Vec<GridCell>,
    /// Cursor below the last row, column reset
    pub after: LayoutState,
}

impl GridPlan {
    pub fn rows(&self) -> usize {
        self.cells.last().map_or(0, |cell| cell.row + 1)
    }
}

/// Place `count` images starting at `state`.
///
/// Every row start is a page-break point: the cursor moves down one cell
/// height and the row goes to the next page if it would cross the bottom margin.
pub fn plan_grid(state: LayoutState, count: usize, geom: &PageGeometry) -> GridPlan {
    if count == 0 {
        return GridPlan {
            cells: Vec::new(),
            after: state,
        };
    }

    let mut cursor = LayoutState { column: 0, ..state };
    let mut cells = Vec::with_capacity(count);

    for index in 0..count {
        let column = index % COLUMNS;
        let row = index / COLUMNS;

        if column == 0 {
            if index > 0 {
                cursor = advance(cursor, geom.cell_height, geom);
            }
            if will_overflow(cursor, geom.cell_height, geom) && !cursor.is_at_page_top(geom) {
                cursor = break_page(cursor, geom);
            }
        }
        cursor.column = column;

        cells.push(GridCell {
            index,
            row,
            column,
            page: cursor.page,
            bbox: LayoutBox::new(geom.column_x(column), cursor.y, geom.cell_width, geom.cell_height),
        });
    }

    let after = LayoutState {
        column: 0,
        ..advance(cursor, geom.cell_height, geom)
    };
    GridPlan { cells, after }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_and_column_parity() {
        let g = PageGeometry::a4();
        for n in 0..12 {
            let plan = plan_grid(LayoutState::start(&g), n, &g);
            assert_eq!(plan.cells.len(), n);
            assert_eq!(plan.rows(), n.div_ceil(2));
            for (k, cell) in plan.cells.iter().enumerate() {
                assert_eq!(cell.index, k);
                assert_eq!(cell.column, k % 2);
                assert_eq!(cell.row, k / 2);
            }
        }
    }

    #[test]
    fn test_zero_images_leave_cursor_untouched() {
        let g = PageGeometry::a4();
        let start = LayoutState { page: 1, y: 300.0, column: 0 };
        let plan = plan_grid(start, 0, &g);
        assert!(plan.cells.is_empty());
        assert_eq!(plan.after, start);
    }

    #[test]
    fn test_cells_in_a_row_share_y() {
        let g = PageGeometry::a4();
        let plan = plan_grid(LayoutState::start(&g), 4, &g);
        assert_eq!(plan.cells[0].bbox.y, plan.cells[1].bbox.y);
        assert_eq!(plan.cells[2].bbox.y, plan.cells[3].bbox.y);
        assert_eq!(plan.cells[2].bbox.y - plan.cells[0].bbox.y, g.cell_height + g.spacing);
        assert_eq!(plan.cells[1].bbox.x, g.margin + g.cell_width + g.spacing);
    }

    #[test]
    fn test_row_boundary_breaks_page_and_resets_column() {
        let g = PageGeometry::a4();
        // Two rows fit below y=122.5, the third would end past the bottom margin
        let start = LayoutState { page: 0, y: 122.5, column: 1 };
        let plan = plan_grid(start, 5, &g);

        let pages: Vec<usize> = plan.cells.iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![0, 0, 0, 0, 1]);
        assert_eq!(plan.cells[4].column, 0);
        assert_eq!(plan.cells[4].bbox.y, g.margin);
        assert_eq!(plan.after.page, 1);
        assert_eq!(plan.after.column, 0);
        assert_eq!(plan.after.y, g.margin + g.cell_height + g.spacing);
    }

    #[test]
    fn test_grid_start_is_a_break_point() {
        let g = PageGeometry::a4();
        let start = LayoutState { page: 0, y: 700.0, column: 0 };
        let plan = plan_grid(start, 1, &g);
        assert_eq!(plan.cells[0].page, 1);
        assert_eq!(plan.cells[0].bbox.y, g.margin);
    }

    #[test]
    fn test_every_cell_stays_inside_the_page() {
        let g = PageGeometry::a4();
        let plan = plan_grid(LayoutState { page: 0, y: 400.0, column: 0 }, 17, &g);
        for cell in &plan.cells {
            assert!(cell.bbox.y >= g.margin);
            assert!(cell.bbox.bottom() <= g.content_bottom());
        }
    }
}
