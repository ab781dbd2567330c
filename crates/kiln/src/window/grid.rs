use crate::coords::PixelRect;
use crate::error::{Error, Result};

/// Rows × columns partition of a window's framebuffer.
///
/// Cell sizes are not stored; they are derived from the framebuffer size at
/// every query so a resized window lays out correctly on the next draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Grid {
    rows: u32,
    cols: u32,
}

/// Rectangles of one grid cell, in bottom-left framebuffer pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CellLayout {
    /// Whole cell; used as the viewport.
    pub cell: PixelRect,
    /// Cell minus its padding; used as the clip rectangle.
    pub inset: PixelRect,
}

impl Grid {
    pub fn new(rows: u32, cols: u32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidGrid { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// `(width, height)` of every cell. Truncates; the remainder stays unused at
    /// the right/top edge.
    #[inline]
    pub fn cell_size(&self, (fb_w, fb_h): (u32, u32)) -> (u32, u32) {
        (fb_w / self.cols, fb_h / self.rows)
    }

    /// Layout of cell (`col`, `row`). Row 0 is the visual top row.
    pub fn cell(&self, col: u32, row: u32, framebuffer: (u32, u32)) -> Result<CellLayout> {
        if col >= self.cols || row >= self.rows {
            return Err(Error::GridIndexOutOfRange {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }

        let (cw, ch) = self.cell_size(framebuffer);
        let (cw, ch) = (cw as i32, ch as i32);
        let x = col as i32 * cw;
        let y = (self.rows - 1 - row) as i32 * ch;

        // 6% top, 2% bottom/left/right, truncated to whole pixels
        let top = ch * 6 / 100;
        let bottom = ch * 2 / 100;
        let side = cw * 2 / 100;

        Ok(CellLayout {
            cell: PixelRect::new(x, y, cw, ch),
            inset: PixelRect::new(x + side, y + bottom, cw - 2 * side, ch - 2 * top),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(Grid::new(0, 3), Err(Error::InvalidGrid { rows: 0, cols: 3 }));
        assert_eq!(Grid::new(2, 0), Err(Error::InvalidGrid { rows: 2, cols: 0 }));
    }

    #[test]
    fn cell_one_zero_of_two_by_two() {
        let grid = Grid::new(2, 2).unwrap();
        let layout = grid.cell(1, 0, (800, 600)).unwrap();
        assert_eq!(layout.cell, PixelRect::new(400, 300, 400, 300));
        assert_eq!(layout.inset, PixelRect::new(408, 306, 384, 264));
    }

    #[test]
    fn row_zero_is_top() {
        let grid = Grid::new(3, 1).unwrap();
        assert_eq!(grid.cell(0, 0, (90, 90)).unwrap().cell.y, 60);
        assert_eq!(grid.cell(0, 2, (90, 90)).unwrap().cell.y, 0);
    }

    #[test]
    fn out_of_range_fails_fast() {
        let grid = Grid::new(2, 3).unwrap();
        assert_eq!(
            grid.cell(3, 0, (100, 100)),
            Err(Error::GridIndexOutOfRange { col: 3, row: 0, cols: 3, rows: 2 })
        );
        assert!(grid.cell(0, 2, (100, 100)).is_err());
    }

    #[test]
    fn cells_tile_framebuffer_up_to_remainder() {
        let fb = (1001, 767);
        for (rows, cols) in [(1, 1), (2, 3), (3, 7), (5, 4)] {
            let grid = Grid::new(rows, cols).unwrap();
            let width: i32 = (0..cols).map(|c| grid.cell(c, 0, fb).unwrap().cell.width).sum();
            let height: i32 = (0..rows).map(|r| grid.cell(0, r, fb).unwrap().cell.height).sum();
            assert_eq!(width as u32, fb.0 - fb.0 % cols);
            assert_eq!(height as u32, fb.1 - fb.1 % rows);

            // neighbours touch without overlap
            for c in 1..cols {
                let prev = grid.cell(c - 1, 0, fb).unwrap().cell;
                assert_eq!(grid.cell(c, 0, fb).unwrap().cell.x, prev.right());
            }
        }
    }

    #[test]
    fn inset_lies_inside_cell() {
        let grid = Grid::new(4, 4).unwrap();
        for col in 0..4 {
            for row in 0..4 {
                let l = grid.cell(col, row, (1280, 720)).unwrap();
                assert_eq!(l.cell.intersect(l.inset), Some(l.inset));
            }
        }
    }
}
