// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Two-dimensional grids
//!
//! An addressable row-major field of values, one per pixel.  It holds
//! a plain `f64` for the energy field, and an energy + parent pair
//! while the seam search is running.

use std::ops::{Index, IndexMut};

/// A width-by-height field of `P`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<P: Default + Copy> {
    width: u32,
    height: u32,
    cells: Vec<P>,
}

impl<P: Default + Copy> Grid<P> {
    /// A grid filled with `P::default()`.
    pub fn new(width: u32, height: u32) -> Self {
        Grid {
            width,
            height,
            cells: vec![P::default(); width as usize * height as usize],
        }
    }

    /// Wrap existing row-major cells.  Returns `None` when the vector
    /// doesn't hold exactly `width * height` values.
    pub fn from_vec(width: u32, height: u32, cells: Vec<P>) -> Option<Self> {
        if cells.len() != width as usize * height as usize {
            return None;
        }
        Some(Grid {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[P] {
        &self.cells
    }

    pub fn into_vec(self) -> Vec<P> {
        self.cells
    }

    // All of the index math lives here and nowhere else.
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

impl<P: Default + Copy> Index<(u32, u32)> for Grid<P> {
    type Output = P;

    fn index(&self, (x, y): (u32, u32)) -> &P {
        &self.cells[self.offset(x, y)]
    }
}

impl<P: Default + Copy> IndexMut<(u32, u32)> for Grid<P> {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        let offset = self.offset(x, y);
        &mut self.cells[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addressing_is_row_major() {
        let grid = Grid::from_vec(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid[(0, 0)], 0);
        assert_eq!(grid[(2, 0)], 2);
        assert_eq!(grid[(0, 1)], 3);
        assert_eq!(grid[(2, 1)], 5);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(Grid::from_vec(3, 2, vec![0u8; 5]).is_none());
    }

    #[test]
    fn writes_land_in_place() {
        let mut grid: Grid<u32> = Grid::new(2, 2);
        grid[(1, 1)] = 7;
        assert_eq!(grid.into_vec(), vec![0, 0, 0, 7]);
    }
}
