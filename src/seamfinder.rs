// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the cheapest seam through an energy grid
//!
//! A vertical seam is one x coordinate per row; a horizontal seam is
//! one y coordinate per column.  Both come out of the same dynamic
//! program, run top-to-bottom or left-to-right, which records for
//! every pixel the cheapest way to reach it and which neighbour it
//! came from.
//!
//! The tie-breaking is part of the contract and must be reproduced
//! exactly: the neighbour straight behind is considered first, then
//! the lower index, then the higher one, and a later neighbour only
//! wins when it is strictly cheaper.  The seam's tail is the cheapest
//! cell in the final row (or column), the lowest index on a tie.

use crate::energy::compute_energy;
use crate::grid::Grid;
use crate::pixels::PixelBuffer;

/// Which way a seam runs through the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Top to bottom; removing it narrows the image.
    Vertical,
    /// Left to right; removing it shortens the image.
    Horizontal,
}

impl Orientation {
    /// The other one.
    pub fn turn(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }
}

/// A connected one-pixel path across the image.  For a vertical seam
/// `indices[y]` is the column removed from row `y`; for a horizontal
/// seam `indices[x]` is the row removed from column `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seam {
    orientation: Orientation,
    indices: Vec<u32>,
}

impl Seam {
    pub fn new(orientation: Orientation, indices: Vec<u32>) -> Self {
        Seam {
            orientation,
            indices,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True when neighbouring entries never differ by more than one.
    pub fn is_connected(&self) -> bool {
        self.indices
            .windows(2)
            .all(|w| (i64::from(w[0]) - i64::from(w[1])).abs() <= 1)
    }
}

#[derive(Default, Debug, Copy, Clone)]
struct EnergyAndBackPointer {
    energy: f64,
    parent: u32,
}

// Walk the candidates in preference order and keep the first one
// that nothing after it strictly undercuts.
#[inline]
fn cheapest(first: (u32, f64), rest: impl IntoIterator<Item = (u32, f64)>) -> (u32, f64) {
    rest.into_iter()
        .fold(first, |best, candidate| if candidate.1 < best.1 { candidate } else { best })
}

// The same-index neighbour, then index - 1, then index + 1, each only
// if it lies inside 0..=max.
#[inline]
fn predecessors(i: u32, max: u32) -> impl Iterator<Item = u32> {
    i.checked_sub(1)
        .into_iter()
        .chain(if i < max { Some(i + 1) } else { None })
}

/// Given an energy grid, return the column to remove from each row,
/// top to bottom.
pub fn energy_to_vertical_seam(energy: &Grid<f64>) -> Seam {
    let (width, height) = energy.dimensions();
    let mut target: Grid<EnergyAndBackPointer> = Grid::new(width, height);

    // The first row keeps its native energies.
    for x in 0..width {
        target[(x, 0)].energy = energy[(x, 0)];
    }

    let maxwidth = width - 1;
    for y in 1..height {
        for x in 0..width {
            let (parent, least) = {
                let above = |px: u32| (px, target[(px, y - 1)].energy);
                cheapest(above(x), predecessors(x, maxwidth).map(above))
            };
            target[(x, y)] = EnergyAndBackPointer {
                energy: energy[(x, y)] + least,
                parent,
            };
        }
    }

    let bottom = height - 1;
    let (mut seam_col, _) = cheapest(
        (0, target[(0, bottom)].energy),
        (1..width).map(|x| (x, target[(x, bottom)].energy)),
    );

    // Working backwards from the tail, collect the column for each
    // row, then put them back in top-to-bottom order.
    let mut indices = (0..height)
        .rev()
        .fold(Vec::with_capacity(height as usize), |mut acc, y| {
            acc.push(seam_col);
            seam_col = target[(seam_col, y)].parent;
            acc
        });
    indices.reverse();
    Seam::new(Orientation::Vertical, indices)
}

/// Given an energy grid, return the row to remove from each column,
/// left to right.
pub fn energy_to_horizontal_seam(energy: &Grid<f64>) -> Seam {
    let (width, height) = energy.dimensions();
    let mut target: Grid<EnergyAndBackPointer> = Grid::new(width, height);

    for y in 0..height {
        target[(0, y)].energy = energy[(0, y)];
    }

    let maxheight = height - 1;
    for x in 1..width {
        for y in 0..height {
            let (parent, least) = {
                let behind = |py: u32| (py, target[(x - 1, py)].energy);
                cheapest(behind(y), predecessors(y, maxheight).map(behind))
            };
            target[(x, y)] = EnergyAndBackPointer {
                energy: energy[(x, y)] + least,
                parent,
            };
        }
    }

    let last = width - 1;
    let (mut seam_row, _) = cheapest(
        (0, target[(last, 0)].energy),
        (1..height).map(|y| (y, target[(last, y)].energy)),
    );

    let mut indices = (0..width)
        .rev()
        .fold(Vec::with_capacity(width as usize), |mut acc, x| {
            acc.push(seam_row);
            seam_row = target[(x, seam_row)].parent;
            acc
        });
    indices.reverse();
    Seam::new(Orientation::Horizontal, indices)
}

/// Recompute the energy of `image` and find its cheapest vertical seam.
pub fn find_vertical_seam(image: &PixelBuffer) -> Seam {
    energy_to_vertical_seam(&compute_energy(image))
}

/// Recompute the energy of `image` and find its cheapest horizontal seam.
pub fn find_horizontal_seam(image: &PixelBuffer) -> Seam {
    energy_to_horizontal_seam(&compute_energy(image))
}

/// Find a seam running the given way.
pub fn find_seam(image: &PixelBuffer, orientation: Orientation) -> Seam {
    match orientation {
        Orientation::Vertical => find_vertical_seam(image),
        Orientation::Horizontal => find_horizontal_seam(image),
    }
}
