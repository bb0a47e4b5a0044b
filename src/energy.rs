// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! The energy of a pixel is the squared colour gradient through it,
//! measured once across the rows and once across the columns:
//!
//! ```text
//!        |Δy|² = (Δr)²+(Δg)²+(Δb)²   (row above vs. row below)
//!        |Δx|² = (Δr)²+(Δg)²+(Δb)²   (column left vs. column right)
//!       e(x,y) = |Δy|²+|Δx|²
//! ```
//!
//! Alpha never contributes.  On a border the missing neighbour is
//! replaced by the pixel itself, so the top row compares itself with
//! the row below it and the bottom row with the row above it; the
//! columns behave the same way.  The result is one-sided, and that is
//! what the seam search expects.

use crate::grid::Grid;
use crate::pixels::PixelBuffer;
use image::{GrayImage, Luma};
use itertools::{iproduct, zip};

// Given a position along an axis of length `max + 1`, the pair of
// positions whose difference is that axis's gradient.
#[inline]
fn gradient_span(i: u32, max: u32) -> (u32, u32) {
    if max == 0 {
        (0, 0)
    } else if i == 0 {
        (0, 1)
    } else if i == max {
        (max, max - 1)
    } else {
        (i - 1, i + 1)
    }
}

// Takes the colour channels of two pixels, squares the difference of
// each, and sums them.
#[inline]
fn energy_of_pair(p1: &[u8], p2: &[u8]) -> f64 {
    zip(p1, p2)
        .map(|(&c1, &c2)| {
            let d = i32::from(c1) - i32::from(c2);
            d * d
        })
        .fold(0.0, |acc, sq| acc + f64::from(sq))
}

/// Compute the energy of every pixel in a buffer.  The grid has the
/// buffer's dimensions and every value is zero or more.
pub fn compute_energy(image: &PixelBuffer) -> Grid<f64> {
    let (width, height) = (image.width(), image.height());
    let (mw, mh) = (width - 1, height - 1);

    let mut emap = Grid::new(width, height);
    for (y, x) in iproduct!(0..height, 0..width) {
        let (above, below) = gradient_span(y, mh);
        let (left, right) = gradient_span(x, mw);
        emap[(x, y)] = energy_of_pair(image.rgb(x, above), image.rgb(x, below))
            + energy_of_pair(image.rgb(left, y), image.rgb(right, y));
    }
    emap
}

/// Render an energy grid as a greyscale image, scaled so the hottest
/// pixel is white.  A featureless grid comes out black.
pub fn energy_to_image(energy: &Grid<f64>) -> GrayImage {
    let (width, height) = energy.dimensions();
    let factor = energy.as_slice().iter().cloned().fold(0.0_f64, f64::max);
    GrayImage::from_fn(width, height, |x, y| {
        let scaled = if factor > 0.0 {
            energy[(x, y)] * 255.0 / factor
        } else {
            0.0
        };
        Luma([num_traits::clamp(scaled.round(), 0.0, 255.0) as u8])
    })
}
