// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Target sizes
//!
//! Turning what a user asked for into dimensions the carver accepts:
//! every dimension is clamped into `1..=original`, an aspect lock
//! derives the free dimension from the one given, and a percentage
//! (clamped into `1..=100`) scales both.

use crate::pixels::Dimensions;

/// Clamp a requested dimension into `1..=original`.
pub fn clamp_dimension(requested: u32, original: u32) -> u32 {
    requested.min(original).max(1)
}

// `value / along * other`, rounded, at least 1.
fn proportional(value: u32, along: u32, other: u32) -> u32 {
    let scaled = f64::from(value) / f64::from(along.max(1)) * f64::from(other);
    (scaled.round() as u32).max(1)
}

/// A target with the given width.  With `keep_aspect` the height
/// follows; otherwise it stays at the original height.
pub fn from_width(original: Dimensions, width: u32, keep_aspect: bool) -> Dimensions {
    let width = clamp_dimension(width, original.width);
    let height = if keep_aspect {
        proportional(width, original.width, original.height)
    } else {
        original.height
    };
    Dimensions::new(width, height)
}

/// A target with the given height; the mirror of `from_width`.
pub fn from_height(original: Dimensions, height: u32, keep_aspect: bool) -> Dimensions {
    let height = clamp_dimension(height, original.height);
    let width = if keep_aspect {
        proportional(height, original.height, original.width)
    } else {
        original.width
    };
    Dimensions::new(width, height)
}

/// Both dimensions scaled to `percent` of the original.
pub fn from_percentage(original: Dimensions, percent: u32) -> Dimensions {
    let percent = percent.min(100).max(1);
    Dimensions::new(
        proportional(percent, 100, original.width),
        proportional(percent, 100, original.height),
    )
}

/// Resolve an optional width and height.  When both are given the
/// aspect lock is moot and each is simply clamped.
pub fn resolve(
    original: Dimensions,
    width: Option<u32>,
    height: Option<u32>,
    keep_aspect: bool,
) -> Dimensions {
    match (width, height) {
        (Some(w), Some(h)) => Dimensions::new(
            clamp_dimension(w, original.width),
            clamp_dimension(h, original.height),
        ),
        (Some(w), None) => from_width(original, w, keep_aspect),
        (None, Some(h)) => from_height(original, h, keep_aspect),
        (None, None) => original,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTO: Dimensions = Dimensions {
        width: 400,
        height: 300,
    };

    #[test]
    fn requests_are_clamped() {
        assert_eq!(clamp_dimension(0, 10), 1);
        assert_eq!(clamp_dimension(25, 10), 10);
        assert_eq!(clamp_dimension(7, 10), 7);
    }

    #[test]
    fn aspect_lock_derives_the_other_side() {
        assert_eq!(from_width(PHOTO, 200, true), Dimensions::new(200, 150));
        assert_eq!(from_width(PHOTO, 200, false), Dimensions::new(200, 300));
        assert_eq!(from_height(PHOTO, 100, true), Dimensions::new(133, 100));
        assert_eq!(from_width(PHOTO, 1, true), Dimensions::new(1, 1));
    }

    #[test]
    fn percentages_scale_both_sides() {
        assert_eq!(from_percentage(PHOTO, 50), Dimensions::new(200, 150));
        assert_eq!(from_percentage(PHOTO, 0), Dimensions::new(4, 3));
        assert_eq!(from_percentage(PHOTO, 250), PHOTO);
    }

    #[test]
    fn resolve_picks_the_right_rule() {
        assert_eq!(resolve(PHOTO, None, None, true), PHOTO);
        assert_eq!(resolve(PHOTO, Some(200), None, true), Dimensions::new(200, 150));
        assert_eq!(resolve(PHOTO, Some(200), Some(290), true), Dimensions::new(200, 290));
        assert_eq!(resolve(PHOTO, None, Some(900), false), PHOTO);
    }
}
