// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors
//!
//! Two families live here.  The first are the caller's mistakes: a
//! buffer that doesn't match its dimensions, or a target the carver
//! can't reach by shrinking.  The second, `Defect`, means the carver
//! contradicted itself (a seam that doesn't fit the image it was found
//! in) and should be read as a bug report, not as bad input.

use failure::Fail;

/// Everything that can go wrong while carving.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum CarveError {
    #[fail(display = "image dimensions must be at least 1x1, got {}x{}", width, height)]
    EmptyDimensions { width: u32, height: u32 },

    #[fail(
        display = "pixel buffer holds {} bytes, but {}x{} RGBA needs {}",
        actual, width, height, expected
    )]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[fail(display = "a {}x{} RGBA buffer is too large to address", width, height)]
    TooLarge { width: u32, height: u32 },

    #[fail(
        display = "seamcarve cannot upscale: target {}x{} exceeds source {}x{}",
        target_width, target_height, width, height
    )]
    TargetTooLarge {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },

    #[fail(
        display = "target dimensions must be at least 1x1, got {}x{}",
        target_width, target_height
    )]
    TargetTooSmall { target_width: u32, target_height: u32 },

    #[fail(display = "internal defect: {}", _0)]
    Defect(String),

    #[fail(display = "carving engine unavailable: {}", _0)]
    Engine(String),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, CarveError>;
