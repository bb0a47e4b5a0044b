// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pixel buffers
//!
//! The carver works on flat, row-major RGBA bytes, four per pixel.
//! A `PixelBuffer` can only be built through `from_raw`, so anything
//! holding one may assume `data.len() == width * height * 4` and that
//! neither dimension is zero.

use crate::error::{CarveError, Result};
use image::RgbaImage;

/// Bytes per pixel: R, G, B, A.
pub const CHANNELS: usize = 4;

/// A width and height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Dimensions { width, height }
    }
}

/// An owned RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Number of bytes a `width` x `height` RGBA buffer must hold, or
/// `None` when that doesn't fit in a `usize`.
pub fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

fn checked_len(width: u32, height: u32) -> Result<usize> {
    expected_len(width, height).ok_or(CarveError::TooLarge { width, height })
}

impl PixelBuffer {
    /// Take ownership of raw RGBA bytes, checking them against the
    /// claimed dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CarveError::EmptyDimensions { width, height });
        }
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(CarveError::BufferLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelBuffer {
            width,
            height,
            data,
        })
    }

    /// Build a buffer by asking `f` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut data = Vec::with_capacity(checked_len(width, height)?);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        PixelBuffer::from_raw(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of the first channel of pixel (x, y).
    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS
    }

    /// All four channels of pixel (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + CHANNELS]
    }

    /// The colour channels of pixel (x, y); alpha is left out.
    pub fn rgb(&self, x: u32, y: u32) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + 3]
    }

    /// One row of pixels, as bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.offset(0, y);
        &self.data[start..start + self.width as usize * CHANNELS]
    }

    /// Hand the bytes to the `image` crate, for encoding and the like.
    pub fn into_image(self) -> Result<RgbaImage> {
        let (width, height) = (self.width, self.height);
        RgbaImage::from_raw(width, height, self.data).ok_or_else(|| {
            CarveError::Defect(format!("{}x{} buffer rejected by image", width, height))
        })
    }
}

impl std::convert::TryFrom<RgbaImage> for PixelBuffer {
    type Error = CarveError;

    fn try_from(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        PixelBuffer::from_raw(width, height, image.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn rejects_mismatched_length() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            CarveError::BufferLength {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            PixelBuffer::from_raw(0, 3, vec![]),
            Err(CarveError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn rejects_dimensions_too_large_to_address() {
        let side = u32::max_value();
        assert_eq!(
            PixelBuffer::from_raw(side, side, vec![]),
            Err(CarveError::TooLarge {
                width: side,
                height: side
            })
        );
        assert_eq!(expected_len(side, side), None);
        assert_eq!(expected_len(3, 2), Some(24));
    }

    #[test]
    fn pixels_are_addressed_row_major() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 9, 255]).unwrap();
        assert_eq!(buf.pixel(2, 1), &[2, 1, 9, 255]);
        assert_eq!(buf.rgb(1, 0), &[1, 0, 9]);
        assert_eq!(buf.row(1).len(), 12);
    }

    #[test]
    fn image_round_trip_keeps_bytes() {
        let buf = PixelBuffer::from_fn(2, 3, |x, y| [x as u8, y as u8, 0, 128]).unwrap();
        let image = buf.clone().into_image().unwrap();
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(PixelBuffer::try_from(image).unwrap(), buf);
    }
}
