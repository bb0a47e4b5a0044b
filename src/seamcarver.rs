// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The main function
//!
//! The seam removers and the resize loop that drives them.  Carving
//! alternates between vertical and horizontal seams while both are
//! still owed, then drains whichever direction is left.  After every
//! single seam the caller's progress sink sees the new image and may
//! ask to stop.

use crate::error::{CarveError, Result};
use crate::pixels::{PixelBuffer, CHANNELS};
use crate::seamfinder::{find_seam, Orientation, Seam};
use std::time::Duration;
use tracing::{debug, trace};

fn check_seam(image: &PixelBuffer, seam: &Seam, orientation: Orientation) -> Result<()> {
    let (span, limit) = match orientation {
        Orientation::Vertical => (image.height(), image.width()),
        Orientation::Horizontal => (image.width(), image.height()),
    };
    if seam.orientation() != orientation {
        return Err(CarveError::Defect(format!(
            "expected a {:?} seam, got a {:?} one",
            orientation,
            seam.orientation()
        )));
    }
    if seam.len() != span as usize {
        return Err(CarveError::Defect(format!(
            "{:?} seam has {} entries for an image spanning {}",
            orientation,
            seam.len(),
            span
        )));
    }
    if limit < 2 {
        return Err(CarveError::Defect(format!(
            "cannot remove a {:?} seam from a {}x{} image",
            orientation,
            image.width(),
            image.height()
        )));
    }
    if let Some(bad) = seam.indices().iter().find(|&&i| i >= limit) {
        return Err(CarveError::Defect(format!(
            "{:?} seam index {} is outside 0..{}",
            orientation, bad, limit
        )));
    }
    Ok(())
}

/// Copy `image` without the pixels of a vertical seam, giving an
/// image one column narrower.
pub fn remove_vertical_seam(image: &PixelBuffer, seam: &Seam) -> Result<PixelBuffer> {
    check_seam(image, seam, Orientation::Vertical)?;
    let (width, height) = (image.width(), image.height());
    let mut data = Vec::with_capacity((width as usize - 1) * height as usize * CHANNELS);
    for (y, &cut) in (0..height).zip(seam.indices()) {
        let row = image.row(y);
        let cut = cut as usize * CHANNELS;
        data.extend_from_slice(&row[..cut]);
        data.extend_from_slice(&row[cut + CHANNELS..]);
    }
    PixelBuffer::from_raw(width - 1, height, data)
}

/// Copy `image` without the pixels of a horizontal seam, giving an
/// image one row shorter.
pub fn remove_horizontal_seam(image: &PixelBuffer, seam: &Seam) -> Result<PixelBuffer> {
    check_seam(image, seam, Orientation::Horizontal)?;
    let (width, height) = (image.width(), image.height());
    let cuts = seam.indices();
    let mut data = Vec::with_capacity(width as usize * (height as usize - 1) * CHANNELS);
    for y in 0..height - 1 {
        for x in 0..width {
            // Everything at or below the cut moves up one row.
            let source = if y < cuts[x as usize] { y } else { y + 1 };
            data.extend_from_slice(image.pixel(x, source));
        }
    }
    PixelBuffer::from_raw(width, height - 1, data)
}

/// Remove one seam running the given way.
pub fn remove_seam(image: &PixelBuffer, seam: &Seam) -> Result<PixelBuffer> {
    match seam.orientation() {
        Orientation::Vertical => remove_vertical_seam(image, seam),
        Orientation::Horizontal => remove_horizontal_seam(image, seam),
    }
}

/// What the progress sink wants the carver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Cancel,
}

/// A snapshot taken right after a seam came out.  The buffer is the
/// sink's to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub buffer: PixelBuffer,
    pub seams_removed: u32,
    pub total_seams: u32,
}

impl Progress {
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }
}

/// Linear time-to-finish estimate from a seam count and elapsed time.
pub fn estimate_remaining(removed: u32, total: u32, elapsed: Duration) -> Option<Duration> {
    if removed == 0 || removed >= total {
        return None;
    }
    let per_seam = elapsed.as_secs_f64() / f64::from(removed);
    let remaining = per_seam * f64::from(total - removed);
    if remaining.is_finite() && remaining > 0.0 {
        Some(Duration::from_secs_f64(remaining))
    } else {
        None
    }
}

/// The end of a resize: either the target image, or whatever was left
/// when the sink asked to stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Carved {
    pub buffer: PixelBuffer,
    pub seams_removed: u32,
    pub total_seams: u32,
    pub cancelled: bool,
}

// The state of one resize, owned by `resize` for its whole run.
struct ResizeJob {
    buffer: PixelBuffer,
    vertical: u32,
    horizontal: u32,
    seams_removed: u32,
    total_seams: u32,
}

impl ResizeJob {
    fn new(buffer: PixelBuffer, target_width: u32, target_height: u32) -> Result<Self> {
        let (width, height) = (buffer.width(), buffer.height());
        if target_width == 0 || target_height == 0 {
            return Err(CarveError::TargetTooSmall {
                target_width,
                target_height,
            });
        }
        if target_width > width || target_height > height {
            return Err(CarveError::TargetTooLarge {
                width,
                height,
                target_width,
                target_height,
            });
        }
        let (vertical, horizontal) = (width - target_width, height - target_height);
        Ok(ResizeJob {
            buffer,
            vertical,
            horizontal,
            seams_removed: 0,
            total_seams: vertical + horizontal,
        })
    }

    fn owed(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Vertical => self.vertical,
            Orientation::Horizontal => self.horizontal,
        }
    }

    // Energy is recomputed from the current buffer for every seam.
    fn carve_once(&mut self, orientation: Orientation) -> Result<()> {
        let seam = find_seam(&self.buffer, orientation);
        self.buffer = remove_seam(&self.buffer, &seam)?;
        match orientation {
            Orientation::Vertical => self.vertical -= 1,
            Orientation::Horizontal => self.horizontal -= 1,
        }
        self.seams_removed += 1;
        trace!(
            seams_removed = self.seams_removed,
            width = self.buffer.width(),
            height = self.buffer.height(),
            "removed {:?} seam",
            orientation
        );
        Ok(())
    }

    fn snapshot(&self) -> Progress {
        Progress {
            buffer: self.buffer.clone(),
            seams_removed: self.seams_removed,
            total_seams: self.total_seams,
        }
    }

    fn finish(self, cancelled: bool) -> Carved {
        Carved {
            buffer: self.buffer,
            seams_removed: self.seams_removed,
            total_seams: self.total_seams,
            cancelled,
        }
    }
}

/// Shrink `image` to `target_width` x `target_height` one seam at a
/// time, handing every intermediate image to `sink`.
///
/// Targets must lie between 1 and the current dimensions.  When the
/// sink answers `Flow::Cancel` the carve stops at once and the image
/// as of the last removed seam comes back with `cancelled` set; that
/// is not an error.
pub fn resize<F>(
    image: PixelBuffer,
    target_width: u32,
    target_height: u32,
    mut sink: F,
) -> Result<Carved>
where
    F: FnMut(Progress) -> Flow,
{
    let mut job = ResizeJob::new(image, target_width, target_height)?;
    debug!(
        width = job.buffer.width(),
        height = job.buffer.height(),
        target_width,
        target_height,
        total_seams = job.total_seams,
        "carving"
    );

    let mut direction = Orientation::Vertical;
    while job.vertical > 0 && job.horizontal > 0 {
        job.carve_once(direction)?;
        if sink(job.snapshot()) == Flow::Cancel {
            debug!(seams_removed = job.seams_removed, "carve cancelled");
            return Ok(job.finish(true));
        }
        direction = direction.turn();
    }

    let direction = if job.vertical > 0 {
        Orientation::Vertical
    } else {
        Orientation::Horizontal
    };
    while job.owed(direction) > 0 {
        job.carve_once(direction)?;
        if sink(job.snapshot()) == Flow::Cancel {
            debug!(seams_removed = job.seams_removed, "carve cancelled");
            return Ok(job.finish(true));
        }
    }

    debug!(seams_removed = job.seams_removed, "carve finished");
    Ok(job.finish(false))
}
