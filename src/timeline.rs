// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frame timelines
//!
//! The engine reports every seam, which is far more frames than anyone
//! wants to keep.  A `Timeline` samples them: the original, every
//! `interval`-th seam, and the final result, with `interval` chosen so
//! that at most `MAX_FRAMES` frames (and at most `MEMORY_BUDGET` bytes
//! of them, counting every frame at the original size) are kept.

use crate::pixels::{expected_len, PixelBuffer};

/// Most frames a timeline will sample.
pub const MAX_FRAMES: u32 = 50;

/// Most bytes of sampled frames a timeline aims to hold.
pub const MEMORY_BUDGET: usize = 200 * 1024 * 1024;

/// Where in the carve a frame was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameIndex {
    /// After this many seams; 0 is the original image.
    Seam(u32),
    /// The finished image.
    Final,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: FrameIndex,
    pub buffer: PixelBuffer,
}

/// How many seams apart sampled frames should be for an image of this
/// size losing `total_seams` seams.  Never less than 1.
pub fn sample_interval(width: u32, height: u32, total_seams: u32) -> u32 {
    let frame_size = expected_len(width, height).unwrap_or(usize::max_value()).max(1);
    let by_memory = (MEMORY_BUDGET / frame_size).min(MAX_FRAMES as usize).max(1) as u32;
    let total = total_seams.max(1);
    ((total + by_memory - 1) / by_memory).max(1)
}

/// Sampled frames from one carve, oldest first.
#[derive(Debug, Clone)]
pub struct Timeline {
    interval: u32,
    frames: Vec<Frame>,
}

impl Timeline {
    /// Begin a timeline with the original image as its first frame.
    pub fn new(original: PixelBuffer, total_seams: u32) -> Self {
        let interval = sample_interval(original.width(), original.height(), total_seams);
        Timeline {
            interval,
            frames: vec![Frame {
                index: FrameIndex::Seam(0),
                buffer: original,
            }],
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Keep a copy of `buffer` if `seams_removed` falls on the sampling
    /// interval.  Returns whether it was kept.
    pub fn offer(&mut self, seams_removed: u32, buffer: &PixelBuffer) -> bool {
        if seams_removed == 0 || seams_removed % self.interval != 0 {
            return false;
        }
        self.frames.push(Frame {
            index: FrameIndex::Seam(seams_removed),
            buffer: buffer.clone(),
        });
        true
    }

    /// Close the timeline with the finished image.
    pub fn finish(&mut self, buffer: PixelBuffer) {
        self.frames.push(Frame {
            index: FrameIndex::Final,
            buffer,
        });
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> PixelBuffer {
        let len = expected_len(width, height).unwrap();
        PixelBuffer::from_raw(width, height, vec![0; len]).unwrap()
    }

    #[test]
    fn small_jobs_keep_every_frame() {
        assert_eq!(sample_interval(100, 100, 30), 1);
        assert_eq!(sample_interval(100, 100, 50), 1);
        assert_eq!(sample_interval(100, 100, 0), 1);
    }

    #[test]
    fn long_jobs_are_thinned_to_fifty_frames() {
        assert_eq!(sample_interval(100, 100, 51), 2);
        assert_eq!(sample_interval(100, 100, 500), 10);
    }

    #[test]
    fn big_frames_are_thinned_by_memory() {
        // 40 MiB a frame leaves room for 5.
        assert_eq!(sample_interval(5120, 2048, 100), 20);
        // A frame bigger than the whole budget still allows one.
        assert_eq!(sample_interval(8192, 8192, 10), 10);
    }

    #[test]
    fn unaddressable_frames_still_allow_one() {
        let side = u32::max_value();
        assert_eq!(sample_interval(side, side, 7), 7);
    }

    #[test]
    fn offers_are_sampled_on_the_interval() {
        let mut timeline = Timeline::new(blank(10, 10), 150);
        assert_eq!(timeline.interval(), 3);
        let kept: Vec<u32> = (1..=9)
            .filter(|&n| timeline.offer(n, &blank(10, 10)))
            .collect();
        assert_eq!(kept, vec![3, 6, 9]);
        timeline.finish(blank(4, 4));

        let indices: Vec<FrameIndex> = timeline.frames().iter().map(|f| f.index).collect();
        assert_eq!(
            indices,
            vec![
                FrameIndex::Seam(0),
                FrameIndex::Seam(3),
                FrameIndex::Seam(6),
                FrameIndex::Seam(9),
                FrameIndex::Final
            ]
        );
        assert_eq!(timeline.into_frames().last().unwrap().buffer.width(), 4);
    }
}
