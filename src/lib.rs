// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware image shrinking by seam carving.
//!
//! The pipeline, from the leaves up: `energy` scores every pixel,
//! `seamfinder` finds the cheapest connected path through those
//! scores, `seamcarver` cuts that path out and repeats until the image
//! reaches its target size, and `engine` runs the whole thing on a
//! worker thread behind a cancellable message channel.

pub mod energy;
pub mod engine;
pub mod error;
pub mod grid;
pub mod pixels;
pub mod seamcarver;
pub mod seamfinder;
pub mod sizing;
pub mod timeline;

pub use energy::{compute_energy, energy_to_image};
pub use engine::{Command, Engine, EngineHandle, Event, JobId, ResizeRequest};
pub use error::{CarveError, Result};
pub use grid::Grid;
pub use pixels::{Dimensions, PixelBuffer};
pub use seamcarver::{remove_horizontal_seam, remove_vertical_seam, resize, Carved, Flow, Progress};
pub use seamfinder::{
    energy_to_horizontal_seam, energy_to_vertical_seam, find_horizontal_seam, find_vertical_seam,
    Orientation, Seam,
};
pub use timeline::Timeline;
