// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The carving engine
//!
//! Carving a large image takes seconds to minutes, so it runs on its
//! own worker thread and talks to the caller only through messages:
//! `Command`s go in, `Event`s come out, and the pixels travel by move.
//! The worker keeps nothing from one job to the next.
//!
//! A job reports `Progress` after every seam, then exactly one
//! `Complete`, unless it is cancelled (nothing more is delivered) or
//! fails (one `Error`).  Cancellation is cooperative: the worker looks
//! for it between seams, never in the middle of one.
//!
//! ```no_run
//! use seamcarve::{Engine, Event, PixelBuffer, ResizeRequest};
//!
//! # fn main() -> Result<(), seamcarve::CarveError> {
//! let image = PixelBuffer::from_fn(64, 48, |x, y| [x as u8, y as u8, 0, 255])?;
//! let mut engine = Engine::spawn()?;
//! engine.start(ResizeRequest::new(image, 48, 40))?;
//! while let Some(event) = engine.recv() {
//!     if let Event::Complete { buffer, .. } = event {
//!         println!("{}x{}", buffer.width(), buffer.height());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{CarveError, Result};
use crate::pixels::PixelBuffer;
use crate::seamcarver::{resize, Flow};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Identifies one job on one engine.  Every event carries the id of
/// the job that produced it.
pub type JobId = u64;

/// Everything needed to start a job.  The pixels are unchecked raw
/// RGBA bytes; a mismatch with the dimensions comes back as an
/// `Event::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub target_width: u32,
    pub target_height: u32,
}

impl ResizeRequest {
    pub fn new(image: PixelBuffer, target_width: u32, target_height: u32) -> Self {
        let (width, height) = (image.width(), image.height());
        ResizeRequest {
            pixels: image.into_bytes(),
            width,
            height,
            target_width,
            target_height,
        }
    }

    /// Seams the job will remove, if the request is well formed.
    pub fn total_seams(&self) -> u32 {
        self.width
            .saturating_sub(self.target_width)
            .saturating_add(self.height.saturating_sub(self.target_height))
    }
}

/// Caller to engine.
#[derive(Debug)]
pub enum Command {
    Start { job: JobId, request: ResizeRequest },
    Cancel,
}

/// Engine to caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// One more seam is gone; `buffer` is the image at that point.
    Progress {
        job: JobId,
        buffer: PixelBuffer,
        seams_removed: u32,
        total_seams: u32,
    },
    /// The target size was reached.
    Complete { job: JobId, buffer: PixelBuffer },
    /// The job could not run, or broke.
    Error { job: JobId, message: String },
}

impl Event {
    pub fn job(&self) -> JobId {
        match *self {
            Event::Progress { job, .. }
            | Event::Complete { job, .. }
            | Event::Error { job, .. } => job,
        }
    }

    /// True for the last event a job can produce.
    pub fn is_terminal(&self) -> bool {
        match self {
            Event::Progress { .. } => false,
            Event::Complete { .. } | Event::Error { .. } => true,
        }
    }
}

// Drain whatever commands arrived since the last seam.  A dropped
// handle counts as a cancel.
fn cancel_requested(job: JobId, commands: &Receiver<Command>) -> bool {
    loop {
        match commands.try_recv() {
            Ok(Command::Cancel) => return true,
            Ok(Command::Start { job: ignored, .. }) => {
                warn!(job, ignored, "start received while a job is running; ignoring it");
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => return true,
        }
    }
}

fn carve(
    job: JobId,
    request: ResizeRequest,
    commands: &Receiver<Command>,
    events: &Sender<Event>,
) -> Result<()> {
    let ResizeRequest {
        pixels,
        width,
        height,
        target_width,
        target_height,
    } = request;
    let image = PixelBuffer::from_raw(width, height, pixels)?;

    let carved = resize(image, target_width, target_height, |progress| {
        if cancel_requested(job, commands) {
            return Flow::Cancel;
        }
        let event = Event::Progress {
            job,
            buffer: progress.buffer,
            seams_removed: progress.seams_removed,
            total_seams: progress.total_seams,
        };
        // Nobody is listening any more.
        if events.send(event).is_err() {
            return Flow::Cancel;
        }
        Flow::Continue
    })?;

    if carved.cancelled || cancel_requested(job, commands) {
        debug!(job, seams_removed = carved.seams_removed, "job cancelled");
        return Ok(());
    }

    debug!(job, seams_removed = carved.seams_removed, "job complete");
    let _ = events.send(Event::Complete {
        job,
        buffer: carved.buffer,
    });
    Ok(())
}

fn run_job(
    job: JobId,
    request: ResizeRequest,
    commands: &Receiver<Command>,
    events: &Sender<Event>,
) {
    debug!(
        job,
        width = request.width,
        height = request.height,
        target_width = request.target_width,
        target_height = request.target_height,
        "job started"
    );
    let carving = AssertUnwindSafe(|| carve(job, request, commands, events));
    let message = match panic::catch_unwind(carving) {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err.to_string(),
        Err(_) => CarveError::Defect("carving engine panicked".to_string()).to_string(),
    };
    warn!(job, %message, "job failed");
    let _ = events.send(Event::Error { job, message });
}

// The worker loop.  Ends when the handle goes away.
fn serve(commands: Receiver<Command>, events: Sender<Event>) {
    while let Ok(command) = commands.recv() {
        match command {
            Command::Start { job, request } => run_job(job, request, &commands, &events),
            Command::Cancel => trace!("cancel with no job running"),
        }
    }
    debug!("engine shut down");
}

/// Spawns carving engines.
pub struct Engine;

impl Engine {
    /// Start a worker thread and return the caller's end of it.
    pub fn spawn() -> Result<EngineHandle> {
        let (command_tx, command_rx) = channel::unbounded();
        let (event_tx, event_rx) = channel::unbounded();
        let worker = thread::Builder::new()
            .name("seamcarve-engine".to_string())
            .spawn(move || serve(command_rx, event_tx))
            .map_err(|e| CarveError::Engine(e.to_string()))?;
        Ok(EngineHandle {
            commands: command_tx,
            events: event_rx,
            worker: Some(worker),
            next_job: 1,
            current: None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Outstanding {
    job: JobId,
    cancelled: bool,
    finished: bool,
}

impl Outstanding {
    fn busy(&self) -> bool {
        !(self.cancelled || self.finished)
    }
}

/// The caller's end of an engine.
///
/// One job runs at a time.  Once a job is cancelled the handle stops
/// delivering anything it sent, even events already in flight, so the
/// caller never sees work that happened after the cancel.  Dropping
/// the handle cancels the running job and lets the worker exit.
pub struct EngineHandle {
    commands: Sender<Command>,
    events: Receiver<Event>,
    worker: Option<JoinHandle<()>>,
    next_job: JobId,
    current: Option<Outstanding>,
}

impl EngineHandle {
    /// Hand a job to the engine.  Fails if the previous job has not
    /// yet delivered its terminal event and was not cancelled.
    pub fn start(&mut self, request: ResizeRequest) -> Result<JobId> {
        if self.is_busy() {
            return Err(CarveError::Engine("a job is already running".to_string()));
        }
        let job = self.next_job;
        self.next_job += 1;
        self.commands
            .send(Command::Start { job, request })
            .map_err(|_| CarveError::Engine("worker has exited".to_string()))?;
        self.current = Some(Outstanding {
            job,
            cancelled: false,
            finished: false,
        });
        Ok(job)
    }

    /// Ask the running job to stop after its current seam.  Safe to
    /// call at any time, any number of times.
    pub fn cancel(&mut self) {
        if let Some(current) = self.current.as_mut() {
            if current.busy() {
                current.cancelled = true;
                let _ = self.commands.send(Command::Cancel);
            }
        }
    }

    /// True while a job may still produce events for the caller.
    pub fn is_busy(&self) -> bool {
        self.current.map_or(false, |c| c.busy())
    }

    /// The id of the most recently started job.
    pub fn current_job(&self) -> Option<JobId> {
        self.current.map(|c| c.job)
    }

    fn admit(&mut self, event: Event) -> Option<Event> {
        let current = self.current.as_mut()?;
        if event.job() != current.job || !current.busy() {
            trace!(job = event.job(), "dropping stale event");
            return None;
        }
        if event.is_terminal() {
            current.finished = true;
        }
        Some(event)
    }

    /// Wait for the next event of the running job.  `None` once the
    /// job has finished or been cancelled.
    pub fn recv(&mut self) -> Option<Event> {
        while self.is_busy() {
            let event = self.events.recv().ok()?;
            if let Some(event) = self.admit(event) {
                return Some(event);
            }
        }
        None
    }

    /// Like `recv`, without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        while self.is_busy() {
            let event = self.events.try_recv().ok()?;
            if let Some(event) = self.admit(event) {
                return Some(event);
            }
        }
        None
    }

    /// Like `recv`, waiting at most `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Event> {
        let deadline = Instant::now() + timeout;
        while self.is_busy() {
            let left = deadline.saturating_duration_since(Instant::now());
            let event = self.events.recv_timeout(left).ok()?;
            if let Some(event) = self.admit(event) {
                return Some(event);
            }
        }
        None
    }

    /// Cancel anything running and wait for the worker to exit.
    pub fn shutdown(mut self) -> Result<()> {
        self.cancel();
        let EngineHandle {
            commands, worker, ..
        } = self;
        drop(commands);
        match worker {
            Some(worker) => worker
                .join()
                .map_err(|_| CarveError::Engine("worker panicked".to_string())),
            None => Ok(()),
        }
    }
}
