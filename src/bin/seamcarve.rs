// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use seamcarve::seamcarver::estimate_remaining;
use seamcarve::timeline::sample_interval;
use seamcarve::{
    compute_energy, energy_to_image, sizing, Dimensions, Engine, Event, PixelBuffer,
    ResizeRequest, Timeline,
};
use std::convert::TryFrom;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use clap::{crate_version, App, Arg, ArgMatches};
use failure::{format_err, Error};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn cli<'a, 'b>() -> App<'a, 'b> {
    App::new("seamcarve")
        .version(crate_version!())
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Content-aware image shrinking by seam carving")
        .arg(
            Arg::with_name("input")
                .help("The image to shrink")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Where to write the result; the format follows the extension")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("width")
                .help("Target width in pixels")
                .short("w")
                .long("width")
                .value_name("PIXELS")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("height")
                .help("Target height in pixels")
                .short("H")
                .long("height")
                .value_name("PIXELS")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("percent")
                .help("Scale both dimensions to this percentage (1-100)")
                .short("p")
                .long("percent")
                .value_name("PERCENT")
                .takes_value(true)
                .conflicts_with_all(&["width", "height"]),
        )
        .arg(
            Arg::with_name("keep-aspect")
                .help("Derive the missing dimension from the one given")
                .short("k")
                .long("keep-aspect"),
        )
        .arg(
            Arg::with_name("frames")
                .help("Write a sampled timeline of intermediate frames into this directory")
                .long("frames")
                .value_name("DIR")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("energy")
                .help("Write the original image's energy map to this file")
                .long("energy")
                .value_name("PATH")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .help("More logging; repeat for more still (RUST_LOG overrides)")
                .short("v")
                .multiple(true),
        )
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("seamcarve={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn number(matches: &ArgMatches, name: &str) -> Result<Option<u32>, Error> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|e| format_err!("--{} {:?}: {}", name, raw, e)),
    }
}

fn target_size(matches: &ArgMatches, original: Dimensions) -> Result<Dimensions, Error> {
    if let Some(percent) = number(matches, "percent")? {
        return Ok(sizing::from_percentage(original, percent));
    }
    Ok(sizing::resolve(
        original,
        number(matches, "width")?,
        number(matches, "height")?,
        matches.is_present("keep-aspect"),
    ))
}

fn describe(remaining: Duration) -> String {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    if secs >= 60 {
        format!("~{}m {}s remaining", secs / 60, secs % 60)
    } else {
        format!("~{}s remaining", secs)
    }
}

fn write_frames(dir: &Path, timeline: Timeline) -> Result<(), Error> {
    fs::create_dir_all(dir)?;
    for (n, frame) in timeline.into_frames().into_iter().enumerate() {
        let path = dir.join(format!("frame-{:03}.png", n));
        debug!(path = %path.display(), index = ?frame.index, "writing frame");
        frame.buffer.into_image()?.save(&path)?;
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    let matches = cli().get_matches();
    init_logging(matches.occurrences_of("verbose"));

    let input = matches
        .value_of("input")
        .ok_or_else(|| format_err!("no input image"))?;
    let output = matches
        .value_of("output")
        .ok_or_else(|| format_err!("no output path"))?;

    let image = PixelBuffer::try_from(image::open(input)?.to_rgba())?;
    let original = image.dimensions();
    let target = target_size(&matches, original)?;
    info!(
        "{}: {}x{} -> {}x{}",
        input, original.width, original.height, target.width, target.height
    );

    if let Some(path) = matches.value_of("energy") {
        energy_to_image(&compute_energy(&image)).save(path)?;
    }

    let request = ResizeRequest::new(image, target.width, target.height);
    let report_every = sample_interval(original.width, original.height, request.total_seams());
    let mut timeline = match matches.value_of("frames") {
        Some(_) => Some(Timeline::new(
            PixelBuffer::from_raw(original.width, original.height, request.pixels.clone())?,
            request.total_seams(),
        )),
        None => None,
    };

    let mut engine = Engine::spawn()?;
    engine.start(request)?;
    let started = Instant::now();
    let mut carved = None;
    while let Some(event) = engine.recv() {
        match event {
            Event::Progress {
                buffer,
                seams_removed,
                total_seams,
                ..
            } => {
                if seams_removed % report_every == 0 {
                    let eta = estimate_remaining(seams_removed, total_seams, started.elapsed());
                    info!(
                        "{}/{} seams, {}x{}{}",
                        seams_removed,
                        total_seams,
                        buffer.width(),
                        buffer.height(),
                        eta.map(|d| format!(", {}", describe(d))).unwrap_or_default()
                    );
                }
                if let Some(timeline) = timeline.as_mut() {
                    timeline.offer(seams_removed, &buffer);
                }
            }
            Event::Complete { buffer, .. } => carved = Some(buffer),
            Event::Error { message, .. } => return Err(format_err!("{}", message)),
        }
    }
    engine.shutdown()?;

    let carved = carved.ok_or_else(|| format_err!("the engine stopped without a result"))?;
    let (width, height) = (carved.width(), carved.height());
    if let (Some(dir), Some(mut timeline)) = (matches.value_of("frames"), timeline) {
        timeline.finish(carved.clone());
        write_frames(Path::new(dir), timeline)?;
    }
    carved.into_image()?.save(output)?;

    println!(
        "{}: {}x{} -> {}x{} in {:.2?}",
        output,
        original.width,
        original.height,
        width,
        height,
        started.elapsed()
    );
    Ok(())
}
