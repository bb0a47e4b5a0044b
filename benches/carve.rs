// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use seamcarve::{
    compute_energy, find_vertical_seam, remove_vertical_seam, resize, Flow, PixelBuffer,
};

fn noise(width: u32, height: u32) -> PixelBuffer {
    let mut state = 0x2545_f491_u32;
    PixelBuffer::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        [r, g, b, 255]
    })
    .unwrap()
}

fn one_seam(c: &mut Criterion) {
    let image = noise(320, 240);
    c.bench_function("energy 320x240", move |b| {
        b.iter(|| compute_energy(black_box(&image)))
    });

    let image = noise(320, 240);
    c.bench_function("find and remove one seam 320x240", move |b| {
        b.iter(|| {
            let seam = find_vertical_seam(black_box(&image));
            remove_vertical_seam(&image, &seam)
        })
    });
}

fn small_resize(c: &mut Criterion) {
    let image = noise(96, 64);
    c.bench_function("resize 96x64 to 80x56", move |b| {
        b.iter(|| resize(image.clone(), 80, 56, |_| Flow::Continue))
    });
}

criterion_group!(benches, one_seam, small_resize);
criterion_main!(benches);
