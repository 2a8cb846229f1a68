// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use bigblur::{BlurImageMut, ParallelFor, StackBlur, StackBlurKernel, ThreadingPolicy};
use criterion::{criterion_group, criterion_main, Criterion};
use std::num::NonZeroUsize;

fn synthetic_image(width: u32, height: u32) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| {
            let (x, y) = (i % width, i / width);
            [(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255]
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let (width, height) = (1920u32, 1080u32);
    let src_bytes = synthetic_image(width, height);

    for threads in [1usize, 4] {
        let threads = NonZeroUsize::new(threads).unwrap_or(NonZeroUsize::MIN);
        let pool = ParallelFor::new(ThreadingPolicy::Fixed(threads)).unwrap();
        for kernel in StackBlurKernel::supported() {
            let blur = StackBlur::new(kernel).unwrap();
            c.bench_function(
                &format!("bigblur: RGBA stack blur {kernel} ({threads} threads)"),
                |b| {
                    let mut dst_bytes = src_bytes.to_vec();
                    let mut dst_image = BlurImageMut::borrow(&mut dst_bytes, width, height);
                    b.iter(|| {
                        blur.blur(&mut dst_image, 77, &pool, 0).unwrap();
                    })
                },
            );
        }
    }

    let rayon_pool = rayon::ThreadPoolBuilder::new().build().unwrap();
    c.bench_function("bigblur: RGBA stack blur (rayon)", |b| {
        let mut dst_bytes = src_bytes.to_vec();
        let mut dst_image = BlurImageMut::borrow(&mut dst_bytes, width, height);
        b.iter(|| {
            bigblur::stack_blur(&mut dst_image, 77, &rayon_pool, 0).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
