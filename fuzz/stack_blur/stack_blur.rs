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

#![no_main]

use arbitrary::Arbitrary;
use bigblur::{BlurImageMut, ParallelFor, StackBlur, StackBlurKernel, WindowFill};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    height: u8,
    padding: u8,
    radius: i16,
    thread_override: u8,
    seed: u32,
}

fuzz_target!(|input: Input| {
    fuzz_image(input);
});

fn fuzz_image(input: Input) {
    let width = input.width as u32 + 1;
    let height = input.height as u32 + 1;
    let stride = width * 4 + input.padding as u32;

    let mut state = input.seed | 1;
    let source: Vec<u8> = (0..stride * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect();

    let pool = ParallelFor::with_threads(2).unwrap();
    let radius = input.radius as i32;
    let thread_override = (input.thread_override % 8) as usize;

    let mut expected = source.clone();
    StackBlur::new(StackBlurKernel::Reference)
        .unwrap()
        .blur(
            &mut BlurImageMut::borrow_with_stride(&mut expected, width, height, stride),
            radius,
            &pool,
            thread_override,
        )
        .unwrap();

    for fill in [WindowFill::Sequential, WindowFill::ClosedForm] {
        let mut received = source.clone();
        StackBlur::detect()
            .with_window_fill(fill)
            .blur(
                &mut BlurImageMut::borrow_with_stride(&mut received, width, height, stride),
                radius,
                &pool,
                thread_override,
            )
            .unwrap();
        assert_eq!(received, expected);
    }
}
