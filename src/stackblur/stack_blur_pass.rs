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
use crate::stackblur::accumulator::Accumulator;
use crate::stackblur::division_table::Divisor;
use crate::stackblur::line_view::{LineSet, LineView};
use crate::unsafe_slice::UnsafeSlice;
use crate::MAX_RADIUS;

pub(crate) const MAX_STACK_SIZE: usize = MAX_RADIUS * 2 + 1;

/// Blurs lines `[begin, end)` of a [LineSet] in place.
///
/// SAFETY: the image layout must be validated for the set, `end <= count`, and
/// no other thread may touch these lines during the call.
pub(crate) type LinesProcessor =
    unsafe fn(UnsafeSlice<'_, u8>, &LineSet, usize, usize, usize, &Divisor);

/// Circular buffer holding the `2 * radius + 1` values inside the window.
pub(crate) struct SlidingStack<A> {
    items: [A; MAX_STACK_SIZE],
    div: usize,
    radius: usize,
    /// Slot of the window centre
    i_stack: usize,
}

impl<A: Accumulator> SlidingStack<A> {
    pub fn new() -> Self {
        SlidingStack {
            items: [A::zero(); MAX_STACK_SIZE],
            div: 1,
            radius: 0,
            i_stack: 0,
        }
    }

    #[inline(always)]
    pub fn reset(&mut self, radius: usize) {
        debug_assert!(radius <= MAX_RADIUS);
        self.radius = radius;
        self.div = radius * 2 + 1;
        self.i_stack = radius;
    }

    #[inline(always)]
    pub fn store(&mut self, slot: usize, value: A) {
        self.items[slot] = value;
    }

    /// Puts `value` where the pixel leaving the window was and returns it
    #[inline(always)]
    pub fn replace_oldest(&mut self, value: A) -> A {
        let mut stack_start = self.i_stack + self.div - self.radius;
        if stack_start >= self.div {
            stack_start -= self.div;
        }
        std::mem::replace(&mut self.items[stack_start], value)
    }

    /// Moves the centre one slot forward and returns the value now in it
    #[inline(always)]
    pub fn advance(&mut self) -> A {
        self.i_stack += 1;
        if self.i_stack >= self.div {
            self.i_stack = 0;
        }
        self.items[self.i_stack]
    }
}

#[inline(always)]
fn slide<A: Accumulator>(
    stack: &mut SlidingStack<A>,
    incoming: A,
    sum: &mut A,
    sum_in: &mut A,
    sum_out: &mut A,
) {
    *sum -= *sum_out;
    *sum_out -= stack.replace_oldest(incoming);
    *sum_in += incoming;
    *sum += *sum_in;
    let center = stack.advance();
    *sum_out += center;
    *sum_in -= center;
}

/// Window filled one clamped pixel at a time, works for any line length.
#[inline(always)]
fn blur_line_sequential<A: Accumulator>(
    line: &LineView,
    stack: &mut SlidingStack<A>,
    radius: usize,
    divisor: &Divisor,
) {
    stack.reset(radius);
    let r = radius as isize;

    let mut sum = A::zero();
    let mut sum_in = A::zero();
    let mut sum_out = A::zero();

    for i in -r..=r {
        let v = A::from_pixel(line.get(i));
        stack.store((i + r) as usize, v);
        sum += v * (radius + 1 - i.unsigned_abs()) as u32;
        if i <= 0 {
            sum_out += v;
        } else {
            sum_in += v;
        }
    }

    for i in 0..line.len() as isize {
        line.set(i, sum.divide(divisor));
        let incoming = A::from_pixel(line.get(i + r + 1));
        slide(stack, incoming, &mut sum, &mut sum_in, &mut sum_out);
    }
}

/// Same output as [blur_line_sequential] for lines longer than `radius`.
///
/// Left edge pixels are all equal, so their weighted sum is a triangular
/// number times the pixel; past the last `radius + 1` outputs every incoming
/// pixel is the right edge pixel, loaded once.
#[inline(always)]
fn blur_line_closed_form<A: Accumulator>(
    line: &LineView,
    stack: &mut SlidingStack<A>,
    radius: usize,
    divisor: &Divisor,
) {
    let len = line.len();
    debug_assert!(len > radius);
    stack.reset(radius);

    let first = A::from_pixel(line.get(0));
    for slot in 0..=radius {
        stack.store(slot, first);
    }
    let n = radius as u32 + 1;
    let mut sum = first * (n * (n + 1) / 2);
    let mut sum_out = first * n;

    let mut sum_in = A::zero();
    for i in 1..=radius {
        let v = A::from_pixel(line.get(i as isize));
        stack.store(i + radius, v);
        sum += v * (radius + 1 - i) as u32;
        sum_in += v;
    }

    let steady = len - (radius + 1);
    for i in 0..steady {
        line.set(i as isize, sum.divide(divisor));
        let incoming = A::from_pixel(line.get((i + radius + 1) as isize));
        slide(stack, incoming, &mut sum, &mut sum_in, &mut sum_out);
    }

    let border = A::from_pixel(line.get(len as isize - 1));
    for i in steady..len {
        line.set(i as isize, sum.divide(divisor));
        slide(stack, border, &mut sum, &mut sum_in, &mut sum_out);
    }
}

/// Generic pass body shared by every accumulator tier.
///
/// SAFETY: see [LinesProcessor].
#[inline(always)]
pub(crate) unsafe fn blur_lines<A: Accumulator, const CLOSED_FORM: bool>(
    pixels: UnsafeSlice<'_, u8>,
    lines: &LineSet,
    begin: usize,
    end: usize,
    radius: usize,
    divisor: &Divisor,
) {
    let mut stack = SlidingStack::<A>::new();
    for index in begin..end {
        let line = lines.line(pixels, index);
        if CLOSED_FORM && line.len() > radius {
            blur_line_closed_form(&line, &mut stack, radius, divisor);
        } else {
            blur_line_sequential(&line, &mut stack, radius, divisor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stackblur::accumulator::PortableLanes;
    use crate::stackblur::division_table::DIVISION_TABLE;
    use crate::stackblur::sliding_window::SlidingWindow;
    use crate::weights::triangular_kernel;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force_line(src: &[u32], radius: usize) -> Vec<u32> {
        let kernel = triangular_kernel(radius);
        let den: u32 = kernel.iter().sum();
        let last = src.len() as isize - 1;
        (0..src.len() as isize)
            .map(|i| {
                let mut acc = [0u32; 4];
                for (k, &w) in kernel.iter().enumerate() {
                    let j = (i + k as isize - radius as isize).clamp(0, last) as usize;
                    for (a, c) in acc.iter_mut().zip(src[j].to_le_bytes()) {
                        *a += c as u32 * w;
                    }
                }
                u32::from_le_bytes(acc.map(|a| (a / den) as u8))
            })
            .collect()
    }

    fn run_line<A: Accumulator, const CLOSED_FORM: bool>(src: &[u32], radius: usize) -> Vec<u32> {
        let mut bytes: Vec<u8> = src.iter().flat_map(|x| x.to_le_bytes()).collect();
        let len = src.len();
        {
            let pixels = UnsafeSlice::new(&mut bytes);
            let rows = LineSet::rows(len, 1, len * 4);
            unsafe {
                blur_lines::<A, CLOSED_FORM>(pixels, &rows, 0, 1, radius, &DIVISION_TABLE[radius]);
            }
        }
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_line_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(17);
        for len in [1usize, 2, 3, 5, 8, 13, 40, 100] {
            let src: Vec<u32> = (0..len).map(|_| rng.random()).collect();
            for radius in [1usize, 2, 3, 6, 12, 50, 254] {
                let expected = brute_force_line(&src, radius);
                assert_eq!(run_line::<SlidingWindow, false>(&src, radius), expected);
                assert_eq!(run_line::<SlidingWindow, true>(&src, radius), expected);
                assert_eq!(run_line::<PortableLanes, false>(&src, radius), expected);
                assert_eq!(run_line::<PortableLanes, true>(&src, radius), expected);
            }
        }
    }

    #[test]
    fn test_constant_line_is_unchanged() {
        let src = vec![0xff808080u32; 17];
        for radius in [1usize, 4, 16, 30] {
            assert_eq!(run_line::<PortableLanes, true>(&src, radius), src);
            assert_eq!(run_line::<SlidingWindow, false>(&src, radius), src);
        }
    }

    #[test]
    fn test_sliding_stack_rotation() {
        let mut stack = SlidingStack::<SlidingWindow>::new();
        stack.reset(1);
        for slot in 0..3 {
            stack.store(slot, SlidingWindow::from_components(slot as i32, 0, 0, 0));
        }
        // Centre is slot 1, the oldest is slot 0
        let old = stack.replace_oldest(SlidingWindow::from_components(9, 0, 0, 0));
        assert_eq!(old.r, 0);
        assert_eq!(stack.advance().r, 2);
        let old = stack.replace_oldest(SlidingWindow::from_components(8, 0, 0, 0));
        assert_eq!(old.r, 1);
        assert_eq!(stack.advance().r, 9);
    }
}
