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
use std::cell::UnsafeCell;

/// Byte buffer shared between workers that write disjoint pixels.
///
/// Rows and columns interleave in memory, so a column range cannot be handed
/// out as a `&mut` sub-slice; each worker instead gets this view and promises
/// to touch only its own lines.
#[derive(Copy, Clone, Debug)]
pub(crate) struct UnsafeSlice<'a, T> {
    pub slice: &'a [UnsafeCell<T>],
}

unsafe impl<T: Send + Sync> Send for UnsafeSlice<'_, T> {}

unsafe impl<T: Send + Sync> Sync for UnsafeSlice<'_, T> {}

impl<'a, T> UnsafeSlice<'a, T> {
    pub fn new(slice: &'a mut [T]) -> Self {
        let ptr = slice as *mut [T] as *const [UnsafeCell<T>];
        Self {
            slice: unsafe { &*ptr },
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.slice.len()
    }
}

impl UnsafeSlice<'_, u8> {
    /// Reads four bytes at `offset` as a little-endian pixel.
    ///
    /// SAFETY: `offset + 4` must be in bounds and no other thread may be
    /// writing those bytes.
    #[inline(always)]
    pub unsafe fn read_pixel(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= self.len());
        let ptr = self.slice.as_ptr().add(offset) as *const [u8; 4];
        u32::from_le_bytes(ptr.read_unaligned())
    }

    /// Writes a little-endian pixel at `offset`.
    ///
    /// SAFETY: It is UB if two threads write to the same pixel without
    /// synchronization, `offset + 4` must be in bounds.
    #[inline(always)]
    pub unsafe fn write_pixel(&self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= self.len());
        let ptr = UnsafeCell::raw_get(self.slice.as_ptr().add(offset)) as *mut [u8; 4];
        ptr.write_unaligned(value.to_le_bytes());
    }
}
