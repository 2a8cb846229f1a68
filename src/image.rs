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
use crate::util::check_slice_size;
use crate::BlurError;
use std::fmt::Debug;

/// Bytes per pixel, every image is four interleaved 8-bit channels
pub const PIXEL_SIZE: usize = 4;

#[derive(Debug)]
pub enum BufferStore<'a, T: Copy + Debug> {
    Borrowed(&'a mut [T]),
    Owned(Vec<T>),
}

impl<T: Copy + Debug> BufferStore<'_, T> {
    #[allow(clippy::should_implement_trait)]
    pub fn borrow(&self) -> &[T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn borrow_mut(&mut self) -> &mut [T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }
}

/// Mutable RGBA image store.
///
/// Channel order is up to the caller, every channel is blurred the same way.
pub struct BlurImageMut<'a> {
    pub data: BufferStore<'a, u8>,
    pub width: u32,
    pub height: u32,
    /// Image stride in bytes, might be 0 for tightly packed rows
    pub stride: u32,
}

impl Default for BlurImageMut<'_> {
    fn default() -> Self {
        BlurImageMut {
            data: BufferStore::Owned(Vec::new()),
            width: 0,
            height: 0,
            stride: 0,
        }
    }
}

impl<'a> BlurImageMut<'a> {
    /// Allocates zeroed, tightly packed image
    pub fn alloc(width: u32, height: u32) -> Self {
        Self {
            data: BufferStore::Owned(vec![
                0u8;
                width as usize * height as usize * PIXEL_SIZE
            ]),
            width,
            height,
            stride: width * PIXEL_SIZE as u32,
        }
    }

    /// Mutable borrows existing data
    /// Stride will be default `width * 4`
    pub fn borrow(arr: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            data: BufferStore::Borrowed(arr),
            width,
            height,
            stride: width * PIXEL_SIZE as u32,
        }
    }

    /// Mutable borrows existing data with padded rows
    pub fn borrow_with_stride(arr: &'a mut [u8], width: u32, height: u32, stride: u32) -> Self {
        Self {
            data: BufferStore::Borrowed(arr),
            width,
            height,
            stride,
        }
    }

    /// Returns row stride in bytes
    #[inline]
    pub fn row_stride(&self) -> u32 {
        if self.stride == 0 {
            self.width * PIXEL_SIZE as u32
        } else {
            self.stride
        }
    }

    /// Checks if layout matches necessary requirements
    #[inline]
    pub fn check_layout(&self) -> Result<(), BlurError> {
        check_slice_size(
            self.data.borrow(),
            self.row_stride() as usize,
            self.width as usize,
            self.height as usize,
            PIXEL_SIZE,
        )
    }

    /// Reads the pixel at `(x, y)` as little-endian `u32`, byte 0 in the low bits
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let offset = y as usize * self.row_stride() as usize + x as usize * PIXEL_SIZE;
        let px = &self.data.borrow()[offset..offset + PIXEL_SIZE];
        u32::from_le_bytes([px[0], px[1], px[2], px[3]])
    }

    /// Writes the pixel at `(x, y)`
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) {
        let offset = y as usize * self.row_stride() as usize + x as usize * PIXEL_SIZE;
        self.data.borrow_mut()[offset..offset + PIXEL_SIZE].copy_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_layout() {
        let image = BlurImageMut::alloc(7, 3);
        assert_eq!(image.row_stride(), 28);
        assert_eq!(image.data.borrow().len(), 7 * 3 * 4);
        assert!(image.check_layout().is_ok());
    }

    #[test]
    fn test_zero_stride_means_packed() {
        let mut data = vec![0u8; 16];
        let mut image = BlurImageMut::borrow(&mut data, 2, 2);
        image.stride = 0;
        assert_eq!(image.row_stride(), 8);
        assert!(image.check_layout().is_ok());
    }

    #[test]
    fn test_pixel_round_trip_with_padding() {
        let mut data = vec![0u8; 12 * 2];
        let mut image = BlurImageMut::borrow_with_stride(&mut data, 2, 2, 12);
        image.set_pixel(1, 1, 0x11223344);
        assert_eq!(image.pixel(1, 1), 0x11223344);
        assert_eq!(image.pixel(0, 1), 0);
        assert_eq!(&data[16..20], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = BlurImageMut::default();
        assert_eq!(image.check_layout(), Err(BlurError::ZeroBaseSize));
    }
}
