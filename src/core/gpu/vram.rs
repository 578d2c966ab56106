// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Emulated video memory
//!
//! VRAM is a 1024-pixel wide image of 16-bit pixels, 512 lines high on a
//! standard console and 1024 lines on Zinc arcade boards. The image sits in
//! the middle of a larger allocation with a security margin on each side;
//! transfer cursors are plain indices into that allocation and are folded
//! back into `[begin, end)` with [`VideoMemory::wrap`].

use crate::core::error::{GpuError, Result};

/// VRAM width in pixels
pub const VRAM_WIDTH: usize = 1024;

/// VRAM height on a standard console
pub const VRAM_HEIGHT: usize = 512;

/// VRAM height on boards with doubled video memory
pub const VRAM_HEIGHT_DOUBLED: usize = 1024;

/// Pixels reserved before and after the VRAM image
pub const SECURITY_MARGIN: usize = 256 * 1024;

/// Initial value of the DMA address history slots
const DMA_CHECK_INIT: u32 = 0x00FF_FFFF;

/// Video memory buffer with wrap-safe cursor arithmetic
///
/// # Examples
///
/// ```
/// use pandora_gs::core::gpu::VideoMemory;
///
/// let mut vram = VideoMemory::new();
/// vram.init(false).unwrap();
///
/// // One line past the end lands on the first line again
/// let past_end = vram.end() as isize + 5;
/// assert_eq!(vram.wrap(past_end), vram.begin() + 5);
/// ```
#[derive(Debug, Clone)]
pub struct VideoMemory {
    /// Margin + image + margin, empty until `init`
    buffer: Vec<u16>,

    /// Lines in the VRAM image
    height: usize,

    /// Address history of the DMA endless-chain detector
    dma_check: [u32; 3],
}

impl VideoMemory {
    /// Create an unallocated video memory
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            height: VRAM_HEIGHT,
            dma_check: [DMA_CHECK_INIT; 3],
        }
    }

    /// Allocate and zero-fill the VRAM image
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::VramAllocation`] when the allocator cannot provide
    /// the buffer.
    pub fn init(&mut self, doubled: bool) -> Result<()> {
        let height = if doubled {
            VRAM_HEIGHT_DOUBLED
        } else {
            VRAM_HEIGHT
        };
        let len = SECURITY_MARGIN * 2 + VRAM_WIDTH * height;

        let mut buffer: Vec<u16> = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| GpuError::VramAllocation {
                bytes: len * std::mem::size_of::<u16>(),
            })?;
        buffer.resize(len, 0);

        self.buffer = buffer;
        self.height = height;
        self.reset_dma_check();

        log::debug!("VRAM allocated: {}x{} pixels", VRAM_WIDTH, height);
        Ok(())
    }

    /// Release the buffer; safe to call when never initialized
    pub fn close(&mut self) {
        self.buffer = Vec::new();
    }

    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Lines in the VRAM image
    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Mask applied to Y coordinates
    #[inline(always)]
    pub fn height_mask(&self) -> u16 {
        (self.height - 1) as u16
    }

    /// Pixels in the VRAM image
    #[inline(always)]
    pub fn size(&self) -> usize {
        VRAM_WIDTH * self.height
    }

    /// First cursor position inside the image
    #[inline(always)]
    pub fn begin(&self) -> usize {
        SECURITY_MARGIN
    }

    /// Cursor position one past the image
    #[inline(always)]
    pub fn end(&self) -> usize {
        SECURITY_MARGIN + self.size()
    }

    /// Fold a cursor position back into `[begin, end)`
    ///
    /// Both loops are needed: after a row skip a cursor can overflow one
    /// copy of the image and land below another.
    pub fn wrap(&self, position: isize) -> usize {
        let size = self.size() as isize;
        let begin = self.begin() as isize;
        let end = self.end() as isize;

        let mut position = position;
        while position >= end {
            position -= size;
        }
        while position < begin {
            position += size;
        }
        position as usize
    }

    /// Cursor position of pixel (x, y), coordinates masked to the image
    #[inline]
    pub fn position(&self, x: u16, y: u16) -> usize {
        let x = x as usize & (VRAM_WIDTH - 1);
        let y = y as usize & (self.height - 1);
        self.begin() + y * VRAM_WIDTH + x
    }

    /// Read the pixel at a (possibly unwrapped) cursor position
    #[inline]
    pub fn read(&self, position: isize) -> u16 {
        self.buffer.get(self.wrap(position)).copied().unwrap_or(0)
    }

    /// Write the pixel at a (possibly unwrapped) cursor position
    #[inline]
    pub fn write(&mut self, position: isize, value: u16) {
        let index = self.wrap(position);
        if let Some(pixel) = self.buffer.get_mut(index) {
            *pixel = value;
        }
    }

    /// Read a pixel by coordinate
    pub fn read_pixel(&self, x: u16, y: u16) -> u16 {
        self.read(self.position(x, y) as isize)
    }

    /// Write a pixel by coordinate
    pub fn write_pixel(&mut self, x: u16, y: u16, value: u16) {
        let position = self.position(x, y);
        self.write(position as isize, value);
    }

    /// Read-only view of the VRAM image (row-major, 1024 pixels per line)
    pub fn pixels(&self) -> &[u16] {
        if self.is_initialized() {
            &self.buffer[self.begin()..self.end()]
        } else {
            &[]
        }
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u16] {
        if self.is_initialized() {
            let (begin, end) = (self.begin(), self.end());
            &mut self.buffer[begin..end]
        } else {
            &mut []
        }
    }

    /// Forget the DMA address history
    pub fn reset_dma_check(&mut self) {
        self.dma_check = [DMA_CHECK_INIT; 3];
    }

    /// Record a DMA block address and report a suspected cycle
    ///
    /// Only two bracket slots are kept (the last address seen below and the
    /// last seen above the previous one), so longer cycles slip through.
    /// The caller's block cap catches those.
    pub fn check_dma_endless_chain(&mut self, address: u32) -> bool {
        if address == self.dma_check[1] || address == self.dma_check[2] {
            return true;
        }

        if address < self.dma_check[0] {
            self.dma_check[1] = address;
        } else {
            self.dma_check[2] = address;
        }
        self.dma_check[0] = address;
        false
    }
}

impl Default for VideoMemory {
    fn default() -> Self {
        Self::new()
    }
}
