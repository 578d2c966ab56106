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

//! GP0 VRAM fill and move commands
//!
//! Both commands bypass the drawing environment (no clipping, no offset,
//! no mask checks), so the VRAM image is updated here and the backend is
//! told afterwards.

use super::super::backend::RenderBackend;
use super::super::types::{Color, VramRect};
use super::super::vram::VRAM_WIDTH;
use super::super::Gpu;

/// A VRAM-to-VRAM copy (GP0 0x80)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VramCopy {
    pub source: VramRect,
    pub dest_x: u16,
    pub dest_y: u16,
}

const X_MASK: u16 = (VRAM_WIDTH - 1) as u16;

impl<B: RenderBackend> Gpu<B> {
    /// GP0(0x02): Fill Rectangle in VRAM
    ///
    /// # Command Format
    ///
    /// ```text
    /// Word 0: 0x02BBGGRR - Command + fill color
    /// Word 1: YYYYXXXX   - Top-left corner (X in 16-pixel steps)
    /// Word 2: HHHHWWWW   - Size (width rounded up to 16 pixels)
    /// ```
    pub(in crate::core::gpu) fn gp0_fill_rectangle(&mut self, words: &[u32]) {
        let &[command, position, size, ..] = words else {
            return;
        };

        let height_mask = self.vram.height_mask();
        let area = VramRect::new(
            (position & 0x3F0) as u16,
            (position >> 16) as u16 & height_mask,
            (((size & 0x3FF) + 0x0F) & !0x0F) as u16,
            ((size >> 16) & 0x1FF) as u16,
        );
        let color = Color::from_u32(command).to_rgb15();

        for row in 0..area.height {
            let y = area.y.wrapping_add(row) & height_mask;
            for col in 0..area.width {
                let x = area.x.wrapping_add(col) & X_MASK;
                self.vram.write_pixel(x, y, color);
            }
        }

        log::trace!(
            "GP0 fill {}x{} at ({}, {}) color 0x{:04X}",
            area.width,
            area.height,
            area.x,
            area.y,
            color
        );
        self.backend.fill_rectangle(area, color);
    }

    /// GP0(0x80): Copy Rectangle (VRAM to VRAM)
    ///
    /// # Command Format
    ///
    /// ```text
    /// Word 0: 0x80000000
    /// Word 1: YYYYXXXX - Source corner
    /// Word 2: YYYYXXXX - Destination corner
    /// Word 3: HHHHWWWW - Size
    /// ```
    ///
    /// The source is read completely before the destination is written, so
    /// overlapping areas copy as if through a temporary image.
    pub(in crate::core::gpu) fn gp0_move_image(&mut self, words: &[u32]) {
        let &[_, source, dest, size, ..] = words else {
            return;
        };

        let height_mask = self.vram.height_mask();
        let source = VramRect::new(
            (source & 0x3FF) as u16,
            (source >> 16) as u16 & height_mask,
            normalize_extent(size as u16, X_MASK),
            normalize_extent((size >> 16) as u16, height_mask),
        );
        let copy = VramCopy {
            source,
            dest_x: (dest & 0x3FF) as u16,
            dest_y: (dest >> 16) as u16 & height_mask,
        };

        if copy.source.x == copy.dest_x && copy.source.y == copy.dest_y {
            return;
        }

        let mut image = Vec::with_capacity(source.pixel_count());
        for row in 0..source.height {
            let y = source.y.wrapping_add(row) & height_mask;
            for col in 0..source.width {
                let x = source.x.wrapping_add(col) & X_MASK;
                image.push(self.vram.read_pixel(x, y));
            }
        }

        let mut pixels = image.into_iter();
        for row in 0..source.height {
            let y = copy.dest_y.wrapping_add(row) & height_mask;
            for col in 0..source.width {
                let x = copy.dest_x.wrapping_add(col) & X_MASK;
                if let Some(pixel) = pixels.next() {
                    self.vram.write_pixel(x, y, pixel);
                }
            }
        }

        log::trace!(
            "GP0 move {}x{} ({}, {}) -> ({}, {})",
            source.width,
            source.height,
            source.x,
            source.y,
            copy.dest_x,
            copy.dest_y
        );
        self.backend.copy_rectangle(&copy);
    }
}

/// Map a raw transfer extent to `1..=mask+1`, 0 meaning the full size
#[inline(always)]
pub(super) fn normalize_extent(value: u16, mask: u16) -> u16 {
    (value.wrapping_sub(1) & mask) + 1
}
