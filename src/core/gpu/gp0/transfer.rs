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

//! GP0 image transfer commands
//!
//! These only set up the transfer cursors. The pixel data itself flows
//! through the data port and is handled by the dispatcher.

use super::super::backend::RenderBackend;
use super::super::status::StatusFlags;
use super::super::types::VramRect;
use super::super::vram::VRAM_WIDTH;
use super::super::Gpu;
use super::fill::normalize_extent;

impl<B: RenderBackend> Gpu<B> {
    /// Decode the destination/source rectangle of an image transfer
    fn transfer_area(&self, position: u32, size: u32) -> VramRect {
        let height_mask = self.vram.height_mask();
        VramRect::new(
            (position & 0x3FF) as u16,
            (position >> 16) as u16 & height_mask,
            normalize_extent(size as u16, (VRAM_WIDTH - 1) as u16),
            normalize_extent((size >> 16) as u16, height_mask),
        )
    }

    /// GP0(0xA0): Copy Rectangle (CPU to VRAM)
    ///
    /// # Command Format
    ///
    /// ```text
    /// Word 0: 0xA0000000
    /// Word 1: YYYYXXXX - Destination corner
    /// Word 2: HHHHWWWW - Size
    /// ```
    ///
    /// The following data words carry two pixels each.
    pub(in crate::core::gpu) fn gp0_load_image(&mut self, words: &[u32]) {
        let &[_, position, size, ..] = words else {
            return;
        };

        let area = self.transfer_area(position, size);
        self.writer.start(area, &self.vram);

        log::debug!(
            "CPU->VRAM transfer: {}x{} at ({}, {})",
            area.width,
            area.height,
            area.x,
            area.y
        );
    }

    /// GP0(0xC0): Copy Rectangle (VRAM to CPU)
    ///
    /// Same layout as 0xA0. The pixels are then read back through the data
    /// port; the status register reports them as ready.
    pub(in crate::core::gpu) fn gp0_store_image(&mut self, words: &[u32]) {
        let &[_, position, size, ..] = words else {
            return;
        };

        let area = self.transfer_area(position, size);
        self.reader.start(area, &self.vram);
        self.status.set(StatusFlags::READY_FOR_VRAM);

        log::debug!(
            "VRAM->CPU transfer: {}x{} at ({}, {})",
            area.width,
            area.height,
            area.x,
            area.y
        );
    }
}
