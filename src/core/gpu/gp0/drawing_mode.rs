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

//! GP0 drawing environment commands (0xE1-0xE6)
//!
//! Besides informing the backend, these commands feed the status register
//! (texture page, dither and mask bits) and the values returned by the
//! GP1(0x10) info queries.

use super::super::backend::RenderBackend;
use super::super::status::StatusFlags;
use super::super::types::{sign_extend_11, DrawMode, Point, TextureWindow};
use super::super::Gpu;

/// A decoded drawing environment command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStateCommand {
    DrawMode(DrawMode),
    TextureWindow(TextureWindow),
    DrawAreaTopLeft { x: u16, y: u16 },
    DrawAreaBottomRight { x: u16, y: u16 },
    DrawOffset(Point),
    MaskSettings { set_mask_bit: bool, check_mask: bool },
}

impl<B: RenderBackend> Gpu<B> {
    /// GP0(0xE1): Draw Mode Setting
    ///
    /// Bits 0-10 are mirrored into status bits 0-10.
    pub(in crate::core::gpu) fn gp0_draw_mode(&mut self, word: u32) {
        self.status.replace_bits(
            StatusFlags::TEXTURE_PAGE | StatusFlags::DITHER | StatusFlags::DRAWING_ALLOWED,
            word,
        );
        self.draw_mode = DrawMode::from_u32(word);
        self.backend
            .set_draw_state(&DrawStateCommand::DrawMode(self.draw_mode));
    }

    /// GP0(0xE2): Texture Window Setting
    pub(in crate::core::gpu) fn gp0_texture_window(&mut self, word: u32) {
        self.info.texture_window = word & 0x000F_FFFF;
        self.backend
            .set_draw_state(&DrawStateCommand::TextureWindow(TextureWindow::from_u32(word)));
    }

    /// GP0(0xE3): Set Drawing Area Top-Left
    pub(in crate::core::gpu) fn gp0_draw_area_top_left(&mut self, word: u32) {
        self.info.draw_area_start = word & 0x003F_FFFF;
        let (x, y) = self.draw_area_corner(word);
        self.display.set_draw_area_start(x, y);
        self.backend
            .set_draw_state(&DrawStateCommand::DrawAreaTopLeft { x, y });
    }

    /// GP0(0xE4): Set Drawing Area Bottom-Right
    pub(in crate::core::gpu) fn gp0_draw_area_bottom_right(&mut self, word: u32) {
        self.info.draw_area_end = word & 0x003F_FFFF;
        let (x, y) = self.draw_area_corner(word);
        self.display.set_draw_area_end(x, y);
        self.backend
            .set_draw_state(&DrawStateCommand::DrawAreaBottomRight { x, y });
    }

    /// GP0(0xE5): Set Drawing Offset
    ///
    /// X and Y are signed 11-bit values.
    pub(in crate::core::gpu) fn gp0_draw_offset(&mut self, word: u32) {
        self.info.draw_offset = word & 0x003F_FFFF;
        let offset = Point::new(sign_extend_11(word), sign_extend_11(word >> 11));
        self.display.set_draw_offset(offset);
        self.backend
            .set_draw_state(&DrawStateCommand::DrawOffset(offset));
    }

    /// GP0(0xE6): Mask Bit Setting
    ///
    /// Bit 0 forces the mask bit on drawn pixels, bit 1 skips masked pixels.
    pub(in crate::core::gpu) fn gp0_mask_settings(&mut self, word: u32) {
        self.status.replace_bits(
            StatusFlags::MASK_DRAWN | StatusFlags::MASK_ENABLED,
            (word & 0x03) << 11,
        );
        self.backend.set_draw_state(&DrawStateCommand::MaskSettings {
            set_mask_bit: word & 0x01 != 0,
            check_mask: word & 0x02 != 0,
        });
    }

    fn draw_area_corner(&self, word: u32) -> (u16, u16) {
        let x = (word & 0x3FF) as u16;
        let y = ((word >> 10) & 0x3FF) as u16 & self.vram.height_mask();
        (x, y)
    }
}
