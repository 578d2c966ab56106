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

//! GP0 rectangle (sprite) commands (0x60-0x7F)

use super::super::backend::RenderBackend;
use super::super::types::{Color, TexCoord, Vertex};
use super::super::Gpu;

/// A decoded rectangle
///
/// # Command Format
///
/// ```text
/// Word 0: 0xCCRRGGBB - Command + color
/// Word 1: YYYYXXXX   - Top-left vertex
/// Word 2: CLUT/VV/UU - Texture coordinate (textured only)
/// Word 3: HHHHWWWW   - Size (variable-size only)
/// ```
///
/// Opcode bits 3-4 select the size: 0 = variable, 1 = 1x1, 2 = 8x8,
/// 3 = 16x16. Bit 2 textured, bit 1 semi-transparent, bit 0 raw texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub position: Vertex,
    pub width: u16,
    pub height: u16,
    pub color: Color,
    pub tex_coord: TexCoord,
    pub clut: u16,
    pub textured: bool,
    pub semi_transparent: bool,
    pub raw_texture: bool,
}

impl Rectangle {
    /// Decode a rectangle packet; `None` if words are missing
    pub fn decode(words: &[u32]) -> Option<Self> {
        let mut words = words.iter().copied();
        let command = words.next()?;
        let opcode = (command >> 24) as u8;

        let mut rect = Rectangle {
            color: Color::from_u32(command),
            position: Vertex::from_u32(words.next()?),
            textured: opcode & 0x04 != 0,
            semi_transparent: opcode & 0x02 != 0,
            raw_texture: opcode & 0x01 != 0,
            ..Default::default()
        };

        if rect.textured {
            let texcoord = words.next()?;
            rect.tex_coord = TexCoord::from_u32(texcoord);
            rect.clut = (texcoord >> 16) as u16;
        }

        let (width, height) = match (opcode >> 3) & 0x03 {
            0 => {
                let size = words.next()?;
                ((size & 0x3FF) as u16, ((size >> 16) & 0x1FF) as u16)
            }
            1 => (1, 1),
            2 => (8, 8),
            _ => (16, 16),
        };
        rect.width = width;
        rect.height = height;

        Some(rect)
    }
}

impl<B: RenderBackend> Gpu<B> {
    /// GP0(0x60-0x7F): forward a rectangle to the backend
    pub(in crate::core::gpu) fn gp0_rectangle(&mut self, words: &[u32]) {
        match Rectangle::decode(words) {
            Some(rect) => self.backend.draw_rectangle(&rect),
            None => log::warn!("GP0: truncated rectangle packet ({} words)", words.len()),
        }
    }
}
