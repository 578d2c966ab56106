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

//! GP0 polygon commands (0x20-0x3F)

use super::super::backend::RenderBackend;
use super::super::types::{Color, TexCoord, Vertex};
use super::super::Gpu;

/// A decoded triangle or quad
///
/// # Command Format
///
/// The opcode bits select the layout:
///
/// ```text
/// bit 4  gouraud shaded (one color word per vertex)
/// bit 3  quad (4 vertices instead of 3)
/// bit 2  textured (one texcoord word per vertex)
/// bit 1  semi-transparent
/// bit 0  raw texture (no color modulation)
/// ```
///
/// Per vertex: `[color]` (shaded, except the first) `vertex` `[texcoord]`.
/// The first texcoord word carries the CLUT in its upper half, the second
/// the texture page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Polygon {
    pub vertex_count: usize,
    pub vertices: [Vertex; 4],
    pub colors: [Color; 4],
    pub tex_coords: [TexCoord; 4],
    pub clut: u16,
    pub texpage: u16,
    pub shaded: bool,
    pub textured: bool,
    pub semi_transparent: bool,
    pub raw_texture: bool,
}

impl Polygon {
    /// Decode a polygon packet; `None` if words are missing
    pub fn decode(words: &[u32]) -> Option<Self> {
        let mut words = words.iter().copied();
        let command = words.next()?;
        let opcode = (command >> 24) as u8;

        let mut polygon = Polygon {
            vertex_count: if opcode & 0x08 != 0 { 4 } else { 3 },
            shaded: opcode & 0x10 != 0,
            textured: opcode & 0x04 != 0,
            semi_transparent: opcode & 0x02 != 0,
            raw_texture: opcode & 0x01 != 0,
            ..Default::default()
        };

        let base_color = Color::from_u32(command);
        for i in 0..polygon.vertex_count {
            polygon.colors[i] = if polygon.shaded && i > 0 {
                Color::from_u32(words.next()?)
            } else {
                base_color
            };

            polygon.vertices[i] = Vertex::from_u32(words.next()?);

            if polygon.textured {
                let texcoord = words.next()?;
                polygon.tex_coords[i] = TexCoord::from_u32(texcoord);
                match i {
                    0 => polygon.clut = (texcoord >> 16) as u16,
                    1 => polygon.texpage = (texcoord >> 16) as u16,
                    _ => {}
                }
            }
        }

        Some(polygon)
    }

    /// Vertices actually used
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices[..self.vertex_count]
    }
}

impl<B: RenderBackend> Gpu<B> {
    /// GP0(0x20-0x3F): forward a polygon to the backend
    pub(in crate::core::gpu) fn gp0_polygon(&mut self, words: &[u32]) {
        match Polygon::decode(words) {
            Some(polygon) => self.backend.draw_polygon(&polygon),
            None => log::warn!("GP0: truncated polygon packet ({} words)", words.len()),
        }
    }
}
