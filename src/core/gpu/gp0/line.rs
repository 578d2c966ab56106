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

//! GP0 line drawing commands (0x40-0x5F)

use super::super::backend::RenderBackend;
use super::super::types::{Color, Vertex};
use super::super::Gpu;
use super::{POLYLINE_END, POLYLINE_END_MASK};

/// A decoded line or polyline
///
/// # Command Format
///
/// ```text
/// Flat:    0xCCRRGGBB, vertex, vertex, ... [terminator]
/// Shaded:  0xCCRRGGBB, vertex, color, vertex, ... [terminator]
/// ```
///
/// Opcode bit 4 selects shading, bit 3 polyline, bit 1 semi-transparency.
/// A polyline ends on a word matching 0x5xxx5xxx in a vertex slot (flat) or
/// a color slot (shaded), or when the packet buffer is full.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub vertices: Vec<Vertex>,
    pub colors: Vec<Color>,
    pub shaded: bool,
    pub polyline: bool,
    pub semi_transparent: bool,
}

impl Line {
    /// Decode a line packet; `None` if fewer than two vertices are present
    pub fn decode(words: &[u32]) -> Option<Self> {
        let mut words = words.iter().copied();
        let command = words.next()?;
        let opcode = (command >> 24) as u8;

        let mut line = Line {
            shaded: opcode & 0x10 != 0,
            polyline: opcode & 0x08 != 0,
            semi_transparent: opcode & 0x02 != 0,
            ..Default::default()
        };
        let max_vertices = if line.polyline { usize::MAX } else { 2 };

        let mut color = Color::from_u32(command);
        while line.vertices.len() < max_vertices {
            if line.shaded && !line.vertices.is_empty() {
                let Some(word) = words.next() else { break };
                if line.ends_polyline(word) {
                    break;
                }
                color = Color::from_u32(word);
            }

            let Some(word) = words.next() else { break };
            if !line.shaded && line.ends_polyline(word) {
                break;
            }
            line.vertices.push(Vertex::from_u32(word));
            line.colors.push(color);
        }

        if line.vertices.len() < 2 {
            return None;
        }
        Some(line)
    }

    fn ends_polyline(&self, word: u32) -> bool {
        self.polyline && self.vertices.len() >= 2 && word & POLYLINE_END_MASK == POLYLINE_END
    }
}

impl<B: RenderBackend> Gpu<B> {
    /// GP0(0x40-0x5F): forward a line or polyline to the backend
    pub(in crate::core::gpu) fn gp0_line(&mut self, words: &[u32]) {
        match Line::decode(words) {
            Some(line) => self.backend.draw_line(&line),
            None => log::warn!("GP0: truncated line packet ({} words)", words.len()),
        }
    }
}
