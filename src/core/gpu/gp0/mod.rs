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

//! GP0 command stream
//!
//! GP0 words arrive in chunks of arbitrary size. The [`CommandParser`]
//! collects them into complete packets using a per-opcode length table and
//! keeps partial packets across calls. Completed packets are executed by the
//! handlers in the submodules.
//!
//! # Polylines
//!
//! Opcodes 0x48-0x4F and 0x58-0x5F have no fixed length. Their table entries
//! hold the sentinels 254 (flat) and 255 (shaded); the packet ends early on a
//! word matching `word & 0xF000F000 == 0x50005000`, checked on vertex slots
//! (flat) or color slots (shaded) once two vertices were received.

mod drawing_mode;
mod fill;
mod line;
mod polygon;
mod rectangle;
mod transfer;

pub use drawing_mode::DrawStateCommand;
pub use fill::VramCopy;
pub use line::Line;
pub use polygon::Polygon;
pub use rectangle::Rectangle;

use super::backend::RenderBackend;
use super::Gpu;
use crate::core::config::CompatibilityFixes;
use std::fmt;

/// Words a packet buffer can hold (longest polyline plus command word)
pub const PACKET_CAPACITY: usize = 256;

/// Length sentinel of flat polylines
const POLYLINE_FLAT: u8 = 254;

/// Length sentinel of shaded polylines
const POLYLINE_SHADED: u8 = 255;

const POLYLINE_END_MASK: u32 = 0xF000_F000;
const POLYLINE_END: u32 = 0x5000_5000;

/// Status reads the fake-busy sequence lasts after a drawing primitive
const FAKE_BUSY_STEPS: u32 = 4;

const fn fill_lengths(mut table: [u8; 256], first: usize, last: usize, len: u8) -> [u8; 256] {
    let mut op = first;
    while op <= last {
        table[op] = len;
        op += 1;
    }
    table
}

const fn build_command_lengths() -> [u8; 256] {
    let mut t = [0u8; 256];
    t[0x02] = 3;
    // Polygons
    t = fill_lengths(t, 0x20, 0x23, 4);
    t = fill_lengths(t, 0x24, 0x27, 7);
    t = fill_lengths(t, 0x28, 0x2B, 5);
    t = fill_lengths(t, 0x2C, 0x2F, 9);
    t = fill_lengths(t, 0x30, 0x33, 6);
    t = fill_lengths(t, 0x34, 0x37, 9);
    t = fill_lengths(t, 0x38, 0x3B, 8);
    t = fill_lengths(t, 0x3C, 0x3F, 12);
    // Lines
    t = fill_lengths(t, 0x40, 0x43, 3);
    t = fill_lengths(t, 0x48, 0x4F, POLYLINE_FLAT);
    t = fill_lengths(t, 0x50, 0x53, 4);
    t = fill_lengths(t, 0x58, 0x5F, POLYLINE_SHADED);
    // Rectangles
    t = fill_lengths(t, 0x60, 0x63, 3);
    t = fill_lengths(t, 0x64, 0x67, 4);
    t = fill_lengths(t, 0x68, 0x6B, 2);
    t = fill_lengths(t, 0x6C, 0x6F, 3);
    t = fill_lengths(t, 0x70, 0x73, 2);
    t = fill_lengths(t, 0x74, 0x77, 3);
    t = fill_lengths(t, 0x78, 0x7B, 2);
    t = fill_lengths(t, 0x7C, 0x7F, 3);
    // Transfers
    t[0x80] = 4;
    t[0xA0] = 3;
    t[0xC0] = 3;
    // Drawing environment
    t = fill_lengths(t, 0xE1, 0xE6, 1);
    t
}

/// Words per GP0 opcode; 0 marks opcodes that are discarded
pub static COMMAND_LENGTHS: [u8; 256] = build_command_lengths();

/// A complete GP0 command packet
///
/// Equality only looks at the opcode and the received words.
#[derive(Clone)]
pub struct Packet {
    opcode: u8,
    len: usize,
    words: [u32; PACKET_CAPACITY],
}

impl Packet {
    #[inline(always)]
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Words received, command word included
    #[inline(always)]
    pub fn words(&self) -> &[u32] {
        &self.words[..self.len]
    }
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        self.opcode == other.opcode && self.words() == other.words()
    }
}

impl Eq for Packet {}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("opcode", &format_args!("0x{:02X}", self.opcode))
            .field("words", &self.words())
            .finish()
    }
}

/// Streaming GP0 packet assembler
///
/// # Examples
///
/// ```
/// use pandora_gs::core::gpu::CommandParser;
///
/// let mut parser = CommandParser::new();
///
/// // Flat triangle: command word plus three vertices
/// assert!(parser.push(0x2000_00FF).is_none());
/// assert!(parser.push(0x0000_0000).is_none());
/// assert!(parser.push(0x0000_0010).is_none());
/// let packet = parser.push(0x0010_0000).unwrap();
/// assert_eq!(packet.opcode(), 0x20);
/// assert_eq!(packet.words().len(), 4);
/// ```
#[derive(Clone)]
pub struct CommandParser {
    opcode: u8,
    /// Expected packet length, 0 while idle
    expected: usize,
    /// Write index into `buffer`
    fill: usize,
    /// Words actually stored
    received: usize,
    buffer: [u32; PACKET_CAPACITY],
}

impl CommandParser {
    pub fn new() -> Self {
        Self {
            opcode: 0,
            expected: 0,
            fill: 0,
            received: 0,
            buffer: [0; PACKET_CAPACITY],
        }
    }

    /// Drop any partial packet
    pub fn reset(&mut self) {
        self.opcode = 0;
        self.expected = 0;
        self.fill = 0;
        self.received = 0;
    }

    /// No packet in progress
    #[inline(always)]
    pub fn is_idle(&self) -> bool {
        self.expected == 0
    }

    /// Words held for the packet in progress
    #[inline(always)]
    pub fn pending_words(&self) -> usize {
        self.received
    }

    /// Feed one word; returns the packet it completed, if any
    pub fn push(&mut self, word: u32) -> Option<Packet> {
        if self.expected == 0 {
            let opcode = (word >> 24) as u8;
            let expected = COMMAND_LENGTHS[opcode as usize] as usize;
            if expected == 0 {
                log::trace!("GP0: discarding word 0x{:08X}", word);
                return None;
            }
            self.opcode = opcode;
            self.expected = expected;
            self.buffer[0] = word;
            self.fill = 1;
            self.received = 1;
        } else {
            self.buffer[self.fill] = word;
            self.received = self.fill + 1;
            if self.is_polyline_end(word) {
                self.fill = self.expected - 1;
            }
            self.fill += 1;
        }

        if self.fill < self.expected {
            return None;
        }

        let packet = Packet {
            opcode: self.opcode,
            len: self.received,
            words: self.buffer,
        };
        self.reset();
        Some(packet)
    }

    fn is_polyline_end(&self, word: u32) -> bool {
        let slot_checked = match self.expected as u8 {
            POLYLINE_FLAT => self.fill >= 3,
            POLYLINE_SHADED => self.fill >= 4 && self.fill & 1 == 0,
            _ => false,
        };
        slot_checked && word & POLYLINE_END_MASK == POLYLINE_END
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandParser")
            .field("opcode", &format_args!("0x{:02X}", self.opcode))
            .field("expected", &self.expected)
            .field("received", &self.received)
            .finish()
    }
}

/// Opcodes that rasterize something
#[inline(always)]
fn is_drawing_command(opcode: u8) -> bool {
    opcode == 0x02 || (0x20..=0x7F).contains(&opcode)
}

impl<B: RenderBackend> Gpu<B> {
    /// Execute a completed GP0 packet
    pub(in crate::core::gpu) fn execute_packet(&mut self, packet: &Packet) {
        let opcode = packet.opcode();
        let words = packet.words();

        match opcode {
            0x02 => self.gp0_fill_rectangle(words),
            0x20..=0x3F if !self.skipping => self.gp0_polygon(words),
            0x40..=0x5F if !self.skipping => self.gp0_line(words),
            0x60..=0x7F if !self.skipping => self.gp0_rectangle(words),
            0x20..=0x7F => log::trace!("GP0(0x{:02X}) skipped with frame", opcode),
            0x80 => self.gp0_move_image(words),
            0xA0 => self.gp0_load_image(words),
            0xC0 => self.gp0_store_image(words),
            0xE1 => self.gp0_draw_mode(words[0]),
            0xE2 => self.gp0_texture_window(words[0]),
            0xE3 => self.gp0_draw_area_top_left(words[0]),
            0xE4 => self.gp0_draw_area_bottom_right(words[0]),
            0xE5 => self.gp0_draw_offset(words[0]),
            0xE6 => self.gp0_mask_settings(words[0]),
            _ => log::trace!("GP0(0x{:02X}) has no handler", opcode),
        }

        if is_drawing_command(opcode) && self.config.has_fix(CompatibilityFixes::FAKE_BUSY) {
            self.status.arm_fake_busy(FAKE_BUSY_STEPS);
        }
    }
}
