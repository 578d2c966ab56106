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

//! VRAM transfer cursors
//!
//! CPU-to-VRAM (GP0 0xA0) and VRAM-to-CPU (GP0 0xC0) transfers stream one
//! rectangle through the data port. Each direction keeps its own
//! [`LoadState`]; the dispatcher steps it pixel by pixel.

use super::types::VramRect;
use super::vram::{VideoMemory, VRAM_WIDTH};

/// What the data port currently carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// GP0 command words
    #[default]
    Normal,
    /// Raw pixel data for an image transfer
    Vram,
}

/// Progress of one image transfer
///
/// `rows_remaining` counts pixels left on the current line (starting at the
/// width) and `cols_remaining` counts lines left (starting at the height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadState {
    pub mode: TransferMode,
    pub area: VramRect,
    pub rows_remaining: u32,
    pub cols_remaining: u32,
    /// Cursor into the VRAM buffer
    pub position: isize,
}

impl LoadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a transfer of `area`
    pub fn start(&mut self, area: VramRect, vram: &VideoMemory) {
        self.mode = TransferMode::Vram;
        self.area = area;
        self.rows_remaining = area.width as u32;
        self.cols_remaining = area.height as u32;
        self.position = vram.position(area.x, area.y) as isize;
    }

    /// Drop any transfer in progress
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.mode == TransferMode::Vram
    }

    /// Both counters exhausted
    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.cols_remaining == 0
    }

    /// Account for one pixel moved; returns true when the line ended
    ///
    /// At the end of a line the cursor skips the rest of the 1024-pixel
    /// stride and the line counter drops by one.
    pub(crate) fn advance(&mut self, vram: &VideoMemory) -> bool {
        self.position = vram.wrap(self.position + 1) as isize;
        self.rows_remaining = self.rows_remaining.saturating_sub(1);
        if self.rows_remaining > 0 {
            return false;
        }

        self.cols_remaining = self.cols_remaining.saturating_sub(1);
        self.rows_remaining = self.area.width as u32;
        self.position += (VRAM_WIDTH - self.area.width as usize) as isize;
        self.position = vram.wrap(self.position) as isize;
        true
    }
}
