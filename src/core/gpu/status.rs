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

//! GPU status register (GPUSTAT)
//!
//! The status word is read by games through the GPU status port and saved
//! verbatim in save states, so its layout is bit-exact:
//!
//! ```text
//! 31    odd lines (interlace field)
//! 29-30 DMA direction
//! 28    ready to receive commands
//! 27    ready to send VRAM to CPU
//! 26    idle
//! 24    interrupt request
//! 23    display disabled
//! 22    vertical interlace
//! 21    24-bit display color depth
//! 20    PAL video mode
//! 19    double height (480 lines)
//! 16-18 horizontal resolution
//! 12    check mask before drawing
//! 11    set mask bit while drawing
//! 10    drawing to display area allowed
//! 9     dither enabled
//! 0-8   texture page
//! ```

use bitflags::bitflags;

/// Status value after power-on and GP1 reset
pub const GPUSTATUS_INIT: u32 = 0x1480_2000;

bitflags! {
    /// Bit masks of the GPU status word
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u32 {
        const ODD_LINES = 0x8000_0000;
        const DMA_BITS = 0x6000_0000;
        const READY_FOR_COMMANDS = 0x1000_0000;
        const READY_FOR_VRAM = 0x0800_0000;
        const IDLE = 0x0400_0000;
        const IRQ = 0x0100_0000;
        const DISPLAY_DISABLED = 0x0080_0000;
        const INTERLACED = 0x0040_0000;
        const RGB24 = 0x0020_0000;
        const PAL = 0x0010_0000;
        const DOUBLE_HEIGHT = 0x0008_0000;
        const WIDTH_BITS = 0x0007_0000;
        const MASK_ENABLED = 0x0000_1000;
        const MASK_DRAWN = 0x0000_0800;
        const DRAWING_ALLOWED = 0x0000_0400;
        const DITHER = 0x0000_0200;
        const TEXTURE_PAGE = 0x0000_01FF;
    }
}

/// GPU status register with the fake-busy countdown
///
/// # Examples
///
/// ```
/// use pandora_gs::core::gpu::{StatusFlags, StatusRegister};
///
/// let mut status = StatusRegister::new();
/// status.set(StatusFlags::PAL);
/// assert!(status.get(StatusFlags::PAL));
/// assert_eq!(status.bits(StatusFlags::PAL | StatusFlags::RGB24), 0x0010_0000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRegister {
    word: u32,
    fake_busy_count: u32,
}

impl StatusRegister {
    pub fn new() -> Self {
        Self {
            word: GPUSTATUS_INIT,
            fake_busy_count: 0,
        }
    }

    /// Restore the power-on value and disarm the fake-busy sequence
    pub fn reset(&mut self) {
        self.word = GPUSTATUS_INIT;
        self.fake_busy_count = 0;
    }

    /// Raw 32-bit status word
    #[inline(always)]
    pub fn word(&self) -> u32 {
        self.word
    }

    /// Overwrite the whole status word (save-state restore)
    #[inline(always)]
    pub fn set_word(&mut self, word: u32) {
        self.word = word;
    }

    #[inline(always)]
    pub fn set(&mut self, mask: StatusFlags) {
        self.word |= mask.bits();
    }

    #[inline(always)]
    pub fn unset(&mut self, mask: StatusFlags) {
        self.word &= !mask.bits();
    }

    #[inline(always)]
    pub fn toggle(&mut self, mask: StatusFlags) {
        self.word ^= mask.bits();
    }

    /// Set or clear `mask` depending on `enabled`
    #[inline(always)]
    pub fn assign(&mut self, mask: StatusFlags, enabled: bool) {
        if enabled {
            self.set(mask);
        } else {
            self.unset(mask);
        }
    }

    /// Check whether any bit of `mask` is set
    #[inline(always)]
    pub fn get(&self, mask: StatusFlags) -> bool {
        self.word & mask.bits() != 0
    }

    /// Masked value of the status word
    #[inline(always)]
    pub fn bits(&self, mask: StatusFlags) -> u32 {
        self.word & mask.bits()
    }

    /// Replace the bits selected by `mask` with the same bits of `value`
    pub fn replace_bits(&mut self, mask: StatusFlags, value: u32) {
        self.word = (self.word & !mask.bits()) | (value & mask.bits());
    }

    /// Arm the fake-busy sequence for `steps` status reads
    pub fn arm_fake_busy(&mut self, steps: u32) {
        self.fake_busy_count = steps;
    }

    /// Remaining fake-busy steps
    pub fn fake_busy_count(&self) -> u32 {
        self.fake_busy_count
    }

    /// Advance the fake-busy sequence by one step
    ///
    /// Odd counter values report the GPU as busy, even values as idle and
    /// ready. Does nothing once the counter reached zero.
    pub fn fake_busy_step(&mut self) {
        if self.fake_busy_count == 0 {
            return;
        }

        self.fake_busy_count -= 1;
        let busy_bits = StatusFlags::IDLE | StatusFlags::READY_FOR_COMMANDS;
        if self.fake_busy_count & 1 != 0 {
            self.unset(busy_bits);
        } else {
            self.set(busy_bits);
        }
    }
}

impl Default for StatusRegister {
    fn default() -> Self {
        Self::new()
    }
}
