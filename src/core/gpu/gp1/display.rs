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

//! GP1 display configuration commands
//!
//! Geometry bookkeeping lives in [`DisplayState`](super::super::DisplayState);
//! these handlers decode the command words, route them there and tell the
//! backend when the visible area moved.

use super::super::backend::RenderBackend;
use super::super::Gpu;
use crate::core::config::CompatibilityFixes;

impl<B: RenderBackend> Gpu<B> {
    /// GP1(0x03): Display Enable
    ///
    /// # Arguments
    ///
    /// * `value` - Bit 0: 0=Enable, 1=Disable (inverted logic)
    pub(in crate::core::gpu) fn gp1_display_enable(&mut self, value: u32) {
        let disabled = value & 1 != 0;
        self.display.toggle_display(disabled, &mut self.status);

        log::debug!("Display {}", if disabled { "disabled" } else { "enabled" });
    }

    /// GP1(0x05): Start of Display Area
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-9: X coordinate, Bits 10-19: Y coordinate
    pub(in crate::core::gpu) fn gp1_display_area_start(&mut self, value: u32) {
        let swap = self.config.has_fix(CompatibilityFixes::SWAP_FRONT_BACK);
        if self
            .display
            .set_display_position(value & 0x3FF, (value >> 10) & 0x3FF, swap)
        {
            log::debug!(
                "Display area start: ({}, {})",
                self.display.current.position.x,
                self.display.current.position.y
            );
            self.backend.update_display_offsets(&self.display);
        }
    }

    /// GP1(0x06): Horizontal Display Range
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-11: X1 start, Bits 12-23: X2 end
    pub(in crate::core::gpu) fn gp1_horizontal_display_range(&mut self, value: u32) {
        let x1 = (value & 0xFFF) as u16;
        let x2 = ((value >> 12) & 0xFFF) as u16;
        self.display.set_width(x1, x2);

        log::debug!("Horizontal display range: {} to {}", x1, x2);
        self.backend.update_display_offsets(&self.display);
    }

    /// GP1(0x07): Vertical Display Range
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-9: Y1 start, Bits 10-19: Y2 end
    pub(in crate::core::gpu) fn gp1_vertical_display_range(&mut self, value: u32) {
        let y1 = (value & 0x3FF) as u16;
        let y2 = ((value >> 10) & 0x3FF) as u16;

        if self.display.set_height(y1, y2) {
            log::debug!(
                "Vertical display range: {} to {} (height: {})",
                y1,
                y2,
                self.display.current.height
            );
            self.backend.update_display_offsets(&self.display);
        }
    }

    /// GP1(0x08): Display Mode
    ///
    /// # Arguments
    ///
    /// * `value` - Display mode bits:
    ///   - Bits 0-1: Horizontal resolution 1
    ///   - Bit 2: Vertical resolution (0=240, 1=480)
    ///   - Bit 3: Video mode (0=NTSC, 1=PAL)
    ///   - Bit 4: Color depth (0=15bit, 1=24bit)
    ///   - Bit 5: Interlace (0=Off, 1=On)
    ///   - Bit 6: Horizontal resolution 2
    pub(in crate::core::gpu) fn gp1_display_mode(&mut self, value: u32) {
        let timing_changed = self.display.set_display_info(value, &mut self.status);
        if timing_changed {
            self.update_frequency();
        }

        // Size, depth and interlacing are applied at the next vsync
        log::debug!(
            "Display mode requested: {}x{} {:?} interlaced={} rgb24={}",
            self.display.pending_size.x,
            self.display.pending_size.y,
            self.display.region,
            self.display.pending_interlaced,
            self.display.pending_rgb24
        );
    }
}
