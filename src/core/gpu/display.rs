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

//! Display geometry tracking
//!
//! GP1 commands 0x03 and 0x05-0x08 change what part of VRAM is shown and how.
//! The tracker keeps two snapshots of the display: `current` holds the
//! latest values and `previous` the ones they replaced, so the dispatcher
//! can tell when the display actually moved. Values decoded by GP1 0x08 are
//! staged as pending and committed together.

use super::status::{StatusFlags, StatusRegister};
use super::types::{DrawingArea, Point};
use serde::Serialize;

/// Horizontal resolutions selected by GP1 0x08 bits {6, 1, 0}
pub const DISPLAY_WIDTHS: [i32; 8] = [256, 320, 512, 640, 368, 384, 512, 640];

/// Display position updates that seed both snapshots after a reset
const SEED_UPDATES: u32 = 2;

/// Video standard of the display output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Region {
    #[default]
    Ntsc,
    Pal,
}

/// Display range on the video signal (GP1 0x06 / 0x07)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayRange {
    pub x0: u16,
    pub x1: u16,
    pub y0: u16,
    pub y1: u16,
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            x0: 0x260,
            x1: 0xC60,
            y0: 0x10,
            y1: 0x100,
        }
    }
}

/// One generation of display geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplaySnapshot {
    /// Top-left corner of the displayed VRAM area
    pub position: Point,
    /// Bottom-right corner (exclusive)
    pub end: Point,
    pub rgb24: bool,
    /// Visible lines, before the height multiplier
    pub height: i32,
    pub disabled: bool,
    pub draw_offset: Point,
    pub draw_area: DrawingArea,
    pub range: DisplayRange,
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        let range = DisplayRange::default();
        Self {
            position: Point::default(),
            end: Point::default(),
            rgb24: false,
            height: (range.y1 - range.y0) as i32,
            disabled: true,
            draw_offset: Point::default(),
            draw_area: DrawingArea::default(),
            range,
        }
    }
}

/// Display parameters handed to the backend with each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameInfo {
    pub position: Point,
    pub size: Point,
    pub rgb24: bool,
    pub interlaced: bool,
    pub odd_field: bool,
    pub region: Region,
}

/// Current/previous display geometry and video mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub current: DisplaySnapshot,
    pub previous: DisplaySnapshot,

    /// Committed display size in VRAM pixels
    pub display_size: Point,
    /// Display size decoded but not yet committed
    pub pending_size: Point,
    pub pending_rgb24: bool,

    /// 2 in 480-line modes, 1 otherwise
    pub height_multiplier: i32,
    pub region: Region,

    pub interlaced: bool,
    pub pending_interlaced: bool,
    /// Set for one vsync after interlacing was switched on
    pub interlacing_just_enabled: bool,
    /// Frames to hold back while an interlaced pair stabilizes
    pub dual_interlace_count: u32,

    /// Negative Y offset taken from a display position with bit 9 set
    pub previous_height_offset: i32,

    seed_count: u32,
}

impl DisplayState {
    pub fn new() -> Self {
        let current = DisplaySnapshot::default();
        let size = Point::new(DISPLAY_WIDTHS[0], current.height);
        let mut state = Self {
            current,
            previous: current,
            display_size: size,
            pending_size: size,
            pending_rgb24: false,
            height_multiplier: 1,
            region: Region::Ntsc,
            interlaced: false,
            pending_interlaced: false,
            interlacing_just_enabled: false,
            dual_interlace_count: 0,
            previous_height_offset: 0,
            seed_count: SEED_UPDATES,
        };
        state.update_display_end();
        state
    }

    /// Return to power-on geometry, re-arming the seed updates
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Display enable/disable (GP1 0x03)
    pub fn toggle_display(&mut self, disabled: bool, status: &mut StatusRegister) {
        self.previous.disabled = self.current.disabled;
        self.current.disabled = disabled;
        status.assign(StatusFlags::DISPLAY_DISABLED, disabled);
    }

    /// Start of display area in VRAM (GP1 0x05)
    ///
    /// `x` and `y` are the raw 10-bit fields. Returns false when nothing was
    /// recomputed (progressive output and the position did not move).
    pub fn set_display_position(&mut self, x: u32, y: u32, swap_front_back: bool) -> bool {
        let mut x = (x & 0x3FF) as i32;
        let mut y = (y & 0x3FF) as i32;

        if y & 0x200 != 0 {
            let signed = ((y as u16) | 0xFC00) as i16 as i32;
            self.previous_height_offset = signed / self.height_multiplier;
            y = 0;
        } else {
            self.previous_height_offset = 0;
        }

        if x > 1000 {
            x = 0;
        }

        let position = Point::new(x, y);

        if self.seed_count > 0 {
            self.seed_count -= 1;
            self.current.position = position;
            self.previous.position = position;
            self.update_display_end();
            return true;
        }

        if swap_front_back {
            if self.pending_interlaced {
                log::debug!("Front/back swap applied while interlaced");
            }
            self.current.position = self.previous.position;
            self.previous.position = position;
        } else {
            self.previous.position = self.current.position;
            self.current.position = position;
        }

        let moved = self.current.position != self.previous.position;
        if !self.pending_interlaced && !moved {
            return false;
        }

        self.update_display_end();

        if self.pending_interlaced && moved && self.dual_interlace_count > 0 {
            self.dual_interlace_count -= 1;
        }
        true
    }

    /// Horizontal display range (GP1 0x06)
    pub fn set_width(&mut self, x0: u16, x1: u16) {
        self.previous.range = self.current.range;
        self.current.range.x0 = x0;
        self.current.range.x1 = x1;
    }

    /// Vertical display range (GP1 0x07)
    ///
    /// Returns true when the visible height changed and the display offsets
    /// need to be recomputed.
    pub fn set_height(&mut self, y0: u16, y1: u16) -> bool {
        self.previous.range = self.current.range;
        self.current.range.y0 = y0;
        self.current.range.y1 = y1;

        self.previous.height = self.current.height;
        self.current.height = y1 as i32 - y0 as i32 + self.previous_height_offset;

        if self.previous.height == self.current.height {
            return false;
        }

        self.pending_size.y = self.current.height * self.height_multiplier;
        self.display_size.y = self.pending_size.y;
        self.update_display_end();
        true
    }

    /// Display mode (GP1 0x08)
    ///
    /// Mirrors the decoded mode into the status register. Size, color depth
    /// and interlacing stay pending until the next [`commit`](Self::commit).
    /// Returns true when the region or the interlacing changed, which
    /// affects the frame rate.
    pub fn set_display_info(&mut self, word: u32, status: &mut StatusRegister) -> bool {
        let old_region = self.region;
        let old_interlaced = self.pending_interlaced;

        let width_index = ((word & 0x03) | ((word & 0x40) >> 4)) as usize;
        self.pending_size.x = DISPLAY_WIDTHS[width_index];
        self.height_multiplier = if word & 0x04 != 0 { 2 } else { 1 };
        self.pending_size.y = self.current.height * self.height_multiplier;

        self.region = if word & 0x08 != 0 {
            Region::Pal
        } else {
            Region::Ntsc
        };
        self.pending_rgb24 = word & 0x10 != 0;
        self.pending_interlaced = word & 0x20 != 0;

        status.replace_bits(
            StatusFlags::WIDTH_BITS,
            ((word & 0x03) << 17) | ((word & 0x40) << 10),
        );

        self.interlacing_just_enabled = false;
        if self.pending_interlaced {
            if !old_interlaced {
                self.dual_interlace_count = 2;
                self.previous.position = self.current.position;
                self.interlacing_just_enabled = true;
            }
            status.set(StatusFlags::INTERLACED);
        } else {
            self.dual_interlace_count = 0;
            status.unset(StatusFlags::INTERLACED);
        }

        status.assign(StatusFlags::PAL, self.region == Region::Pal);
        status.assign(StatusFlags::DOUBLE_HEIGHT, self.height_multiplier == 2);
        status.assign(StatusFlags::RGB24, self.pending_rgb24);

        self.region != old_region || self.pending_interlaced != old_interlaced
    }

    /// True when a display mode change waits for the next vsync
    pub fn has_pending_change(&self) -> bool {
        self.pending_size != self.display_size
            || self.pending_rgb24 != self.current.rgb24
            || self.pending_interlaced != self.interlaced
    }

    /// Apply pending size, color depth and interlacing
    pub fn commit(&mut self) {
        self.display_size = self.pending_size;
        self.previous.rgb24 = self.current.rgb24;
        self.current.rgb24 = self.pending_rgb24;
        self.interlaced = self.pending_interlaced;
        self.update_display_end();
    }

    /// Drawing area top-left corner (GP0 0xE3)
    pub fn set_draw_area_start(&mut self, x: u16, y: u16) {
        self.previous.draw_area = self.current.draw_area;
        self.current.draw_area.left = x;
        self.current.draw_area.top = y;
    }

    /// Drawing area bottom-right corner (GP0 0xE4)
    pub fn set_draw_area_end(&mut self, x: u16, y: u16) {
        self.previous.draw_area = self.current.draw_area;
        self.current.draw_area.right = x;
        self.current.draw_area.bottom = y;
    }

    /// Drawing offset (GP0 0xE5)
    pub fn set_draw_offset(&mut self, offset: Point) {
        self.previous.draw_offset = self.current.draw_offset;
        self.current.draw_offset = offset;
    }

    /// Snapshot handed to the backend at vsync
    pub fn frame_info(&self, odd_field: bool) -> FrameInfo {
        FrameInfo {
            position: self.current.position,
            size: self.display_size,
            rgb24: self.current.rgb24,
            interlaced: self.interlaced,
            odd_field,
            region: self.region,
        }
    }

    fn update_display_end(&mut self) {
        let size = self.display_size;
        let offset = self.previous_height_offset;
        for snapshot in [&mut self.current, &mut self.previous] {
            snapshot.end = Point::new(
                snapshot.position.x + size.x,
                snapshot.position.y + size.y + offset,
            );
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}
