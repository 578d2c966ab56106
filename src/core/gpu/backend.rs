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

//! Render backend interface
//!
//! The dispatcher decodes GP0 packets and hands the results to a
//! [`RenderBackend`]. Rasterization, texture caches and presentation live on
//! the other side of this trait. VRAM is only ever lent to the backend as a
//! read-only slice.

use super::display::{DisplayState, FrameInfo};
use super::gp0::{DrawStateCommand, Line, Polygon, Rectangle, VramCopy};
use super::types::VramRect;

/// Receiver of decoded drawing work
///
/// Every method has an empty default so backends only implement what they
/// render.
pub trait RenderBackend {
    /// GP0 0x20-0x3F
    fn draw_polygon(&mut self, _polygon: &Polygon) {}

    /// GP0 0x40-0x5F
    fn draw_line(&mut self, _line: &Line) {}

    /// GP0 0x60-0x7F
    fn draw_rectangle(&mut self, _rectangle: &Rectangle) {}

    /// GP0 0x02, after the VRAM image was filled
    fn fill_rectangle(&mut self, _area: VramRect, _color: u16) {}

    /// GP0 0x80, after the VRAM image was updated
    fn copy_rectangle(&mut self, _copy: &VramCopy) {}

    /// GP0 0xE1-0xE6
    fn set_draw_state(&mut self, _state: &DrawStateCommand) {}

    /// A CPU-to-VRAM transfer completed
    fn upload_vram(&mut self, _area: VramRect, _vram: &[u16]) {}

    /// Display position, range or size changed
    fn update_display_offsets(&mut self, _display: &DisplayState) {}

    /// Present a frame at vsync
    fn draw_frame(&mut self, _frame: &FrameInfo, _vram: &[u16]) {}
}

/// Backend that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl RenderBackend for NullBackend {}

/// One call received by a [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Polygon(Polygon),
    Line(Line),
    Rectangle(Rectangle),
    Fill { area: VramRect, color: u16 },
    Copy(VramCopy),
    DrawState(DrawStateCommand),
    Upload(VramRect),
    DisplayOffsets,
    Frame(FrameInfo),
}

/// Backend that records every call, for tests and trace replays
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    pub events: Vec<BackendEvent>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented so far
    pub fn frame_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BackendEvent::Frame(_)))
            .count()
    }

    /// Number of drawing primitives received so far
    pub fn primitive_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BackendEvent::Polygon(_) | BackendEvent::Line(_) | BackendEvent::Rectangle(_)
                )
            })
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn draw_polygon(&mut self, polygon: &Polygon) {
        self.events.push(BackendEvent::Polygon(*polygon));
    }

    fn draw_line(&mut self, line: &Line) {
        self.events.push(BackendEvent::Line(line.clone()));
    }

    fn draw_rectangle(&mut self, rectangle: &Rectangle) {
        self.events.push(BackendEvent::Rectangle(*rectangle));
    }

    fn fill_rectangle(&mut self, area: VramRect, color: u16) {
        self.events.push(BackendEvent::Fill { area, color });
    }

    fn copy_rectangle(&mut self, copy: &VramCopy) {
        self.events.push(BackendEvent::Copy(*copy));
    }

    fn set_draw_state(&mut self, state: &DrawStateCommand) {
        self.events.push(BackendEvent::DrawState(*state));
    }

    fn upload_vram(&mut self, area: VramRect, _vram: &[u16]) {
        self.events.push(BackendEvent::Upload(area));
    }

    fn update_display_offsets(&mut self, _display: &DisplayState) {
        self.events.push(BackendEvent::DisplayOffsets);
    }

    fn draw_frame(&mut self, frame: &FrameInfo, _vram: &[u16]) {
        self.events.push(BackendEvent::Frame(*frame));
    }
}
