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

//! GPU type definitions
//!
//! Value types shared by the command decoder, the display tracker and the
//! render backend interface: colors, vertices, texture coordinates, VRAM
//! rectangles and the decoded drawing-environment settings.

use serde::Serialize;

/// 8-8-8 command color, stored in VRAM as 5-5-5
///
/// # Examples
///
/// ```
/// use pandora_gs::core::gpu::Color;
///
/// let color = Color::from_u32(0x00FF8040);
/// assert_eq!(color.r, 0x40);
/// assert_eq!(color.g, 0x80);
/// assert_eq!(color.b, 0xFF);
/// assert_eq!(color.to_rgb15(), 0x7E08);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a Color from the low 24 bits of a command word
    pub fn from_u32(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    /// Convert to the 5-5-5 VRAM format (bit 15 clear)
    pub fn to_rgb15(&self) -> u16 {
        let r = ((self.r as u16) >> 3) & 0x1F;
        let g = ((self.g as u16) >> 3) & 0x1F;
        let b = ((self.b as u16) >> 3) & 0x1F;
        (b << 10) | (g << 5) | r
    }
}

/// A 2D vertex position taken from a command word
///
/// Bits 0-15 hold X, bits 16-31 hold Y, both signed. The drawing offset has
/// not been applied yet; the backend adds it when rasterizing.
///
/// ```
/// use pandora_gs::core::gpu::Vertex;
///
/// let v = Vertex::from_u32(0xFFF0_0032);
/// assert_eq!(v.x, 50);
/// assert_eq!(v.y, -16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vertex {
    pub x: i16,
    pub y: i16,
}

impl Vertex {
    /// Create a Vertex from a 32-bit command word
    pub fn from_u32(value: u32) -> Self {
        Self {
            x: (value & 0xFFFF) as i16,
            y: ((value >> 16) & 0xFFFF) as i16,
        }
    }
}

/// Texture coordinate for textured primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TexCoord {
    pub u: u8,
    pub v: u8,
}

impl TexCoord {
    /// Create a TexCoord from the low 16 bits of a command word
    pub fn from_u32(value: u32) -> Self {
        Self {
            u: (value & 0xFF) as u8,
            v: ((value >> 8) & 0xFF) as u8,
        }
    }
}

/// A signed 2D point (display positions, drawing offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle of VRAM pixels
///
/// Used for image transfers, fills and moves. Coordinates are already masked
/// to the VRAM size; the area may still wrap around the right or bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VramRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl VramRect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered by the rectangle
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Drawing mode configuration (GP0 0xE1)
///
/// Bits 0-10 of the command are mirrored into the status register; the rest
/// only matter to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawMode {
    /// Texture page X in 64-pixel steps
    pub texture_page_x_base: u16,
    /// 0 or 256
    pub texture_page_y_base: u16,
    pub semi_transparency: u8,
    /// 0=4bit, 1=8bit, 2=15bit
    pub texture_depth: u8,
    pub dithering: bool,
    pub draw_to_display: bool,
    pub texture_disable: bool,
    pub texture_x_flip: bool,
    pub texture_y_flip: bool,
}

impl DrawMode {
    /// Decode a texture page attribute (E1 command or polygon texpage field)
    pub fn from_u32(value: u32) -> Self {
        Self {
            texture_page_x_base: (value & 0x0F) as u16,
            texture_page_y_base: if value & 0x10 != 0 { 256 } else { 0 },
            semi_transparency: ((value >> 5) & 0x03) as u8,
            texture_depth: ((value >> 7) & 0x03) as u8,
            dithering: value & 0x200 != 0,
            draw_to_display: value & 0x400 != 0,
            texture_disable: value & 0x800 != 0,
            texture_x_flip: value & 0x1000 != 0,
            texture_y_flip: value & 0x2000 != 0,
        }
    }
}

/// Drawing area (clipping rectangle), edges inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawingArea {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

impl Default for DrawingArea {
    fn default() -> Self {
        Self {
            left: 0,
            top: 0,
            right: 1023,
            bottom: 511,
        }
    }
}

/// Texture window settings (GP0 0xE2), in 8-pixel steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureWindow {
    pub mask_x: u8,
    pub mask_y: u8,
    pub offset_x: u8,
    pub offset_y: u8,
}

impl TextureWindow {
    pub fn from_u32(value: u32) -> Self {
        Self {
            mask_x: (value & 0x1F) as u8,
            mask_y: ((value >> 5) & 0x1F) as u8,
            offset_x: ((value >> 10) & 0x1F) as u8,
            offset_y: ((value >> 15) & 0x1F) as u8,
        }
    }
}

/// Sign-extend an 11-bit field (drawing offsets)
#[inline(always)]
pub(crate) fn sign_extend_11(value: u32) -> i32 {
    (((value & 0x7FF) << 21) as i32) >> 21
}
