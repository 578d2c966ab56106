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

//! Custom assertions for GPU testing

use pandora_gs::core::gpu::{Gpu, RenderBackend};

/// Assert a VRAM pixel has the expected value
#[allow(dead_code)]
pub fn assert_pixel<B: RenderBackend>(gpu: &Gpu<B>, x: u16, y: u16, expected: u16) {
    let actual = gpu.vram().read_pixel(x, y);
    assert_eq!(
        actual, expected,
        "Pixel ({}, {}) mismatch: expected 0x{:04X}, got 0x{:04X}",
        x, y, expected, actual
    );
}

/// Assert the bits of the status word selected by `mask`
#[allow(dead_code)]
pub fn assert_status_bits<B: RenderBackend>(gpu: &Gpu<B>, mask: u32, expected: u32) {
    let actual = gpu.status().word() & mask;
    assert_eq!(
        actual, expected,
        "Status bits 0x{:08X} mismatch: expected 0x{:08X}, got 0x{:08X}",
        mask, expected, actual
    );
}
