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

//! Test fixtures for common test scenarios

use pandora_gs::core::config::GpuConfig;
use pandora_gs::core::gpu::{Gpu, RecordingBackend};
use pandora_gs::core::timing::{FramePacer, ManualClock};

/// Create an initialized GPU that records backend calls and never sleeps
#[allow(dead_code)]
pub fn create_test_gpu() -> Gpu<RecordingBackend> {
    create_test_gpu_with(GpuConfig::default())
}

/// Same as [`create_test_gpu`] with a custom configuration
#[allow(dead_code)]
pub fn create_test_gpu_with(config: GpuConfig) -> Gpu<RecordingBackend> {
    let pacer = FramePacer::with_clock(&config.pacing, Box::new(ManualClock::new(1_000_000)));
    let mut gpu = Gpu::with_pacer(config, RecordingBackend::new(), pacer);
    gpu.init().expect("Failed to initialize GPU");
    gpu
}

/// GP0 words uploading a `width`x`height` image of incrementing pixels
#[allow(dead_code)]
pub fn image_upload(x: u16, y: u16, width: u16, height: u16) -> Vec<u32> {
    let mut words = vec![
        0xA000_0000,
        ((y as u32) << 16) | x as u32,
        ((height as u32) << 16) | width as u32,
    ];
    let pixels: Vec<u16> = (0..width as u32 * height as u32)
        .map(|i| (i & 0x7FFF) as u16)
        .collect();
    for pair in pixels.chunks(2) {
        let low = pair[0] as u32;
        let high = pair.get(1).copied().unwrap_or(0) as u32;
        words.push(low | (high << 16));
    }
    words
}

/// Standard display setup: 320x240 NTSC, display enabled at (0, 0)
#[allow(dead_code)]
pub fn enable_display(gpu: &mut Gpu<RecordingBackend>) {
    gpu.write_control_command(0x0800_0001);
    gpu.write_control_command(0x0500_0000);
    gpu.write_control_command(0x0300_0000);
}
