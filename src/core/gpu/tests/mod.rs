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

//! GPU module tests
//!
//! Tests are organized into the following modules:
//! - `vram`: wrap rule, addressing and the DMA cycle detector
//! - `status`: status register bits and the fake-busy sequence
//! - `display`: display geometry and video mode (GP1 0x03, 0x05-0x08)
//! - `gp0_commands`: packet assembly, primitives, fill/move, draw state
//! - `gp1_commands`: reset, DMA direction, info queries
//! - `transfers`: CPU-to-VRAM and VRAM-to-CPU image transfers
//! - `dma`: linked-list DMA walks
//! - `vsync`: vertical blank handling and frame presentation

mod dma;
mod gp0_commands;
mod gp1_commands;

use super::{Gpu, RecordingBackend};
use crate::core::config::{CompatibilityFixes, GpuConfig};
use crate::core::timing::{FramePacer, ManualClock};

/// Initialized GPU with a recording backend and a manual clock
fn test_gpu() -> Gpu<RecordingBackend> {
    test_gpu_with(GpuConfig::default())
}

fn test_gpu_with(config: GpuConfig) -> Gpu<RecordingBackend> {
    let pacer = FramePacer::with_clock(&config.pacing, Box::new(ManualClock::new(1_000_000)));
    let mut gpu = Gpu::with_pacer(config, RecordingBackend::new(), pacer);
    gpu.init().unwrap();
    gpu
}

fn config_with_fixes(fixes: CompatibilityFixes) -> GpuConfig {
    GpuConfig {
        fixes,
        ..Default::default()
    }
}
