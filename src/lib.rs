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

//! PandoraGS GPU core library
//!
//! This library provides the hardware-facing half of a PlayStation GPU plugin:
//! the GP0/GP1 command dispatcher, the emulated VRAM image, the status
//! register, display geometry tracking, DMA chain walking, save-state
//! freeze/thaw and the vsync frame pacer. Rasterization is delegated to a
//! [`RenderBackend`](core::gpu::RenderBackend) implementation.
//!
//! # Example
//!
//! ```
//! use pandora_gs::core::config::GpuConfig;
//! use pandora_gs::core::gpu::{Gpu, NullBackend};
//!
//! let mut gpu = Gpu::new(GpuConfig::default(), NullBackend);
//! gpu.init().unwrap();
//!
//! // Display mode: 320 pixels wide, NTSC, 15-bit colour
//! gpu.write_control_command(0x0800_0001);
//! assert_eq!(gpu.read_status() & 0x0007_0000, 0x0002_0000);
//! ```

pub mod core;
pub mod plugin;
