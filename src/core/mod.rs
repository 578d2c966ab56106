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

//! Core GPU plugin components
//!
//! This module contains the pieces that sit between the host emulator and a
//! rendering backend:
//! - GPU dispatcher (GP0 data path, GP1 control path, DMA chains)
//! - Save-state freeze/thaw record
//! - Frame pacing (vsync wait and frame skipping)
//! - Configuration and error types

pub mod config;
pub mod error;
pub mod gpu;
pub mod save_state;
pub mod timing;

// Re-export commonly used types
pub use config::GpuConfig;
pub use error::{GpuError, Result};
pub use gpu::Gpu;
pub use save_state::{FreezeMode, GpuFreeze};
pub use timing::FramePacer;
