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

//! GPU plugin configuration
//!
//! Settings the dispatcher consults at runtime: VRAM size, game-specific
//! compatibility fixes and frame pacing options. Configuration is stored as
//! TOML; missing keys fall back to their defaults.
//!
//! ```toml
//! vram_doubled = false
//! fixes = "FAKE_BUSY | SWAP_FRONT_BACK"
//!
//! [pacing]
//! frame_limit = true
//! framerate_limit = 0.0
//! frame_skip = "standard"
//! chip_accurate_rates = true
//! ```

use crate::core::error::ConfigError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::Path;

bitflags! {
    /// Game compatibility fixes
    ///
    /// Each fix changes a hardware detail that some titles depend on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CompatibilityFixes: u32 {
        /// Fake a busy/idle oscillation after drawing primitives
        const FAKE_BUSY = 0x0001;
        /// Toggle the odd-line status bit every third status read
        const ODD_EVEN_TOGGLE = 0x0002;
        /// Swap which display snapshot receives new display positions
        const SWAP_FRONT_BACK = 0x0004;
    }
}

impl Default for CompatibilityFixes {
    fn default() -> Self {
        Self::empty()
    }
}

/// Frame skipping strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSkipMode {
    /// Never skip frames
    #[default]
    None,
    /// Skip according to the number of late periods
    Standard,
    /// Skip one frame out of two (two fields out of four when interlaced)
    Alternate,
}

/// Frame pacing options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Block on vsync until the frame period elapsed
    pub frame_limit: bool,

    /// Custom frequency in Hz; values below 0.01 select the regional rate
    pub framerate_limit: f32,

    /// Frame skipping strategy
    pub frame_skip: FrameSkipMode,

    /// Use the exact chip timings instead of the rounded 50/59.94 Hz rates
    pub chip_accurate_rates: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            frame_limit: true,
            framerate_limit: 0.0,
            frame_skip: FrameSkipMode::None,
            chip_accurate_rates: true,
        }
    }
}

/// Complete GPU configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    /// Allocate 1024 lines of VRAM (Zinc arcade boards) instead of 512
    pub vram_doubled: bool,

    /// Enabled compatibility fixes
    pub fixes: CompatibilityFixes,

    /// Frame pacing options
    pub pacing: PacingConfig,
}

impl GpuConfig {
    /// Parse a configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check whether a compatibility fix is enabled
    #[inline]
    pub fn has_fix(&self, fix: CompatibilityFixes) -> bool {
        self.fixes.contains(fix)
    }
}
