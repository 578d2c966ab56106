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

/// GPU plugin error types
use thiserror::Error;

/// Result type for GPU core operations
pub type Result<T> = std::result::Result<T, GpuError>;

/// Main error type for the GPU core
///
/// Only initialization and save-state handling can fail. Unknown GP0/GP1
/// commands and DMA chain loops are absorbed by the dispatcher and never
/// surface here.
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("Failed to allocate {bytes} bytes of video memory")]
    VramAllocation { bytes: usize },

    #[error("Video memory is not initialized")]
    NotInitialized,

    #[error("Incompatible save state version: expected {expected}, got {got}")]
    IncompatibleSaveState { expected: u32, got: u32 },

    #[error("Invalid freeze mode: {0}")]
    InvalidFreezeMode(u32),

    #[error("Freeze buffer too small: {got} bytes (expected {expected})")]
    FreezeBufferSize { expected: usize, got: usize },

    #[error("Invalid save slot: {0} (valid range: 0-8)")]
    InvalidSaveSlot(i32),

    #[error("Save state file error: {0}")]
    SaveState(#[from] SaveStateError),
}

/// Errors raised while persisting snapshot files
#[derive(Error, Debug)]
pub enum SaveStateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Incompatible save state file version: expected {expected}, got {got}")]
    IncompatibleVersion { expected: u32, got: u32 },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
