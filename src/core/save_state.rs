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

//! GPU save states
//!
//! # Freeze Record
//!
//! The host emulator embeds the GPU state in its own save files, so the
//! record layout is fixed (all fields little-endian):
//!
//! ```text
//! offset 0     u32        record version (1)
//! offset 4     u32        status register
//! offset 8     u32 × 256  GP1 command slots
//! offset 1032  u16 × N    VRAM image (1024×512, or 1024×1024 doubled)
//! ```
//!
//! Loading a record does not just copy it back: selected GP1 slots are
//! replayed so that display geometry and transfer modes are rebuilt, then
//! the saved status word is applied verbatim.
//!
//! # Snapshot Files
//!
//! [`SaveStateFile`] wraps a freeze record with metadata for standalone use
//! and is stored with bincode.

use crate::core::error::{GpuError, Result, SaveStateError};
use crate::core::gpu::{Gpu, RenderBackend, CONTROL_REGISTERS};
use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Freeze record version
pub const FREEZE_VERSION: u32 = 1;

/// Snapshot file version
pub const SAVE_STATE_VERSION: u32 = 1;

/// Highest save slot the host can select
pub const MAX_SAVE_SLOT: i32 = 8;

/// Bytes before the VRAM image
pub const FREEZE_HEADER_SIZE: usize = 8 + CONTROL_REGISTERS * 4;

/// GP1 slots replayed after a load, in order
const REPLAY_ORDER: [usize; 9] = [0, 1, 2, 3, 8, 6, 7, 5, 4];

/// Freeze operation requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeMode {
    /// Restore state from the buffer
    Load = 0,
    /// Store state into the buffer
    Save = 1,
    /// Buffer holds the selected save slot
    Info = 2,
}

impl TryFrom<u32> for FreezeMode {
    type Error = GpuError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(FreezeMode::Load),
            1 => Ok(FreezeMode::Save),
            2 => Ok(FreezeMode::Info),
            _ => Err(GpuError::InvalidFreezeMode(value)),
        }
    }
}

/// GPU state as exchanged with the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuFreeze {
    pub version: u32,
    pub status: u32,
    pub control: [u32; CONTROL_REGISTERS],
    pub vram: Vec<u16>,
}

impl GpuFreeze {
    /// Record size in bytes for a VRAM image of `vram_pixels` pixels
    pub fn record_size(vram_pixels: usize) -> usize {
        FREEZE_HEADER_SIZE + vram_pixels * 2
    }

    /// Serialize into `out`, which must hold at least one record
    pub fn write_to(&self, out: &mut [u8]) -> Result<usize> {
        let size = Self::record_size(self.vram.len());
        let got = out.len();
        let record = out.get_mut(..size).ok_or(GpuError::FreezeBufferSize {
            expected: size,
            got,
        })?;
        self.encode(record);
        Ok(size)
    }

    /// Serialize into a new buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; Self::record_size(self.vram.len())];
        self.encode(&mut bytes);
        bytes
    }

    /// Fill `record`, which is exactly one record long
    fn encode(&self, record: &mut [u8]) {
        let (header, pixels) = record.split_at_mut(FREEZE_HEADER_SIZE);
        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..8].copy_from_slice(&self.status.to_le_bytes());
        for (chunk, word) in header[8..].chunks_exact_mut(4).zip(self.control.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        for (chunk, pixel) in pixels.chunks_exact_mut(2).zip(self.vram.iter()) {
            chunk.copy_from_slice(&pixel.to_le_bytes());
        }
    }

    /// Parse a record holding `vram_pixels` pixels of VRAM
    ///
    /// The version is checked before the size so a foreign record is
    /// reported as incompatible rather than truncated.
    pub fn from_bytes(bytes: &[u8], vram_pixels: usize) -> Result<Self> {
        let size = Self::record_size(vram_pixels);
        let header = bytes.get(0..8).ok_or(GpuError::FreezeBufferSize {
            expected: size,
            got: bytes.len(),
        })?;

        let version = read_u32(&header[0..4]);
        if version != FREEZE_VERSION {
            return Err(GpuError::IncompatibleSaveState {
                expected: FREEZE_VERSION,
                got: version,
            });
        }
        if bytes.len() < size {
            return Err(GpuError::FreezeBufferSize {
                expected: size,
                got: bytes.len(),
            });
        }

        let mut control = [0u32; CONTROL_REGISTERS];
        for (slot, chunk) in control
            .iter_mut()
            .zip(bytes[8..FREEZE_HEADER_SIZE].chunks_exact(4))
        {
            *slot = read_u32(chunk);
        }

        let vram = bytes[FREEZE_HEADER_SIZE..size]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        Ok(Self {
            version,
            status: read_u32(&header[4..8]),
            control,
            vram,
        })
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(word)
}

impl<B: RenderBackend> Gpu<B> {
    /// Size in bytes of this GPU's freeze record
    pub fn freeze_size(&self) -> usize {
        GpuFreeze::record_size(self.vram.size())
    }

    /// Capture the current state
    pub fn snapshot(&self) -> Result<GpuFreeze> {
        if !self.is_initialized() {
            return Err(GpuError::NotInitialized);
        }
        Ok(GpuFreeze {
            version: FREEZE_VERSION,
            status: self.status.word(),
            control: self.control,
            vram: self.vram.pixels().to_vec(),
        })
    }

    /// Restore a captured state
    ///
    /// Nothing is modified when the record is rejected.
    pub fn restore(&mut self, record: &GpuFreeze) -> Result<()> {
        if !self.is_initialized() {
            return Err(GpuError::NotInitialized);
        }
        if record.version != FREEZE_VERSION {
            return Err(GpuError::IncompatibleSaveState {
                expected: FREEZE_VERSION,
                got: record.version,
            });
        }
        if record.vram.len() != self.vram.size() {
            return Err(GpuError::FreezeBufferSize {
                expected: GpuFreeze::record_size(self.vram.size()),
                got: GpuFreeze::record_size(record.vram.len()),
            });
        }

        self.status.set_word(record.status);
        self.control = record.control;
        self.vram.pixels_mut().copy_from_slice(&record.vram);

        for slot in REPLAY_ORDER {
            let word = record.control[slot];
            // Slots never written hold 0, which would replay as a reset
            if slot != 0 && (word >> 24) as usize != slot {
                continue;
            }
            self.write_control_command(word);
        }

        self.apply_display_mode();
        self.status.set_word(record.status);
        self.control = record.control;

        log::info!("GPU state restored (status 0x{:08X})", record.status);
        Ok(())
    }

    /// Host freeze entry point
    ///
    /// * `Save` writes a record into `buffer`
    /// * `Load` restores from a record in `buffer`
    /// * `Info` reads the selected save slot (little-endian i32) from `buffer`
    pub fn freeze(&mut self, mode: FreezeMode, buffer: &mut [u8]) -> Result<()> {
        match mode {
            FreezeMode::Save => {
                let record = self.snapshot()?;
                record.write_to(buffer)?;
                log::info!("GPU state saved");
                Ok(())
            }
            FreezeMode::Load => {
                if !self.is_initialized() {
                    return Err(GpuError::NotInitialized);
                }
                let record = GpuFreeze::from_bytes(buffer, self.vram.size())?;
                self.restore(&record)
            }
            FreezeMode::Info => {
                let bytes = buffer.get(0..4).ok_or(GpuError::FreezeBufferSize {
                    expected: 4,
                    got: buffer.len(),
                })?;
                let slot = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                if !(0..=MAX_SAVE_SLOT).contains(&slot) {
                    return Err(GpuError::InvalidSaveSlot(slot));
                }
                self.save_slot = slot;
                log::debug!("Save slot {} selected", slot);
                Ok(())
            }
        }
    }
}

/// Snapshot file metadata
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct SaveStateMetadata {
    /// Timestamp when the snapshot was created
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Save slot selected when the snapshot was taken
    pub slot: i32,

    /// VRAM had 1024 lines
    pub vram_doubled: bool,
}

/// Standalone GPU snapshot file
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct SaveStateFile {
    /// Version number for compatibility checking
    pub version: u32,

    pub metadata: SaveStateMetadata,

    /// Freeze record bytes
    pub record: Vec<u8>,
}

impl SaveStateFile {
    /// Capture a GPU into a snapshot
    pub fn capture<B: RenderBackend>(gpu: &Gpu<B>) -> Result<Self> {
        let record = gpu.snapshot()?;
        Ok(Self {
            version: SAVE_STATE_VERSION,
            metadata: SaveStateMetadata {
                timestamp: Utc::now(),
                slot: gpu.save_slot(),
                vram_doubled: gpu.vram().height() > crate::core::gpu::VRAM_HEIGHT,
            },
            record: record.to_bytes(),
        })
    }

    /// Restore the snapshot into a GPU
    pub fn apply<B: RenderBackend>(&self, gpu: &mut Gpu<B>) -> Result<()> {
        let record = GpuFreeze::from_bytes(&self.record, gpu.vram().size())?;
        gpu.restore(&record)
    }

    /// Save snapshot to file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written, or if
    /// encoding fails.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), SaveStateError> {
        let config = config::standard();
        let encoded = bincode::encode_to_vec(self, config)?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    /// Load snapshot from file and verify its version
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, SaveStateError> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let config = config::standard();
        let (state, _): (SaveStateFile, usize) = bincode::decode_from_slice(&buffer, config)?;

        if state.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::IncompatibleVersion {
                expected: SAVE_STATE_VERSION,
                got: state.version,
            });
        }

        Ok(state)
    }
}
