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

//! GPU DMA linked-list transfers
//!
//! DMA channel 2 in linked-list mode walks a chain of blocks in main RAM.
//! Each block starts with a header word:
//!
//! ```text
//! Bits 24-31: Number of data words following the header
//! Bits 0-23:  Byte address of the next block (0xFFFFFF ends the chain)
//! ```
//!
//! Games occasionally build chains that loop. The walk stops when the
//! endless-chain detector fires or after [`DMA_BLOCK_LIMIT`] blocks.

use super::backend::RenderBackend;
use super::status::StatusFlags;
use super::vram::VRAM_HEIGHT;
use super::Gpu;
use crate::core::error::Result;

/// Next-address value that ends a chain
pub const DMA_TERMINATOR: u32 = 0x00FF_FFFF;

/// Blocks visited before a chain walk is abandoned
pub const DMA_BLOCK_LIMIT: u32 = 2_000_000;

/// Address mask for the 2MB of main RAM
const RAM_ADDRESS_MASK: u32 = 0x001F_FFFC;

impl<B: RenderBackend> Gpu<B> {
    /// Follow a DMA linked list starting at byte address `offset`
    ///
    /// `memory` is main RAM as 32-bit words. Every block's data words are
    /// written to GP0. Cycles, the block limit and out-of-range addresses
    /// end the walk quietly.
    pub fn dma_chain(&mut self, memory: &[u32], offset: u32) -> Result<()> {
        self.ensure_initialized()?;
        self.status.unset(StatusFlags::IDLE);
        self.vram.reset_dma_check();

        let mask_address = self.vram.height() == VRAM_HEIGHT;
        let mut address = offset;
        let mut blocks = 0u32;

        loop {
            if mask_address {
                address &= RAM_ADDRESS_MASK;
            }

            blocks += 1;
            if blocks > DMA_BLOCK_LIMIT {
                log::warn!("DMA chain exceeded {} blocks, aborting", DMA_BLOCK_LIMIT);
                break;
            }

            if self.vram.check_dma_endless_chain(address) {
                log::warn!("DMA chain loops at 0x{:06X}, aborting", address);
                break;
            }

            let index = (address >> 2) as usize;
            let Some(&header) = memory.get(index) else {
                log::warn!("DMA chain address 0x{:06X} outside RAM", address);
                break;
            };

            let count = (header >> 24) as usize;
            if count > 0 {
                match memory.get(index + 1..index + 1 + count) {
                    Some(block) => self.write_data_chunk(block)?,
                    None => {
                        log::warn!("DMA block at 0x{:06X} runs past RAM", address);
                        break;
                    }
                }
            }

            address = header & DMA_TERMINATOR;
            if address == DMA_TERMINATOR {
                break;
            }
        }

        log::trace!("DMA chain done after {} blocks", blocks);
        self.status.set(StatusFlags::IDLE);
        Ok(())
    }
}
