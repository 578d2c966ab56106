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

//! GP1 control commands
//!
//! Reset, command buffer, interrupt, transfer direction and info queries.

use super::super::backend::RenderBackend;
use super::super::status::StatusFlags;
use super::super::transfer::TransferMode;
use super::super::types::DrawMode;
use super::super::{Gpu, GpuInfo};

/// Value returned for GP1(0x10) index 7
const GPU_VERSION: u32 = 2;

/// Value returned for GP1(0x10) indices 8 and 0xF
const GPU_INFO_LEGACY: u32 = 0xBFC0_3720;

impl<B: RenderBackend> Gpu<B> {
    /// GP1(0x00): Reset GPU
    ///
    /// Restores the power-on status word and display state and drops any
    /// pending packet or transfer. VRAM contents are preserved.
    pub(in crate::core::gpu) fn gp1_reset_gpu(&mut self) {
        self.info = GpuInfo::default();
        self.status.reset();
        self.display.reset();
        self.parser.reset();
        self.writer.reset();
        self.reader.reset();
        self.draw_mode = DrawMode::default();
        self.update_frequency();

        log::debug!("GPU reset");
    }

    /// GP1(0x01): Reset Command Buffer
    pub(in crate::core::gpu) fn gp1_reset_command_buffer(&mut self) {
        self.parser.reset();
        self.writer.reset();
        self.reader.reset();
        self.status.unset(StatusFlags::READY_FOR_VRAM);

        log::debug!("Command buffer reset");
    }

    /// GP1(0x02): Acknowledge GPU Interrupt
    pub(in crate::core::gpu) fn gp1_acknowledge_interrupt(&mut self) {
        self.status.unset(StatusFlags::IRQ);
        log::debug!("GPU interrupt acknowledged");
    }

    /// GP1(0x04): DMA Direction
    ///
    /// Selects what the data port carries. Direction 2 turns data writes
    /// into VRAM writes and direction 3 data reads into VRAM reads; the
    /// transfer counters are left untouched so an interrupted transfer can
    /// resume.
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-1: Direction (0=Off, 1=FIFO, 2=CPUtoGP0, 3=GPUREADtoCPU)
    pub(in crate::core::gpu) fn gp1_dma_direction(&mut self, value: u32) {
        let direction = value & 3;

        self.writer.mode = TransferMode::Normal;
        self.reader.mode = TransferMode::Normal;
        match direction {
            2 => self.writer.mode = TransferMode::Vram,
            3 => self.reader.mode = TransferMode::Vram,
            _ => {}
        }
        self.status.replace_bits(StatusFlags::DMA_BITS, direction << 29);

        log::debug!("DMA direction {}", direction);
    }

    /// GP1(0x10-0x1F): GPU Info
    ///
    /// Latches the requested value; the host reads it back through the data
    /// port.
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-3: Info type
    ///   - 0x02: Texture window settings
    ///   - 0x03: Draw area top left
    ///   - 0x04: Draw area bottom right
    ///   - 0x05, 0x06: Draw offset
    ///   - 0x07: GPU version
    ///   - 0x08, 0x0F: Legacy constant
    pub(in crate::core::gpu) fn gp1_get_gpu_info(&mut self, value: u32) {
        let info_type = value & 0x0F;
        let response = match info_type {
            0x02 => self.info.texture_window,
            0x03 => self.info.draw_area_start,
            0x04 => self.info.draw_area_end,
            0x05 | 0x06 => self.info.draw_offset,
            0x07 => GPU_VERSION,
            0x08 | 0x0F => GPU_INFO_LEGACY,
            _ => {
                log::trace!("GPU info request {} ignored", info_type);
                return;
            }
        };
        self.last_data_word = response;

        log::debug!("GPU info request {}: 0x{:08X}", info_type, response);
    }
}
