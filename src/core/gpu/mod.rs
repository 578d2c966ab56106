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

//! GPU command dispatcher
//!
//! This module implements the hardware-facing side of a PlayStation GPU
//! plugin. The [`Gpu`] dispatcher receives raw words from the emulated CPU
//! and DMA controller and routes them:
//! - GP0 data words either into an active CPU-to-VRAM transfer or into the
//!   command parser, whose packets are decoded and sent to a
//!   [`RenderBackend`]
//! - GP1 control words to the display tracker and the status register
//! - Data reads out of an active VRAM-to-CPU transfer
//! - Vsync notifications through the frame pacer to the backend
//!
//! # VRAM Layout
//!
//! VRAM is a 1024×512 image of 16-bit pixels (1024×1024 with doubled
//! memory). Pixels use the 5-5-5 RGB format with the mask flag in bit 15.
//! The dispatcher keeps this image authoritative: image transfers, fills and
//! moves update it directly, and the backend receives read-only views.
//!
//! # References
//!
//! - [PSX-SPX: GPU](http://problemkaputt.de/psx-spx.htm#gpu)
//! - [PSX-SPX: GPU Display Control](http://problemkaputt.de/psx-spx.htm#gpudisplaycontrolcommandsgp1)

mod backend;
mod display;
mod dma;
mod gp0;
mod gp1;
mod status;
#[cfg(test)]
mod tests;
mod transfer;
mod types;
mod vram;

pub use backend::{BackendEvent, NullBackend, RecordingBackend, RenderBackend};
pub use display::{
    DisplayRange, DisplaySnapshot, DisplayState, FrameInfo, Region, DISPLAY_WIDTHS,
};
pub use dma::{DMA_BLOCK_LIMIT, DMA_TERMINATOR};
pub use gp0::{
    CommandParser, DrawStateCommand, Line, Packet, Polygon, Rectangle, VramCopy,
    COMMAND_LENGTHS, PACKET_CAPACITY,
};
pub use status::{StatusFlags, StatusRegister, GPUSTATUS_INIT};
pub use transfer::{LoadState, TransferMode};
pub use types::*;
pub use vram::{
    VideoMemory, SECURITY_MARGIN, VRAM_HEIGHT, VRAM_HEIGHT_DOUBLED, VRAM_WIDTH,
};

use crate::core::config::{CompatibilityFixes, GpuConfig};
use crate::core::error::{GpuError, Result};
use crate::core::timing::{FrameAction, FramePacer};

/// Number of GP1 command slots
pub const CONTROL_REGISTERS: usize = 256;

/// Values latched by GP0 0xE2-0xE5 for the GP1(0x10) info queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct GpuInfo {
    pub texture_window: u32,
    pub draw_area_start: u32,
    pub draw_area_end: u32,
    pub draw_offset: u32,
}

/// GPU dispatcher
///
/// One instance owns all GPU state: VRAM, status register, display tracker,
/// command parser, transfer cursors and the GP1 shadow registers.
///
/// # Examples
///
/// ```
/// use pandora_gs::core::config::GpuConfig;
/// use pandora_gs::core::gpu::{Gpu, NullBackend};
///
/// let mut gpu = Gpu::new(GpuConfig::default(), NullBackend);
/// gpu.init().unwrap();
///
/// // Upload a single white pixel pair to (100, 100)
/// gpu.write_data_chunk(&[0xA000_0000, 0x0064_0064, 0x0001_0002, 0x7FFF_7FFF])
///     .unwrap();
/// assert_eq!(gpu.vram().read_pixel(100, 100), 0x7FFF);
/// assert_eq!(gpu.vram().read_pixel(101, 100), 0x7FFF);
/// ```
pub struct Gpu<B: RenderBackend> {
    config: GpuConfig,

    pub(in crate::core) vram: VideoMemory,
    pub(in crate::core) status: StatusRegister,
    pub(in crate::core) display: DisplayState,

    parser: CommandParser,

    /// CPU-to-VRAM transfer
    writer: LoadState,

    /// VRAM-to-CPU transfer
    reader: LoadState,

    /// Last word written to each GP1 command slot
    pub(in crate::core) control: [u32; CONTROL_REGISTERS],

    info: GpuInfo,
    draw_mode: DrawMode,

    /// Value returned by the data port when no transfer is active
    last_data_word: u32,

    pacer: FramePacer,

    /// Rendering of the current frame is being skipped
    skipping: bool,

    /// Status reads since the last odd/even toggle
    status_reads: u32,

    /// Save slot shown by the host's UI
    pub(in crate::core) save_slot: i32,

    backend: B,
}

impl<B: RenderBackend> Gpu<B> {
    /// Create a dispatcher paced by the wall clock
    ///
    /// VRAM is not allocated until [`init`](Self::init).
    pub fn new(config: GpuConfig, backend: B) -> Self {
        let pacer = FramePacer::new(&config.pacing);
        Self::with_pacer(config, backend, pacer)
    }

    /// Create a dispatcher with a custom pacer
    pub fn with_pacer(config: GpuConfig, backend: B, pacer: FramePacer) -> Self {
        Self {
            config,
            vram: VideoMemory::new(),
            status: StatusRegister::new(),
            display: DisplayState::new(),
            parser: CommandParser::new(),
            writer: LoadState::new(),
            reader: LoadState::new(),
            control: [0; CONTROL_REGISTERS],
            info: GpuInfo::default(),
            draw_mode: DrawMode::default(),
            last_data_word: 0,
            pacer,
            skipping: false,
            status_reads: 0,
            save_slot: 0,
            backend,
        }
    }

    /// Allocate VRAM and reset all state
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::VramAllocation`] if VRAM cannot be allocated.
    pub fn init(&mut self) -> Result<()> {
        self.vram.init(self.config.vram_doubled)?;
        self.reset();
        log::info!(
            "GPU initialized ({} VRAM lines)",
            self.vram.height()
        );
        Ok(())
    }

    /// Release VRAM; other state is kept until the next `init`
    pub fn close(&mut self) {
        self.vram.close();
        log::info!("GPU closed");
    }

    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.vram.is_initialized()
    }

    /// Reset GPU state, clearing the GP1 shadow registers
    pub fn reset(&mut self) {
        self.gp1_reset_gpu();
        self.control = [0; CONTROL_REGISTERS];
        self.last_data_word = 0;
        self.skipping = false;
        self.status_reads = 0;
        self.vram.reset_dma_check();
        self.pacer.reset();
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(GpuError::NotInitialized)
        }
    }

    /// Write a chunk of GP0 words
    ///
    /// Words feed the active CPU-to-VRAM transfer first (two pixels per
    /// word); whatever is left after the transfer completes goes to the
    /// command parser. A packet in the same chunk may start another transfer.
    pub fn write_data_chunk(&mut self, words: &[u32]) -> Result<()> {
        self.ensure_initialized()?;
        self.status
            .unset(StatusFlags::IDLE | StatusFlags::READY_FOR_COMMANDS);

        let mut index = 0;
        while index < words.len() {
            if self.writer.is_active() {
                if self.writer.is_complete() {
                    self.writer.reset();
                    continue;
                }
                index += self.write_vram_words(&words[index..]);
                continue;
            }

            if let Some(packet) = self.parser.push(words[index]) {
                self.execute_packet(&packet);
            }
            index += 1;
        }

        self.status
            .set(StatusFlags::IDLE | StatusFlags::READY_FOR_COMMANDS);
        Ok(())
    }

    /// Write a single GP0 word
    pub fn write_data(&mut self, word: u32) -> Result<()> {
        self.write_data_chunk(std::slice::from_ref(&word))
    }

    /// Move pixel pairs into VRAM; returns the number of words consumed
    fn write_vram_words(&mut self, words: &[u32]) -> usize {
        let mut consumed = 0;
        for &word in words {
            consumed += 1;
            for half in [word as u16, (word >> 16) as u16] {
                self.vram.write(self.writer.position, half);
                self.writer.advance(&self.vram);
                if self.writer.is_complete() {
                    self.finish_vram_write();
                    return consumed;
                }
            }
        }
        consumed
    }

    fn finish_vram_write(&mut self) {
        let area = self.writer.area;
        self.writer.reset();
        log::trace!(
            "CPU->VRAM transfer complete: {}x{} at ({}, {})",
            area.width,
            area.height,
            area.x,
            area.y
        );
        self.backend.upload_vram(area, self.vram.pixels());
    }

    /// Read GP0 data words from the active VRAM-to-CPU transfer
    ///
    /// Each word packs two pixels, low half first. Returns the number of
    /// words written; fewer than `out.len()` when the transfer ended.
    pub fn read_data_chunk(&mut self, out: &mut [u32]) -> Result<usize> {
        self.ensure_initialized()?;
        if !self.reader.is_active() {
            return Ok(0);
        }

        self.status.unset(StatusFlags::IDLE);
        let mut written = 0;
        for slot in out.iter_mut() {
            if self.reader.is_complete() || self.reader.rows_remaining == 0 {
                self.finish_vram_read();
                break;
            }

            let low = self.vram.read(self.reader.position);
            self.reader.advance(&self.vram);
            // The high half is read even past the end of an odd-width line
            let high = self.vram.read(self.reader.position);

            let word = low as u32 | ((high as u32) << 16);
            *slot = word;
            self.last_data_word = word;
            written += 1;

            if self.reader.is_complete() {
                self.finish_vram_read();
                break;
            }
            self.reader.advance(&self.vram);
            if self.reader.is_complete() {
                self.finish_vram_read();
                break;
            }
        }
        self.status.set(StatusFlags::IDLE);

        Ok(written)
    }

    /// Read a single GP0 data word
    ///
    /// Returns the next transfer word, or the last latched value (info
    /// query result or final transfer word) when no transfer is active.
    pub fn read_data(&mut self) -> Result<u32> {
        if self.reader.is_active() {
            let mut word = [0u32; 1];
            self.read_data_chunk(&mut word)?;
        } else {
            self.ensure_initialized()?;
        }
        Ok(self.last_data_word)
    }

    fn finish_vram_read(&mut self) {
        self.reader.reset();
        self.status.unset(StatusFlags::READY_FOR_VRAM);
        log::trace!("VRAM->CPU transfer complete");
    }

    /// Write a GP1 control word
    ///
    /// The word is kept in its command slot for save states before it is
    /// executed. Unknown commands are ignored.
    pub fn write_control_command(&mut self, word: u32) {
        let command = (word >> 24) as u8;
        self.control[command as usize] = word;

        match command {
            0x00 => self.gp1_reset_gpu(),
            0x01 => self.gp1_reset_command_buffer(),
            0x02 => self.gp1_acknowledge_interrupt(),
            0x03 => self.gp1_display_enable(word),
            0x04 => self.gp1_dma_direction(word),
            0x05 => self.gp1_display_area_start(word),
            0x06 => self.gp1_horizontal_display_range(word),
            0x07 => self.gp1_vertical_display_range(word),
            0x08 => self.gp1_display_mode(word),
            0x10..=0x1F => self.gp1_get_gpu_info(word),
            _ => log::trace!("GP1(0x{:02X}) ignored", command),
        }
    }

    /// Read the status register
    ///
    /// Reads advance the fake-busy sequence and, with the odd/even fix,
    /// flip the interlace field bit every third read.
    pub fn read_status(&mut self) -> u32 {
        if self.config.has_fix(CompatibilityFixes::ODD_EVEN_TOGGLE) {
            self.status_reads += 1;
            if self.status_reads >= 3 {
                self.status_reads = 0;
                self.status.toggle(StatusFlags::ODD_LINES);
            }
        }
        self.status.fake_busy_step();
        self.status.word()
    }

    /// Vertical blank notification
    ///
    /// Flips the interlace field, waits for the frame period and presents
    /// the frame unless it is skipped, the display is off or an interlaced
    /// pair is still settling.
    pub fn update_lace(&mut self) {
        self.apply_display_mode();

        if self.display.interlaced && !self.config.has_fix(CompatibilityFixes::ODD_EVEN_TOGGLE)
        {
            self.status.toggle(StatusFlags::ODD_LINES);
        }
        let odd = self.status.get(StatusFlags::ODD_LINES);

        let action = self.pacer.wait(self.config.pacing.frame_limit, odd);
        self.skipping = action == FrameAction::Skip;

        if self.skipping {
            log::trace!("Frame skipped");
        } else if self.display.current.disabled {
            log::trace!("Display disabled, frame not presented");
        } else if self.display.dual_interlace_count > 0 {
            self.display.dual_interlace_count -= 1;
        } else {
            let frame = self.display.frame_info(odd);
            self.backend.draw_frame(&frame, self.vram.pixels());
        }

        self.display.interlacing_just_enabled = false;
    }

    /// Commit a pending GP1(0x08) display mode
    pub(in crate::core) fn apply_display_mode(&mut self) {
        if !self.display.has_pending_change() {
            return;
        }
        self.display.commit();
        log::debug!(
            "Display mode applied: {}x{} interlaced={} rgb24={}",
            self.display.display_size.x,
            self.display.display_size.y,
            self.display.interlaced,
            self.display.current.rgb24
        );
        self.backend.update_display_offsets(&self.display);
    }

    /// Recompute the frame rate from the display mode
    pub(in crate::core) fn update_frequency(&mut self) {
        self.pacer.set_frequency(
            self.config.pacing.framerate_limit,
            self.display.region,
            self.display.pending_interlaced,
        );
    }

    /// Replace the configuration
    ///
    /// VRAM size changes take effect on the next `init`.
    pub fn set_config(&mut self, config: GpuConfig) {
        self.config = config;
        self.pacer.configure(&self.config.pacing);
        self.update_frequency();
    }

    pub fn config(&self) -> &GpuConfig {
        &self.config
    }

    /// Read-only VRAM
    pub fn vram(&self) -> &VideoMemory {
        &self.vram
    }

    pub fn status(&self) -> &StatusRegister {
        &self.status
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut FramePacer {
        &mut self.pacer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Last word written to GP1 command slot `index`
    pub fn control_register(&self, index: u8) -> u32 {
        self.control[index as usize]
    }

    pub fn last_data_word(&self) -> u32 {
        self.last_data_word
    }

    /// Current drawing mode (GP0 0xE1)
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Whether rendering of the current frame is being skipped
    pub fn is_skipping_frame(&self) -> bool {
        self.skipping
    }

    /// Save slot selected through the freeze info mode
    pub fn save_slot(&self) -> i32 {
        self.save_slot
    }

    /// Transfer state of the CPU-to-VRAM direction
    pub fn write_transfer(&self) -> &LoadState {
        &self.writer
    }

    /// Transfer state of the VRAM-to-CPU direction
    pub fn read_transfer(&self) -> &LoadState {
        &self.reader
    }

    /// Words held by the command parser for an incomplete packet
    pub fn pending_command_words(&self) -> usize {
        self.parser.pending_words()
    }
}
