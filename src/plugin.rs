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

//! PSEmu Pro plugin adapter
//!
//! Host emulators talk to GPU plugins through a small set of entry points
//! (`GPUinit`, `GPUwriteData`, `GPUfreeze`, ...) that return integer result
//! codes. [`GpuPlugin`] maps each of them onto the [`Gpu`] dispatcher and
//! turns errors into those codes. Errors are logged here since the host only
//! sees the code.

use crate::core::config::GpuConfig;
use crate::core::error::{GpuError, Result};
use crate::core::gpu::{Gpu, RenderBackend};
use crate::core::save_state::FreezeMode;

/// Operation succeeded
pub const PSE_ERR_SUCCESS: i32 = 0;

/// Operation failed
pub const PSE_ERR_FATAL: i32 = -1;

/// Initialization failed for lack of resources
pub const PSE_INIT_ERR_NOHARDWARE: i32 = -3;

/// Plugin instance as seen by the host
pub struct GpuPlugin<B: RenderBackend> {
    gpu: Gpu<B>,
    opened: bool,
}

impl<B: RenderBackend> GpuPlugin<B> {
    pub fn new(config: GpuConfig, backend: B) -> Self {
        Self::from_gpu(Gpu::new(config, backend))
    }

    pub fn from_gpu(gpu: Gpu<B>) -> Self {
        Self { gpu, opened: false }
    }

    /// GPUinit
    pub fn init(&mut self) -> i32 {
        match self.gpu.init() {
            Ok(()) => PSE_ERR_SUCCESS,
            Err(err @ GpuError::VramAllocation { .. }) => {
                log::error!("GPU init failed: {}", err);
                PSE_INIT_ERR_NOHARDWARE
            }
            Err(err) => {
                log::error!("GPU init failed: {}", err);
                PSE_ERR_FATAL
            }
        }
    }

    /// GPUshutdown
    pub fn shutdown(&mut self) -> i32 {
        self.opened = false;
        self.gpu.close();
        PSE_ERR_SUCCESS
    }

    /// GPUopen
    pub fn open(&mut self) -> i32 {
        if !self.gpu.is_initialized() {
            log::error!("GPU opened before init");
            return PSE_ERR_FATAL;
        }
        self.opened = true;
        self.gpu.pacer_mut().reset();
        PSE_ERR_SUCCESS
    }

    /// GPUclose
    pub fn close(&mut self) -> i32 {
        self.opened = false;
        PSE_ERR_SUCCESS
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// GPUwriteStatus
    pub fn write_status(&mut self, word: u32) {
        self.gpu.write_control_command(word);
    }

    /// GPUreadStatus
    pub fn read_status(&mut self) -> u32 {
        self.gpu.read_status()
    }

    /// GPUwriteData
    pub fn write_data(&mut self, word: u32) {
        log_failure("GPUwriteData", self.gpu.write_data(word));
    }

    /// GPUwriteDataMem
    pub fn write_data_mem(&mut self, words: &[u32]) {
        log_failure("GPUwriteDataMem", self.gpu.write_data_chunk(words));
    }

    /// GPUreadData
    pub fn read_data(&mut self) -> u32 {
        self.gpu.read_data().unwrap_or_else(|err| {
            log::warn!("GPUreadData failed: {}", err);
            0
        })
    }

    /// GPUreadDataMem
    pub fn read_data_mem(&mut self, out: &mut [u32]) {
        log_failure("GPUreadDataMem", self.gpu.read_data_chunk(out).map(|_| ()));
    }

    /// GPUdmaChain
    pub fn dma_chain(&mut self, memory: &[u32], address: u32) -> i32 {
        result_code("GPUdmaChain", self.gpu.dma_chain(memory, address))
    }

    /// GPUupdateLace
    pub fn update_lace(&mut self) {
        self.gpu.update_lace();
    }

    /// GPUfreeze; returns 1 on success and 0 on failure
    pub fn freeze(&mut self, mode: u32, buffer: &mut [u8]) -> i32 {
        let result = FreezeMode::try_from(mode).and_then(|mode| self.gpu.freeze(mode, buffer));
        match result {
            Ok(()) => 1,
            Err(err) => {
                log::warn!("GPUfreeze({}) failed: {}", mode, err);
                0
            }
        }
    }

    pub fn gpu(&self) -> &Gpu<B> {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut Gpu<B> {
        &mut self.gpu
    }
}

fn log_failure(entry: &str, result: Result<()>) {
    if let Err(err) = result {
        log::warn!("{} failed: {}", entry, err);
    }
}

fn result_code(entry: &str, result: Result<()>) -> i32 {
    match result {
        Ok(()) => PSE_ERR_SUCCESS,
        Err(err) => {
            log::warn!("{} failed: {}", entry, err);
            PSE_ERR_FATAL
        }
    }
}
