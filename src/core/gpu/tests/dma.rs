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

//! DMA linked-list tests

use super::super::*;
use super::test_gpu;
use crate::core::config::GpuConfig;
use crate::core::error::GpuError;

/// Main RAM image with room for a few blocks
fn ram() -> Vec<u32> {
    vec![0; 0x400]
}

/// Write a block header and its data at byte address `address`
fn block(memory: &mut [u32], address: u32, next: u32, data: &[u32]) {
    let index = (address >> 2) as usize;
    memory[index] = ((data.len() as u32) << 24) | (next & DMA_TERMINATOR);
    memory[index + 1..index + 1 + data.len()].copy_from_slice(data);
}

fn draw_offsets(gpu: &Gpu<RecordingBackend>) -> Vec<Point> {
    gpu.backend()
        .events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::DrawState(DrawStateCommand::DrawOffset(p)) => Some(*p),
            _ => None,
        })
        .collect()
}

#[test]
fn test_dma_chain_executes_blocks_in_order() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x000, 0x100, &[0xE600_0001, 0xE100_0200]);
    block(&mut memory, 0x100, 0x040, &[0xE600_0000]);
    block(&mut memory, 0x040, DMA_TERMINATOR, &[0xE500_0001]);

    gpu.dma_chain(&memory, 0).unwrap();

    let status = gpu.read_status();
    assert_eq!(status & 0x1800, 0);
    assert_ne!(status & 0x0200, 0);
    assert_ne!(status & 0x0400_0000, 0);
    assert_eq!(draw_offsets(&gpu), vec![Point::new(1, 0)]);
}

#[test]
fn test_dma_chain_follows_empty_blocks() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x000, 0x080, &[]);
    block(&mut memory, 0x080, DMA_TERMINATOR, &[0xE500_0002]);

    gpu.dma_chain(&memory, 0).unwrap();
    assert_eq!(draw_offsets(&gpu), vec![Point::new(2, 0)]);
}

#[test]
fn test_dma_chain_packet_spans_blocks() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x000, 0x020, &[0x2000_00FF, 0x0000_0000]);
    block(&mut memory, 0x020, DMA_TERMINATOR, &[0x0000_0010, 0x0010_0000]);

    gpu.dma_chain(&memory, 0).unwrap();
    assert_eq!(gpu.backend().primitive_count(), 1);
}

#[test]
fn test_dma_chain_image_upload() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(
        &mut memory,
        0x000,
        DMA_TERMINATOR,
        &[0xA000_0000, 0x0000_0000, 0x0001_0002, 0x1234_5678],
    );

    gpu.dma_chain(&memory, 0).unwrap();
    assert_eq!(gpu.vram().read_pixel(0, 0), 0x5678);
    assert_eq!(gpu.vram().read_pixel(1, 0), 0x1234);
}

#[test]
fn test_dma_chain_stops_on_cycle() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x000, 0x010, &[0xE500_0001]);
    block(&mut memory, 0x010, 0x000, &[0xE500_0002]);

    gpu.dma_chain(&memory, 0).unwrap();
    assert_eq!(draw_offsets(&gpu), vec![Point::new(1, 0), Point::new(2, 0)]);
    assert_ne!(gpu.read_status() & 0x0400_0000, 0);
}

#[test]
fn test_dma_chain_self_loop() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x040, 0x040, &[0xE500_0003]);

    gpu.dma_chain(&memory, 0x040).unwrap();
    assert_eq!(draw_offsets(&gpu), vec![Point::new(3, 0)]);
}

#[test]
fn test_dma_detector_resets_between_chains() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x000, DMA_TERMINATOR, &[0xE500_0001]);

    gpu.dma_chain(&memory, 0).unwrap();
    gpu.dma_chain(&memory, 0).unwrap();
    assert_eq!(draw_offsets(&gpu).len(), 2);
}

#[test]
fn test_dma_chain_out_of_range_stops() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x000, 0x10_0000, &[0xE500_0001]);

    gpu.dma_chain(&memory, 0).unwrap();
    assert_eq!(draw_offsets(&gpu), vec![Point::new(1, 0)]);
}

#[test]
fn test_dma_chain_truncated_block_stops() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    let last = (memory.len() - 1) as u32 * 4;
    memory[last as usize / 4] = (4 << 24) | DMA_TERMINATOR;

    gpu.dma_chain(&memory, last).unwrap();
    assert!(gpu.backend().events.is_empty());
}

#[test]
fn test_dma_chain_masks_segment_bits() {
    let mut gpu = test_gpu();
    let mut memory = ram();
    block(&mut memory, 0x080, DMA_TERMINATOR, &[0xE500_0004]);

    gpu.dma_chain(&memory, 0x8000_0080).unwrap();
    assert_eq!(draw_offsets(&gpu), vec![Point::new(4, 0)]);
}

#[test]
fn test_dma_chain_requires_init() {
    let mut gpu = Gpu::new(GpuConfig::default(), NullBackend);
    assert!(matches!(
        gpu.dma_chain(&[DMA_TERMINATOR], 0),
        Err(GpuError::NotInitialized)
    ));
}
