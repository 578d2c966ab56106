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

//! GP1 command tests
//! Tests for reset, command buffer, interrupt, DMA direction and info queries

use super::super::*;
use super::test_gpu;

#[test]
fn test_gp1_reset_gpu() {
    let mut gpu = test_gpu();
    gpu.write_control_command(0x0300_0000);
    gpu.write_data_chunk(&[0xE600_0003, 0x2000_00FF]).unwrap();
    assert_eq!(gpu.pending_command_words(), 1);

    gpu.write_control_command(0x0000_0000);

    assert_eq!(gpu.read_status(), GPUSTATUS_INIT);
    assert_eq!(gpu.pending_command_words(), 0);
    assert!(gpu.display().current.disabled);
    assert_eq!(gpu.draw_mode(), DrawMode::default());
}

#[test]
fn test_gp1_reset_preserves_vram() {
    let mut gpu = test_gpu();
    gpu.vram.write_pixel(100, 100, 0xABCD);
    gpu.vram.write_pixel(1023, 511, 0x5678);

    gpu.write_control_command(0x0000_0000);

    assert_eq!(gpu.vram().read_pixel(100, 100), 0xABCD);
    assert_eq!(gpu.vram().read_pixel(1023, 511), 0x5678);
}

#[test]
fn test_gp1_reset_command_buffer() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0xA000_0000, 0x0000_0000, 0x0001_0004, 0x1111_1111])
        .unwrap();
    assert!(gpu.write_transfer().is_active());

    gpu.write_control_command(0x0100_0000);
    assert!(!gpu.write_transfer().is_active());
    assert_eq!(gpu.pending_command_words(), 0);

    // The next word is a command again
    gpu.write_data(0xE600_0001).unwrap();
    assert_ne!(gpu.read_status() & 0x0800, 0);
    assert_eq!(gpu.vram().read_pixel(2, 0), 0);
}

#[test]
fn test_gp1_reset_command_buffer_drops_partial_packet() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x3800_0000, 0, 0]).unwrap();
    gpu.write_control_command(0x0100_0000);
    assert_eq!(gpu.pending_command_words(), 0);
}

#[test]
fn test_gp1_acknowledge_interrupt() {
    let mut gpu = test_gpu();
    gpu.status.set(StatusFlags::IRQ);
    assert_ne!(gpu.read_status() & 0x0100_0000, 0);

    gpu.write_control_command(0x0200_0000);
    assert_eq!(gpu.read_status() & 0x0100_0000, 0);
}

#[test]
fn test_gp1_dma_direction() {
    let mut gpu = test_gpu();

    gpu.write_control_command(0x0400_0002);
    assert_eq!(gpu.read_status() & 0x6000_0000, 0x4000_0000);
    assert_eq!(gpu.write_transfer().mode, TransferMode::Vram);
    assert_eq!(gpu.read_transfer().mode, TransferMode::Normal);

    gpu.write_control_command(0x0400_0003);
    assert_eq!(gpu.read_status() & 0x6000_0000, 0x6000_0000);
    assert_eq!(gpu.write_transfer().mode, TransferMode::Normal);
    assert_eq!(gpu.read_transfer().mode, TransferMode::Vram);

    gpu.write_control_command(0x0400_0000);
    assert_eq!(gpu.read_status() & 0x6000_0000, 0);
    assert!(!gpu.read_transfer().is_active());
}

#[test]
fn test_gp1_dma_direction_without_transfer() {
    let mut gpu = test_gpu();
    gpu.write_control_command(0x0400_0002);

    // Nothing left to transfer, so the word is parsed as a command
    gpu.write_data(0xE600_0001).unwrap();
    assert!(!gpu.write_transfer().is_active());
    assert_ne!(gpu.read_status() & 0x0800, 0);
}

#[test]
fn test_gp1_dma_direction_keeps_transfer_counters() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0xA000_0000, 0x0000_0000, 0x0001_0004, 0x0002_0001])
        .unwrap();
    let before = *gpu.write_transfer();

    gpu.write_control_command(0x0400_0002);
    assert_eq!(*gpu.write_transfer(), before);

    gpu.write_data(0x0004_0003).unwrap();
    assert!(!gpu.write_transfer().is_active());
    assert_eq!(gpu.vram().read_pixel(3, 0), 4);
}

#[test]
fn test_gp1_info_queries() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[
        0xE2FA_BCDE,
        0xE3C1_2345,
        0xE4C5_4321,
        0xE5F0_0F0F,
    ])
    .unwrap();

    let mut query = |index: u32| {
        gpu.write_control_command(0x1000_0000 | index);
        gpu.read_data().unwrap()
    };

    assert_eq!(query(0x02), 0x000A_BCDE);
    assert_eq!(query(0x03), 0x0001_2345);
    assert_eq!(query(0x04), 0x0005_4321);
    assert_eq!(query(0x05), 0x0030_0F0F);
    assert_eq!(query(0x06), 0x0030_0F0F);
    assert_eq!(query(0x07), 2);
    assert_eq!(query(0x08), 0xBFC0_3720);
    assert_eq!(query(0x0F), 0xBFC0_3720);
}

#[test]
fn test_gp1_info_unknown_index_keeps_latch() {
    let mut gpu = test_gpu();
    gpu.write_control_command(0x1000_0007);
    gpu.write_control_command(0x1000_0009);
    assert_eq!(gpu.read_data().unwrap(), 2);
}

#[test]
fn test_gp1_info_aliases() {
    let mut gpu = test_gpu();
    gpu.write_control_command(0x1F00_0007);
    assert_eq!(gpu.last_data_word(), 2);
}

#[test]
fn test_gp1_info_reset_clears_values() {
    let mut gpu = test_gpu();
    gpu.write_data(0xE200_1234).unwrap();
    gpu.write_control_command(0x0000_0000);
    gpu.write_control_command(0x1000_0002);
    assert_eq!(gpu.read_data().unwrap(), 0);
}

#[test]
fn test_control_shadow_registers() {
    let mut gpu = test_gpu();
    gpu.write_control_command(0x0800_0001);
    gpu.write_control_command(0x0500_0400);
    gpu.write_control_command(0x0900_0001);

    assert_eq!(gpu.control_register(0x08), 0x0800_0001);
    assert_eq!(gpu.control_register(0x05), 0x0500_0400);
    assert_eq!(gpu.control_register(0x09), 0x0900_0001);

    // A GP1 reset keeps the shadow; a full reset clears it
    gpu.write_control_command(0x0000_0000);
    assert_eq!(gpu.control_register(0x08), 0x0800_0001);
    gpu.reset();
    assert_eq!(gpu.control_register(0x08), 0);
}
