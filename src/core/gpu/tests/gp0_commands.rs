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

//! GP0 command tests
//! Tests for packet assembly, primitive decoding, fill/move and draw state

use super::super::*;
use super::test_gpu;
use proptest::prelude::*;

#[test]
fn test_command_lengths() {
    assert_eq!(COMMAND_LENGTHS[0x00], 0);
    assert_eq!(COMMAND_LENGTHS[0x01], 0);
    assert_eq!(COMMAND_LENGTHS[0x02], 3);
    assert_eq!(COMMAND_LENGTHS[0x20], 4);
    assert_eq!(COMMAND_LENGTHS[0x24], 7);
    assert_eq!(COMMAND_LENGTHS[0x2C], 9);
    assert_eq!(COMMAND_LENGTHS[0x30], 6);
    assert_eq!(COMMAND_LENGTHS[0x3C], 12);
    assert_eq!(COMMAND_LENGTHS[0x40], 3);
    assert_eq!(COMMAND_LENGTHS[0x48], 254);
    assert_eq!(COMMAND_LENGTHS[0x50], 4);
    assert_eq!(COMMAND_LENGTHS[0x5F], 255);
    assert_eq!(COMMAND_LENGTHS[0x60], 3);
    assert_eq!(COMMAND_LENGTHS[0x64], 4);
    assert_eq!(COMMAND_LENGTHS[0x68], 2);
    assert_eq!(COMMAND_LENGTHS[0x7C], 3);
    assert_eq!(COMMAND_LENGTHS[0x80], 4);
    assert_eq!(COMMAND_LENGTHS[0xA0], 3);
    assert_eq!(COMMAND_LENGTHS[0xC0], 3);
    assert_eq!(COMMAND_LENGTHS[0xE1], 1);
    assert_eq!(COMMAND_LENGTHS[0xE6], 1);
    assert_eq!(COMMAND_LENGTHS[0xE7], 0);
    assert_eq!(COMMAND_LENGTHS[0xFF], 0);
}

#[test]
fn test_unknown_words_discarded() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x0000_0000, 0x0100_0000, 0xFF12_3456])
        .unwrap();
    assert_eq!(gpu.pending_command_words(), 0);
    assert!(gpu.backend().events.is_empty());
}

/// Feed words until a packet comes out
fn assemble(parser: &mut CommandParser, words: &[u32]) -> Option<Packet> {
    words.iter().filter_map(|&w| parser.push(w)).last()
}

#[test]
fn test_packet_equality_ignores_stale_words() {
    let triangle = [0x2000_00FF, 0x0000_0000, 0x0000_0010, 0x0010_0000];

    let mut used = CommandParser::new();
    let quad: Vec<u32> = std::iter::once(0x2C80_8080).chain(1..9).collect();
    assert!(assemble(&mut used, &quad).is_some());

    let mut fresh = CommandParser::new();
    let a = assemble(&mut fresh, &triangle).unwrap();
    let b = assemble(&mut used, &triangle).unwrap();
    assert_eq!(a.words(), b.words());
    assert_eq!(a, b);

    let mut other = triangle;
    other[3] = 0x0020_0000;
    let c = assemble(&mut fresh, &other).unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_packet_split_across_chunks() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x2000_00FF, 0x0000_0000]).unwrap();
    assert_eq!(gpu.pending_command_words(), 2);
    assert_eq!(gpu.backend().primitive_count(), 0);

    gpu.write_data_chunk(&[0x0000_0040, 0x0040_0000]).unwrap();
    assert_eq!(gpu.pending_command_words(), 0);
    assert_eq!(gpu.backend().primitive_count(), 1);
}

#[test]
fn test_shaded_triangle_decoded() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[
        0x3000_00FF,
        0x0000_0000,
        0x0000_FF00,
        0x0000_0040,
        0x00FF_0000,
        0x0040_0000,
    ])
    .unwrap();

    let BackendEvent::Polygon(polygon) = &gpu.backend().events[0] else {
        panic!("expected a polygon");
    };
    assert_eq!(polygon.vertex_count, 3);
    assert!(polygon.shaded);
    assert!(!polygon.textured);
    assert_eq!(polygon.colors[0].r, 0xFF);
    assert_eq!(polygon.colors[1].g, 0xFF);
    assert_eq!(polygon.colors[2].b, 0xFF);
    assert_eq!(polygon.vertices()[1], Vertex { x: 0x40, y: 0 });
    assert_eq!(polygon.vertices()[2], Vertex { x: 0, y: 0x40 });
}

#[test]
fn test_textured_quad_decoded() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[
        0x2C80_8080,
        0x0000_0000,
        0x7FC0_0000, // CLUT + UV
        0x0000_0010,
        0x0015_0010, // texpage + UV
        0x0010_0000,
        0x0000_1000,
        0x0010_0010,
        0x0000_1010,
    ])
    .unwrap();

    let BackendEvent::Polygon(polygon) = &gpu.backend().events[0] else {
        panic!("expected a polygon");
    };
    assert_eq!(polygon.vertex_count, 4);
    assert!(polygon.textured);
    assert_eq!(polygon.clut, 0x7FC0);
    assert_eq!(polygon.texpage, 0x0015);
    assert_eq!(polygon.tex_coords[3], TexCoord { u: 0x10, v: 0x10 });
}

#[test]
fn test_rectangle_sizes() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[
        0x6000_00FF,
        0x0010_0020,
        0x0030_0040, // 64x48
        0x7000_00FF,
        0x0000_0000, // 8x8
        0x7800_00FF,
        0x0000_0000, // 16x16
        0x6800_00FF,
        0x0000_0000, // 1x1
    ])
    .unwrap();

    let sizes: Vec<(u16, u16)> = gpu
        .backend()
        .events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::Rectangle(r) => Some((r.width, r.height)),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![(64, 48), (8, 8), (16, 16), (1, 1)]);
}

#[test]
fn test_flat_polyline_terminator() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[
        0x4800_00FF,
        0x0000_0000,
        0x0010_0010,
        0x0020_0000,
        0x5555_5555,
        0xE600_0001,
    ])
    .unwrap();

    let BackendEvent::Line(line) = &gpu.backend().events[0] else {
        panic!("expected a line");
    };
    assert!(line.polyline);
    assert_eq!(line.vertices.len(), 3);
    assert_eq!(line.vertices[2], Vertex { x: 0, y: 0x20 });

    // The word after the terminator is a new command
    assert_ne!(gpu.read_status() & 0x0800, 0);
}

#[test]
fn test_polyline_terminator_needs_two_vertices() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x4800_0000, 0x5000_5000, 0x0010_0010]).unwrap();
    assert_eq!(gpu.pending_command_words(), 3);

    gpu.write_data(0x5000_5000).unwrap();
    assert_eq!(gpu.pending_command_words(), 0);

    let BackendEvent::Line(line) = &gpu.backend().events[0] else {
        panic!("expected a line");
    };
    assert_eq!(line.vertices.len(), 2);
    assert_eq!(line.vertices[0], Vertex { x: 0x5000, y: 0x5000 });
}

#[test]
fn test_shaded_polyline_terminator_in_color_slot() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[
        0x5800_00FF,
        0x0000_0000,
        0x0000_FF00,
        0x0010_0010,
        0x5000_5000,
    ])
    .unwrap();

    let BackendEvent::Line(line) = &gpu.backend().events[0] else {
        panic!("expected a line");
    };
    assert!(line.shaded);
    assert_eq!(line.vertices.len(), 2);
    assert_eq!(line.colors[1].g, 0xFF);
}

#[test]
fn test_shaded_polyline_ignores_terminator_in_vertex_slot() {
    let mut gpu = test_gpu();
    // Index 3 is a vertex slot, so the packet keeps going
    gpu.write_data_chunk(&[0x5800_0000, 0x0000_0000, 0x0000_0000, 0x5000_5000])
        .unwrap();
    assert_eq!(gpu.pending_command_words(), 4);
}

#[test]
fn test_unterminated_polyline_ends_at_capacity() {
    let mut gpu = test_gpu();
    let mut words = vec![0x4800_0000];
    words.extend(std::iter::repeat(0x0001_0001).take(253));
    gpu.write_data_chunk(&words).unwrap();

    assert_eq!(gpu.pending_command_words(), 0);
    let BackendEvent::Line(line) = &gpu.backend().events[0] else {
        panic!("expected a line");
    };
    assert_eq!(line.vertices.len(), 253);
}

#[test]
fn test_simple_line() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x4200_00FF, 0x0000_0000, 0x0010_0010]).unwrap();

    let BackendEvent::Line(line) = &gpu.backend().events[0] else {
        panic!("expected a line");
    };
    assert!(!line.polyline);
    assert!(line.semi_transparent);
    assert_eq!(line.vertices.len(), 2);
}

#[test]
fn test_fill_rectangle() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x0200_00FF, 0x0010_0013, 0x0002_0005])
        .unwrap();

    let area = VramRect::new(16, 16, 16, 2);
    assert_eq!(
        gpu.backend().events,
        vec![BackendEvent::Fill { area, color: 0x001F }]
    );
    for y in 16..18 {
        for x in 16..32 {
            assert_eq!(gpu.vram().read_pixel(x, y), 0x001F, "({}, {})", x, y);
        }
    }
    assert_eq!(gpu.vram().read_pixel(32, 16), 0);
    assert_eq!(gpu.vram().read_pixel(16, 18), 0);
}

#[test]
fn test_fill_wraps_at_right_edge() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x0200_FF00, 0x0000_03F0, 0x0001_0020])
        .unwrap();

    let green = 0x03E0;
    assert_eq!(gpu.vram().read_pixel(1008, 0), green);
    assert_eq!(gpu.vram().read_pixel(1023, 0), green);
    assert_eq!(gpu.vram().read_pixel(0, 0), green);
    assert_eq!(gpu.vram().read_pixel(15, 0), green);
    assert_eq!(gpu.vram().read_pixel(16, 0), 0);
}

#[test]
fn test_move_image() {
    let mut gpu = test_gpu();
    gpu.vram.write_pixel(0, 0, 1);
    gpu.vram.write_pixel(1, 0, 2);
    gpu.vram.write_pixel(0, 1, 3);
    gpu.vram.write_pixel(1, 1, 4);

    gpu.write_data_chunk(&[0x8000_0000, 0x0000_0000, 0x0010_0020, 0x0002_0002])
        .unwrap();

    assert_eq!(gpu.vram().read_pixel(32, 16), 1);
    assert_eq!(gpu.vram().read_pixel(33, 16), 2);
    assert_eq!(gpu.vram().read_pixel(32, 17), 3);
    assert_eq!(gpu.vram().read_pixel(33, 17), 4);
    assert_eq!(gpu.vram().read_pixel(0, 0), 1);
    assert_eq!(
        gpu.backend().events,
        vec![BackendEvent::Copy(VramCopy {
            source: VramRect::new(0, 0, 2, 2),
            dest_x: 32,
            dest_y: 16,
        })]
    );
}

#[test]
fn test_move_image_overlapping() {
    let mut gpu = test_gpu();
    for x in 0..4 {
        gpu.vram.write_pixel(x, 0, x + 1);
    }

    gpu.write_data_chunk(&[0x8000_0000, 0x0000_0000, 0x0000_0001, 0x0001_0004])
        .unwrap();

    let row: Vec<u16> = (0..5).map(|x| gpu.vram().read_pixel(x, 0)).collect();
    assert_eq!(row, vec![1, 1, 2, 3, 4]);
}

#[test]
fn test_move_image_same_position_is_noop() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0x8000_0000, 0x0010_0010, 0x0010_0010, 0x0004_0004])
        .unwrap();
    assert!(gpu.backend().events.is_empty());
}

#[test]
fn test_draw_mode_status_bits() {
    let mut gpu = test_gpu();
    gpu.write_data(0xE100_060F).unwrap();

    let status = gpu.read_status();
    assert_eq!(status & 0x07FF, 0x060F);
    assert_ne!(status & 0x2000, 0);

    let mode = gpu.draw_mode();
    assert_eq!(mode.texture_page_x_base, 0x0F);
    assert!(mode.dithering);
    assert!(mode.draw_to_display);
    assert_eq!(
        gpu.backend().events,
        vec![BackendEvent::DrawState(DrawStateCommand::DrawMode(mode))]
    );
}

#[test]
fn test_mask_settings_status_bits() {
    let mut gpu = test_gpu();
    gpu.write_data(0xE600_0003).unwrap();
    assert_eq!(gpu.read_status() & 0x1800, 0x1800);

    gpu.write_data(0xE600_0001).unwrap();
    assert_eq!(gpu.read_status() & 0x1800, 0x0800);

    gpu.write_data(0xE600_0000).unwrap();
    assert_eq!(gpu.read_status() & 0x1800, 0);
}

#[test]
fn test_draw_offset_sign_extended() {
    let mut gpu = test_gpu();
    gpu.write_data(0xE500_0000 | (5 << 11) | 0x7F0).unwrap();

    assert_eq!(gpu.display().current.draw_offset, Point::new(-16, 5));
    assert_eq!(
        gpu.backend().events,
        vec![BackendEvent::DrawState(DrawStateCommand::DrawOffset(
            Point::new(-16, 5)
        ))]
    );
}

#[test]
fn test_draw_area_corners() {
    let mut gpu = test_gpu();
    gpu.write_data_chunk(&[0xE300_0000 | (16 << 10) | 8, 0xE400_0000 | (239 << 10) | 319])
        .unwrap();

    let area = gpu.display().current.draw_area;
    assert_eq!((area.left, area.top), (8, 16));
    assert_eq!((area.right, area.bottom), (319, 239));
}

#[test]
fn test_primitives_dropped_while_skipping() {
    let mut gpu = test_gpu();
    gpu.skipping = true;

    gpu.write_data_chunk(&[0x2000_00FF, 0, 0x10, 0x0010_0000]).unwrap();
    gpu.write_data_chunk(&[0x0200_00FF, 0x0000_0000, 0x0001_0010])
        .unwrap();

    assert_eq!(gpu.backend().primitive_count(), 0);
    assert_eq!(gpu.vram().read_pixel(0, 0), 0x001F);
}

/// A stream mixing fixed packets, a polyline, an image upload and a move
fn mixed_stream() -> Vec<u32> {
    vec![
        0xE100_0205,
        0x2000_00FF,
        0x0000_0000,
        0x0000_0010,
        0x0010_0000,
        0xA000_0000,
        0x0000_0000,
        0x0002_0003,
        0x0002_0001,
        0x0004_0003,
        0x0006_0005,
        0x4800_00FF,
        0x0000_0000,
        0x0010_0010,
        0x0020_0000,
        0x5555_5555,
        0x6800_00FF,
        0x0008_0008,
        0x0200_FFFF,
        0x0000_0040,
        0x0001_0010,
        0x8000_0000,
        0x0000_0000,
        0x0000_0100,
        0x0002_0004,
        0xE600_0002,
    ]
}

proptest! {
    #[test]
    fn prop_chunking_does_not_change_result(
        cuts in proptest::collection::vec(0usize..26, 0..8)
    ) {
        let stream = mixed_stream();

        let mut reference = test_gpu();
        reference.write_data_chunk(&stream).unwrap();

        let mut cuts = cuts;
        cuts.push(0);
        cuts.push(stream.len());
        cuts.sort_unstable();
        cuts.dedup();

        let mut chunked = test_gpu();
        for window in cuts.windows(2) {
            chunked.write_data_chunk(&stream[window[0]..window[1]]).unwrap();
        }

        prop_assert_eq!(&chunked.backend().events, &reference.backend().events);
        prop_assert_eq!(chunked.status().word(), reference.status().word());
        prop_assert!(chunked.vram().pixels() == reference.vram().pixels());
        prop_assert_eq!(chunked.pending_command_words(), 0);
    }
}
