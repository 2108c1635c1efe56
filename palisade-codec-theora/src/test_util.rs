// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// A most-significant bit first bit writer for assembling test packets.
#[derive(Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn bit(&mut self, bit: bool) -> &mut Self {
        if self.len % 8 == 0 {
            self.buf.push(0);
        }
        if bit {
            let last = self.buf.len() - 1;
            self.buf[last] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
        self
    }

    pub fn bits(&mut self, value: u32, width: u32) -> &mut Self {
        for i in (0..width).rev() {
            self.bit((value >> i) & 1 == 1);
        }
        self
    }

    /// Writes a string of '0' and '1' characters. Other characters are ignored.
    pub fn code(&mut self, code: &str) -> &mut Self {
        for c in code.chars() {
            if c == '0' || c == '1' {
                self.bit(c == '1');
            }
        }
        self
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for &byte in bytes {
            self.bits(u32::from(byte), 8);
        }
        self
    }

    pub fn u32_le(&mut self, value: u32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

/// Writes 80 Huffman tables, each with a single codeword.
pub fn write_huffman_tables(bw: &mut BitWriter) {
    for _ in 0..80 {
        bw.bit(true).bits(0, 5);
    }
}

/// Builds an identification header for a frame of `mb_width` by `mb_height` macroblocks with the
/// given pixel format.
pub fn ident_header(mb_width: u16, mb_height: u16, pixel_format: u32) -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.bytes(b"\x80theora");
    bw.bits(3, 8).bits(2, 8).bits(1, 8);
    bw.bits(u32::from(mb_width), 16).bits(u32::from(mb_height), 16);
    bw.bits(u32::from(mb_width) * 16, 24).bits(u32::from(mb_height) * 16, 24);
    bw.bits(0, 8).bits(0, 8);
    bw.bits(30000, 32).bits(1001, 32);
    bw.bits(1, 24).bits(1, 24);
    bw.bits(2, 8).bits(0, 24);
    bw.bits(48, 6).bits(6, 5).bits(pixel_format, 2).bits(0, 3);
    bw.to_bytes()
}

/// Builds a comment header with a vendor string and one comment.
pub fn comment_header() -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.bytes(b"\x81theora");
    bw.u32_le(6).bytes(b"vendor");
    bw.u32_le(1).u32_le(10).bytes(b"TITLE=test");
    bw.to_bytes()
}

/// Builds a setup header with one base matrix and a single set of quantization ranges.
pub fn setup_header() -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.bytes(b"\x82theora");
    // LFLIMS, ACSCALE, DCSCALE.
    bw.bits(0, 3);
    bw.bits(0, 4);
    for _ in 0..64 {
        bw.bit(true);
    }
    bw.bits(0, 4);
    for _ in 0..64 {
        bw.bit(true);
    }
    // One base matrix.
    bw.bits(0, 9);
    for _ in 0..64 {
        bw.bits(16, 8);
    }
    // A single range covering every quantization index, shared by all planes.
    bw.bits(62, 6);
    bw.bit(false).bit(false);
    bw.bit(false).bit(true).bit(false).bit(false).bit(false).bit(false);
    write_huffman_tables(&mut bw);
    bw.to_bytes()
}
