// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use palisade_core::errors::{unknown_content_error, Result};
use palisade_core::io::{BitReaderLtr, ReadBitsLtr};

use smallvec::SmallVec;

/// The number of Huffman tables in a setup header.
pub const NUM_HUFFMAN_TABLES: usize = 80;

/// The maximum length of a Huffman codeword.
const MAX_CODE_LEN: u32 = 32;

/// The maximum number of codewords in a single Huffman table.
const MAX_TABLE_ENTRIES: usize = 32;

/// A single Huffman codeword and the DCT token it decodes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HuffmanEntry {
    /// The codeword length in bits. May be 0 if the table has exactly one entry.
    pub len: u8,
    /// The codeword, right-aligned.
    pub code: u32,
    /// The 5-bit token.
    pub token: u8,
}

/// A DCT token Huffman table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HuffmanTable {
    entries: SmallVec<[HuffmanEntry; 16]>,
}

impl HuffmanTable {
    /// Reads a Huffman table from the setup header.
    pub fn read(bs: &mut BitReaderLtr<'_>) -> Result<Self> {
        let mut table = HuffmanTable::default();
        table.read_node(bs, 0, 0)?;
        Ok(table)
    }

    // The tree is transmitted depth-first. A node is a leaf if its flag is set, in which case a
    // token follows. Otherwise the node's 0 and 1 children follow, in that order.
    fn read_node(&mut self, bs: &mut BitReaderLtr<'_>, len: u32, code: u32) -> Result<()> {
        if len > MAX_CODE_LEN {
            return unknown_content_error("theora: huffman codeword exceeds 32 bits");
        }

        if bs.read_bit()? {
            if self.entries.len() == MAX_TABLE_ENTRIES {
                return unknown_content_error("theora: huffman table exceeds 32 entries");
            }

            let token = bs.read_bits_leq32(5)? as u8;

            self.entries.push(HuffmanEntry { len: len as u8, code, token });
        }
        else {
            // Shifting out the top bit of a 32-bit codeword is harmless since the child is
            // rejected before its codeword is used.
            self.read_node(bs, len + 1, code << 1)?;
            self.read_node(bs, len + 1, (code << 1) | 1)?;
        }

        Ok(())
    }

    /// Gets the codewords of the table in the order they were transmitted.
    pub fn entries(&self) -> &[HuffmanEntry] {
        &self.entries
    }

    /// Looks up the token for a codeword.
    pub fn token(&self, len: u8, code: u32) -> Option<u8> {
        self.entries.iter().find(|e| e.len == len && e.code == code).map(|e| e.token)
    }
}
