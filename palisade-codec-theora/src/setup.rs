// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use palisade_core::errors::{unknown_content_error, Result};
use palisade_core::io::{BitReaderLtr, FiniteBitStream, ReadBitsLtr};
use palisade_core::util::bits::ilog;

use log::debug;
use smallvec::SmallVec;

use crate::common::*;
use crate::huffman::{HuffmanTable, NUM_HUFFMAN_TABLES};

/// The maximum number of base matrices.
const MAX_BASE_MATRICES: u32 = 384;

/// The number of quantization indices.
const NUM_QUANT_INDICES: u32 = 64;

/// The quantization ranges of one quantization type and color plane (Theora I specification,
/// section 6.4.3).
///
/// The ranges partition the quantization indices 0 through 63. The quantization matrix for an
/// index is interpolated from the base matrices at either end of the range containing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuantRanges {
    /// The size of each range (QRSIZES).
    sizes: SmallVec<[u8; 8]>,
    /// The base matrix index at each range endpoint (QRBMIS).
    base_matrices: SmallVec<[u16; 8]>,
}

impl QuantRanges {
    /// Gets the number of ranges (NQRS).
    pub fn num_ranges(&self) -> usize {
        self.sizes.len()
    }

    /// Gets the size of each range.
    pub fn sizes(&self) -> &[u8] {
        &self.sizes
    }

    /// Gets the base matrix index at each range endpoint. There is one more endpoint than there
    /// are ranges.
    pub fn base_matrices(&self) -> &[u16] {
        &self.base_matrices
    }

    fn read(bs: &mut BitReaderLtr<'_>, n_base_matrices: u32) -> Result<Self> {
        let bmi_bits = ilog(n_base_matrices as i32 - 1);

        let mut ranges = QuantRanges::default();

        ranges.base_matrices.push(read_base_matrix_index(bs, bmi_bits, n_base_matrices)?);

        let mut qi = 0;

        while qi < NUM_QUANT_INDICES - 1 {
            let size = bs.read_bits_leq32(ilog(62 - qi as i32))? + 1;

            qi += size;

            if qi > NUM_QUANT_INDICES - 1 {
                return unknown_content_error("theora: quantization ranges exceed index 63");
            }

            ranges.sizes.push(size as u8);
            ranges.base_matrices.push(read_base_matrix_index(bs, bmi_bits, n_base_matrices)?);
        }

        Ok(ranges)
    }
}

fn read_base_matrix_index(
    bs: &mut BitReaderLtr<'_>,
    bmi_bits: u32,
    n_base_matrices: u32,
) -> Result<u16> {
    let bmi = bs.read_bits_leq32(bmi_bits)?;

    if bmi >= n_base_matrices {
        debug!("theora: base matrix index {} of {}", bmi, n_base_matrices);
        return unknown_content_error("theora: invalid base matrix index");
    }

    Ok(bmi as u16)
}

/// The Theora setup header.
#[derive(Clone, Debug)]
pub struct SetupHeader {
    /// The loop filter limit for each quantization index (LFLIMS).
    pub loop_filter_limits: [u8; 64],
    /// The AC scale factor for each quantization index (ACSCALE).
    pub ac_scale: [u16; 64],
    /// The DC scale factor for each quantization index (DCSCALE).
    pub dc_scale: [u16; 64],
    /// The base matrices (BMS).
    pub base_matrices: Vec<[u8; 64]>,
    /// The distinct sets of quantization ranges, in the order they were coded.
    quant_ranges: SmallVec<[QuantRanges; 6]>,
    /// The index into `quant_ranges` for each quantization type and color plane. Sets that were
    /// coded as a copy of an earlier set share its index.
    quant_range_index: [[u8; 3]; 2],
    /// The DCT token Huffman tables (HTS).
    pub huffman_tables: Vec<HuffmanTable>,
}

impl SetupHeader {
    /// Gets the quantization ranges for quantization type `qti` (0 intra, 1 inter) and color
    /// plane `pli` (0 Y, 1 Cb, 2 Cr).
    pub fn quant_ranges(&self, qti: usize, pli: usize) -> &QuantRanges {
        &self.quant_ranges[usize::from(self.quant_range_index[qti][pli])]
    }

    /// Gets the number of distinct sets of quantization ranges that were coded.
    pub fn num_distinct_quant_ranges(&self) -> usize {
        self.quant_ranges.len()
    }
}

/// Reads and validates a setup header packet.
pub fn read_setup_header(bs: &mut BitReaderLtr<'_>) -> Result<SetupHeader> {
    // The packet type must be a setup header.
    read_header_prefix(bs, THEORA_PACKET_TYPE_SETUP)?;

    // Loop filter limits.
    let mut loop_filter_limits = [0; 64];

    let lflim_bits = bs.read_bits_leq32(3)?;

    for limit in loop_filter_limits.iter_mut() {
        *limit = bs.read_bits_leq32(lflim_bits)? as u8;
    }

    // Quantization parameters.
    let ac_scale = read_scale_table(bs)?;
    let dc_scale = read_scale_table(bs)?;

    let n_base_matrices = bs.read_bits_leq32(9)? + 1;

    if n_base_matrices > MAX_BASE_MATRICES {
        debug!("theora: {} base matrices", n_base_matrices);
        return unknown_content_error("theora: too many base matrices");
    }

    let mut base_matrices = Vec::with_capacity(n_base_matrices as usize);

    for _ in 0..n_base_matrices {
        let mut matrix = [0; 64];

        for coeff in matrix.iter_mut() {
            *coeff = bs.read_bits_leq32(8)? as u8;
        }

        base_matrices.push(matrix);
    }

    let mut quant_ranges = SmallVec::<[QuantRanges; 6]>::new();
    let mut quant_range_index = [[0; 3]; 2];

    for qti in 0..2 {
        for pli in 0..3 {
            // The first set is always coded explicitly.
            let is_new = if qti == 0 && pli == 0 { true } else { bs.read_bit()? };

            if is_new {
                quant_range_index[qti][pli] = quant_ranges.len() as u8;
                quant_ranges.push(QuantRanges::read(bs, n_base_matrices)?);
            }
            else {
                // Copy either the same plane of the previous quantization type, or the previous
                // set in coded order.
                let (qtj, plj) = if qti > 0 && bs.read_bit()? {
                    (qti - 1, pli)
                }
                else {
                    ((3 * qti + pli - 1) / 3, (pli + 2) % 3)
                };

                quant_range_index[qti][pli] = quant_range_index[qtj][plj];
            }
        }
    }

    // DCT token Huffman tables.
    let mut huffman_tables = Vec::with_capacity(NUM_HUFFMAN_TABLES);

    for _ in 0..NUM_HUFFMAN_TABLES {
        huffman_tables.push(HuffmanTable::read(bs)?);
    }

    debug!(
        "theora: setup header with {} base matrices, {} distinct quantization range sets",
        n_base_matrices,
        quant_ranges.len()
    );

    if bs.bits_left() > 0 {
        debug!("theora: {} trailing bits after setup header", bs.bits_left());
    }

    Ok(SetupHeader {
        loop_filter_limits,
        ac_scale,
        dc_scale,
        base_matrices,
        quant_ranges,
        quant_range_index,
        huffman_tables,
    })
}

fn read_scale_table(bs: &mut BitReaderLtr<'_>) -> Result<[u16; 64]> {
    let mut table = [0; 64];

    let scale_bits = bs.read_bits_leq32(4)? + 1;

    for scale in table.iter_mut() {
        *scale = bs.read_bits_leq32(scale_bits)? as u16;
    }

    Ok(table)
}
