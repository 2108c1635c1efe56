// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame body side information (Theora I specification, sections 7.3 through 7.6).
//!
//! The coded block flags, macroblock coding modes, motion vectors, and block-level quantization
//! indices precede the DCT coefficient tokens of a frame. They are fully determined by the frame
//! layout and header, so they can be validated without decoding the frame.

use palisade_core::errors::Result;
use palisade_core::io::{BitReaderLtr, ReadBitsLtr};

use crate::frame::{FrameHeader, FrameType};
use crate::layout::FrameLayout;
use crate::mv::{read_motion_vector, MotionVector, MotionVectorCoding};
use crate::runs::{read_long_run_flags, read_short_run_flags};

/// A macroblock coding mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CodingMode {
    InterNoMv,
    Intra,
    InterMv,
    InterMvLast,
    InterMvLast2,
    InterGoldenNoMv,
    InterGoldenMv,
    InterMvFour,
}

/// The coding modes, by their coded value.
const CODING_MODES: [CodingMode; 8] = [
    CodingMode::InterNoMv,
    CodingMode::Intra,
    CodingMode::InterMv,
    CodingMode::InterMvLast,
    CodingMode::InterMvLast2,
    CodingMode::InterGoldenNoMv,
    CodingMode::InterGoldenMv,
    CodingMode::InterMvFour,
];

/// The mode alphabets of schemes 1 through 6, as coded mode values. The mode at index `i` is coded
/// with rank `i`.
const MODE_ALPHABETS: [[u8; 8]; 6] = [
    [3, 4, 2, 0, 1, 5, 6, 7],
    [3, 4, 0, 2, 1, 5, 6, 7],
    [3, 2, 4, 0, 1, 5, 6, 7],
    [3, 2, 0, 4, 1, 5, 6, 7],
    [0, 3, 4, 2, 1, 5, 6, 7],
    [0, 5, 3, 4, 2, 1, 6, 7],
];

/// The mode scheme in which every mode is coded with 3 raw bits.
const RAW_MODE_SCHEME: u32 = 7;

/// The validated side information of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBody {
    /// The coded flag of every block, in coded order.
    pub coded_blocks: Vec<bool>,
    /// The coding mode of every macroblock, in coded order.
    pub mb_modes: Vec<CodingMode>,
    /// The motion vectors, in coded order.
    pub motion_vectors: Vec<MotionVector>,
    /// The index into the frame header's quantization indices for every coded block, in coded
    /// order.
    pub block_qiis: Vec<u8>,
}

impl FrameBody {
    pub fn num_coded_blocks(&self) -> usize {
        self.block_qiis.len()
    }
}

/// Reads and validates the side information of a frame, following its header.
pub fn read_frame_body(
    bs: &mut BitReaderLtr<'_>,
    layout: &FrameLayout,
    header: &FrameHeader,
) -> Result<FrameBody> {
    let coded_blocks = read_coded_blocks(bs, layout, header.frame_type)?;

    // Macroblocks are made up of the luma blocks, which come first in coded order.
    let coded_luma = &coded_blocks[..layout.num_luma_blocks()];

    let mb_modes = read_mb_modes(bs, coded_luma, header.frame_type)?;
    let motion_vectors = read_motion_vectors(bs, coded_luma, &mb_modes, header.frame_type)?;

    let n_coded = coded_blocks.iter().filter(|&&coded| coded).count();
    let block_qiis = read_block_qiis(bs, n_coded, header.qis.len())?;

    Ok(FrameBody { coded_blocks, mb_modes, motion_vectors, block_qiis })
}

fn read_coded_blocks(
    bs: &mut BitReaderLtr<'_>,
    layout: &FrameLayout,
    frame_type: FrameType,
) -> Result<Vec<bool>> {
    // All blocks of an intra frame are coded.
    if frame_type == FrameType::Intra {
        return Ok(vec![true; layout.num_blocks()]);
    }

    let sb_blocks = layout.superblock_blocks();

    // A superblock is either partially coded, fully coded, or not coded at all.
    let sb_partial = read_long_run_flags(bs, sb_blocks.len())?;

    let n_not_partial = sb_partial.iter().filter(|&&partial| !partial).count();
    let sb_full = read_long_run_flags(bs, n_not_partial)?;

    // Each block of a partially coded superblock has its own flag.
    let n_partial_blocks = sb_blocks
        .iter()
        .zip(&sb_partial)
        .filter(|(_, &partial)| partial)
        .map(|(&n, _)| usize::from(n))
        .sum();

    let block_flags = read_short_run_flags(bs, n_partial_blocks)?;

    let mut coded_blocks = Vec::with_capacity(layout.num_blocks());

    let mut full = sb_full.iter();
    let mut flags = block_flags.iter();

    for (&n, &partial) in sb_blocks.iter().zip(&sb_partial) {
        if partial {
            coded_blocks.extend(flags.by_ref().take(usize::from(n)));
        }
        else {
            let coded = full.next().copied().unwrap_or_default();
            coded_blocks.extend(std::iter::repeat(coded).take(usize::from(n)));
        }
    }

    Ok(coded_blocks)
}

fn read_mode_rank(bs: &mut BitReaderLtr<'_>) -> Result<usize> {
    // A unary code of at most 7 bits.
    let mut rank = 0;

    while rank < 7 && bs.read_bit()? {
        rank += 1;
    }

    Ok(rank)
}

fn read_mb_modes(
    bs: &mut BitReaderLtr<'_>,
    coded_luma: &[bool],
    frame_type: FrameType,
) -> Result<Vec<CodingMode>> {
    let n_mbs = coded_luma.len() / 4;

    if frame_type == FrameType::Intra {
        return Ok(vec![CodingMode::Intra; n_mbs]);
    }

    let scheme = bs.read_bits_leq32(3)?;

    let alphabet = match scheme {
        0 => {
            // The alphabet is coded as the rank of each mode, in mode order.
            let mut alphabet = [CodingMode::InterNoMv; 8];

            for mode in CODING_MODES {
                alphabet[bs.read_bits_leq32(3)? as usize] = mode;
            }

            alphabet
        }
        1..=6 => MODE_ALPHABETS[scheme as usize - 1].map(|mode| CODING_MODES[usize::from(mode)]),
        _ => CODING_MODES,
    };

    let mut mb_modes = Vec::with_capacity(n_mbs);

    for luma in coded_luma.chunks_exact(4) {
        // A macroblock without a coded luma block has no coded mode.
        let mode = if !luma.iter().any(|&coded| coded) {
            CodingMode::InterNoMv
        }
        else if scheme == RAW_MODE_SCHEME {
            CODING_MODES[bs.read_bits_leq32(3)? as usize]
        }
        else {
            alphabet[read_mode_rank(bs)?]
        };

        mb_modes.push(mode);
    }

    Ok(mb_modes)
}

fn read_motion_vectors(
    bs: &mut BitReaderLtr<'_>,
    coded_luma: &[bool],
    mb_modes: &[CodingMode],
    frame_type: FrameType,
) -> Result<Vec<MotionVector>> {
    let mut mvs = Vec::new();

    if frame_type == FrameType::Intra {
        return Ok(mvs);
    }

    let coding = if bs.read_bit()? { MotionVectorCoding::Raw } else { MotionVectorCoding::Huffman };

    for (mode, luma) in mb_modes.iter().zip(coded_luma.chunks_exact(4)) {
        match mode {
            CodingMode::InterMv | CodingMode::InterGoldenMv => {
                mvs.push(read_motion_vector(bs, coding)?);
            }
            CodingMode::InterMvFour => {
                // One vector for each coded luma block.
                for _ in luma.iter().filter(|&&coded| coded) {
                    mvs.push(read_motion_vector(bs, coding)?);
                }
            }
            _ => (),
        }
    }

    Ok(mvs)
}

fn read_block_qiis(bs: &mut BitReaderLtr<'_>, n_coded: usize, n_qis: usize) -> Result<Vec<u8>> {
    let mut qiis = vec![0u8; n_coded];

    // Each pass refines the blocks that are still at index qii.
    for qii in 0..n_qis.saturating_sub(1) as u8 {
        let n_flags = qiis.iter().filter(|&&q| q == qii).count();

        let flags = read_long_run_flags(bs, n_flags)?;

        for (q, more) in qiis.iter_mut().filter(|q| **q == qii).zip(flags) {
            *q += u8::from(more);
        }
    }

    Ok(qiis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::read_frame_header;
    use crate::ident::read_ident_header;
    use crate::test_util::{ident_header, BitWriter};
    use palisade_core::errors::Error;

    fn layout(mb_width: u16, mb_height: u16) -> FrameLayout {
        let buf = ident_header(mb_width, mb_height, 0);
        let ident = read_ident_header(&mut BitReaderLtr::new(&buf)).unwrap();
        FrameLayout::try_new(&ident, 1 << 22).unwrap()
    }

    fn read(bw: &BitWriter, layout: &FrameLayout) -> Result<FrameBody> {
        let buf = bw.to_bytes();
        let mut bs = BitReaderLtr::new(&buf);
        let header = read_frame_header(&mut bs, false)?;
        read_frame_body(&mut bs, layout, &header)
    }

    #[test]
    fn verify_intra_frame_body() {
        // 2x2 macroblocks: 16 luma blocks and 4 blocks per chroma plane.
        let layout = layout(2, 2);

        let mut bw = BitWriter::new();
        bw.code("0 0").bits(5, 6).code("1").bits(9, 6).code("0 000");
        // Block qi flags for all 24 blocks: a single run of 24 zeros.
        bw.code("0 111110 0110");

        let body = read(&bw, &layout).unwrap();

        assert_eq!(body.coded_blocks, vec![true; 24]);
        assert_eq!(body.mb_modes, vec![CodingMode::Intra; 4]);
        assert!(body.motion_vectors.is_empty());
        assert_eq!(body.num_coded_blocks(), 24);
        assert!(body.block_qiis.iter().all(|&qii| qii == 0));
    }

    #[test]
    fn verify_inter_frame_body() {
        // 1x1 macroblock: superblocks of 4, 1, and 1 blocks.
        let layout = layout(1, 1);

        let mut bw = BitWriter::new();
        bw.code("0 1").bits(20, 6).code("1").bits(30, 6).code("0");
        // Luma superblock is partially coded, chroma superblocks are not: 1 0 0.
        bw.code("1 0 10 0");
        // Cb is not coded, Cr is fully coded: 0 1.
        bw.code("0 0 0");
        // Luma blocks: 1 0 1 1.
        bw.code("1 0 0 0 0 01");
        // Mode scheme 1, rank 7 is INTER_MV_FOUR.
        bw.bits(1, 3).code("1111111");
        // Huffman coded motion vectors for the 3 coded luma blocks.
        bw.code("0").code("001 010").code("000 000").code("1001 0110");
        // Block qi: 4 coded blocks, the last one uses the 2nd index.
        bw.code("0 101 0");

        let body = read(&bw, &layout).unwrap();

        assert_eq!(body.coded_blocks, [true, false, true, true, false, true]);
        assert_eq!(body.mb_modes, [CodingMode::InterMvFour]);
        assert_eq!(
            body.motion_vectors,
            [
                MotionVector { x: 1, y: -1 },
                MotionVector { x: 0, y: 0 },
                MotionVector { x: -3, y: 2 },
            ]
        );
        assert_eq!(body.block_qiis, [0, 0, 0, 1]);
    }

    #[test]
    fn verify_inter_frame_mode_schemes() {
        // 2x1 macroblocks: a single luma superblock of 8 blocks, chroma superblocks of 2 blocks.
        let layout = layout(2, 1);

        // Every superblock is fully coded. Custom alphabet where rank 0 is INTER_GOLDEN_MV.
        let mut bw = BitWriter::new();
        bw.code("0 1").bits(1, 6).code("0");
        bw.code("0 101");
        bw.code("1 101");
        bw.bits(0, 3);
        for rank in [1, 2, 3, 4, 5, 6, 0, 7] {
            bw.bits(rank, 3);
        }
        // Ranks 0 and 3.
        bw.code("0 1110");
        // Raw motion vectors for both macroblocks.
        bw.code("1").bits(3, 5).code("1").bits(4, 5).code("0");
        bw.bits(31, 5).code("0").bits(0, 5).code("0");

        let body = read(&bw, &layout).unwrap();

        assert_eq!(body.mb_modes, [CodingMode::InterGoldenMv, CodingMode::InterMv]);
        assert_eq!(
            body.motion_vectors,
            [MotionVector { x: -3, y: 4 }, MotionVector { x: 31, y: 0 }]
        );

        // Raw modes, and a macroblock without coded luma blocks.
        let mut bw = BitWriter::new();
        bw.code("0 1").bits(1, 6).code("0");
        // Luma superblock is partially coded.
        bw.code("1 0 100");
        // Chroma superblocks are not coded.
        bw.code("0 10 0");
        // Only the second macroblock has coded luma blocks: 0000 1111.
        bw.code("0 101 101");
        bw.bits(7, 3).bits(1, 3);
        bw.code("0");

        let body = read(&bw, &layout).unwrap();

        assert_eq!(body.mb_modes, [CodingMode::InterNoMv, CodingMode::Intra]);
        assert!(body.motion_vectors.is_empty());
        assert_eq!(body.num_coded_blocks(), 4);
    }

    #[test]
    fn verify_inter_frame_body_rejects() {
        let layout = layout(1, 1);

        // The partially coded superblock flags overshoot the 3 superblocks.
        let mut bw = BitWriter::new();
        bw.code("0 1").bits(20, 6).code("0");
        bw.code("1 1110 00");

        assert_eq!(
            read(&bw, &layout),
            Err(Error::UnknownContentType("theora: run length exceeds flag count"))
        );

        // The payload ends inside a custom mode alphabet.
        let mut bw = BitWriter::new();
        bw.code("0 1").bits(20, 6).code("0");
        bw.code("0 101");
        bw.code("1 101");
        bw.bits(0, 3).bits(0, 3);

        assert!(matches!(read(&bw, &layout), Err(Error::Truncation(_))));
    }
}
