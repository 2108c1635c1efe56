// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::min;

use palisade_core::errors::{limit_error, Result};

use log::debug;

use crate::ident::{IdentHeader, PixelFormat};

/// The block partitioning of a coded frame.
///
/// Each color plane is divided into 8x8 pixel blocks, and blocks are grouped into superblocks of
/// up to 4x4 blocks. Superblocks along the right and top edges of a plane may be clipped. In coded
/// order, all luma superblocks come first, followed by those of the Cb plane, and then those of
/// the Cr plane. Within a superblock, the blocks of a macroblock are consecutive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    /// The number of blocks in each superblock, in coded order.
    sb_blocks: Vec<u8>,
    /// The number of luma blocks.
    n_luma_blocks: usize,
    /// The number of blocks in all planes.
    n_blocks: usize,
}

impl FrameLayout {
    /// Computes the layout of the frames described by an identification header. Fails if a frame
    /// contains more than `max_blocks` blocks.
    pub fn try_new(ident: &IdentHeader, max_blocks: usize) -> Result<Self> {
        let mb_width = u64::from(ident.frame_mb_width);
        let mb_height = u64::from(ident.frame_mb_height);

        // Plane dimensions in blocks.
        let luma = (2 * mb_width, 2 * mb_height);

        let chroma = match ident.pixel_format {
            PixelFormat::Yuv420 => (mb_width, mb_height),
            PixelFormat::Yuv422 => (mb_width, 2 * mb_height),
            PixelFormat::Yuv444 => (2 * mb_width, 2 * mb_height),
        };

        let n_luma_blocks = luma.0 * luma.1;
        let n_blocks = n_luma_blocks + 2 * chroma.0 * chroma.1;

        if n_blocks > max_blocks as u64 {
            debug!("theora: frame has {} blocks, limit is {}", n_blocks, max_blocks);
            return limit_error("theora: frame block count exceeds limit");
        }

        let mut sb_blocks = Vec::new();

        for (width, height) in [luma, chroma, chroma] {
            push_plane_superblocks(&mut sb_blocks, width as usize, height as usize);
        }

        Ok(FrameLayout {
            sb_blocks,
            n_luma_blocks: n_luma_blocks as usize,
            n_blocks: n_blocks as usize,
        })
    }

    /// Gets the number of blocks in each superblock, in coded order.
    pub fn superblock_blocks(&self) -> &[u8] {
        &self.sb_blocks
    }

    pub fn num_superblocks(&self) -> usize {
        self.sb_blocks.len()
    }

    pub fn num_blocks(&self) -> usize {
        self.n_blocks
    }

    /// Gets the number of luma blocks. Luma blocks come first in coded order.
    pub fn num_luma_blocks(&self) -> usize {
        self.n_luma_blocks
    }

    /// Gets the number of macroblocks. Macroblock `i` owns luma blocks `4 * i` through `4 * i + 3`
    /// in coded order.
    pub fn num_macroblocks(&self) -> usize {
        self.n_luma_blocks / 4
    }
}

fn push_plane_superblocks(sb_blocks: &mut Vec<u8>, width: usize, height: usize) {
    let sb_width = (width + 3) / 4;
    let sb_height = (height + 3) / 4;

    sb_blocks.reserve(sb_width * sb_height);

    for sby in 0..sb_height {
        for sbx in 0..sb_width {
            let w = min(4, width - 4 * sbx);
            let h = min(4, height - 4 * sby);
            sb_blocks.push((w * h) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::read_ident_header;
    use crate::test_util::ident_header;
    use palisade_core::errors::Error;
    use palisade_core::io::BitReaderLtr;

    fn layout(mb_width: u16, mb_height: u16, pixel_format: u32) -> Result<FrameLayout> {
        let buf = ident_header(mb_width, mb_height, pixel_format);
        let ident = read_ident_header(&mut BitReaderLtr::new(&buf))?;
        FrameLayout::try_new(&ident, 1 << 22)
    }

    #[test]
    fn verify_layout_420() {
        // Luma is 6x4 blocks: superblocks of 16 and 8 blocks. Chroma is 3x2 blocks: one superblock
        // of 6 blocks per plane.
        let layout = layout(3, 2, 0).unwrap();

        assert_eq!(layout.superblock_blocks(), &[16, 8, 6, 6]);
        assert_eq!(layout.num_blocks(), 24 + 6 + 6);
        assert_eq!(layout.num_luma_blocks(), 24);
        assert_eq!(layout.num_macroblocks(), 6);
    }

    #[test]
    fn verify_layout_422_444() {
        // Luma is 2x6 blocks: superblocks of 8 and 4 blocks.
        let yuv422 = layout(1, 3, 2).unwrap();
        assert_eq!(yuv422.superblock_blocks(), &[8, 4, 4, 2, 4, 2]);
        assert_eq!(yuv422.num_blocks(), 12 + 6 + 6);

        let yuv444 = layout(1, 3, 3).unwrap();
        assert_eq!(yuv444.superblock_blocks(), &[8, 4, 8, 4, 8, 4]);
        assert_eq!(yuv444.num_macroblocks(), 3);
    }

    #[test]
    fn verify_layout_block_counts() {
        for (mbw, mbh) in [(1, 1), (5, 7), (16, 9), (40, 30), (121, 68)] {
            for pf in [0, 2, 3] {
                let layout = layout(mbw, mbh, pf).unwrap();
                let total: usize = layout.superblock_blocks().iter().map(|&n| usize::from(n)).sum();
                assert_eq!(total, layout.num_blocks());
                assert_eq!(layout.num_macroblocks(), usize::from(mbw) * usize::from(mbh));
            }
        }
    }

    #[test]
    fn verify_layout_limit() {
        let buf = ident_header(1024, 1024, 3);
        let ident = read_ident_header(&mut BitReaderLtr::new(&buf)).unwrap();

        assert_eq!(
            FrameLayout::try_new(&ident, 1 << 22),
            Err(Error::LimitError("theora: frame block count exceeds limit"))
        );

        // 2048 x 2048 blocks in each of the three planes.
        assert!(FrameLayout::try_new(&ident, 3 << 22).is_ok());
    }
}
