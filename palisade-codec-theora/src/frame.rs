// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use palisade_core::errors::{data_filter_error, Result};
use palisade_core::io::{BitReaderLtr, ReadBitsLtr};

use smallvec::SmallVec;

/// The maximum number of quantization indices a frame may use.
const MAX_QIS: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameType {
    /// A keyframe. Every block is coded without prediction from other frames.
    Intra,
    /// A frame predicted from the previous frame or the last keyframe.
    Inter,
}

/// A frame header (Theora I specification, section 7.1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub frame_type: FrameType,
    /// The quantization indices of the frame (QIS). There are between 1 and 3.
    pub qis: SmallVec<[u8; MAX_QIS]>,
}

/// Reads and validates the header of a frame packet. If `keyframe_only` is set, the frame must be
/// an intra frame.
pub fn read_frame_header(bs: &mut BitReaderLtr<'_>, keyframe_only: bool) -> Result<FrameHeader> {
    // The first bit must be 0 to indicate a data packet.
    if bs.read_bit()? {
        return data_filter_error("theora: not a data packet");
    }

    let frame_type = if bs.read_bit()? { FrameType::Inter } else { FrameType::Intra };

    if keyframe_only && frame_type != FrameType::Intra {
        return data_filter_error("theora: first frame must be an intra frame");
    }

    // Each quantization index is followed by a flag indicating if another follows, except the
    // last possible one.
    let mut qis = SmallVec::new();

    loop {
        qis.push(bs.read_bits_leq32(6)? as u8);

        if qis.len() == MAX_QIS || !bs.read_bit()? {
            break;
        }
    }

    if frame_type == FrameType::Intra && bs.read_bits_leq32(3)? != 0 {
        return data_filter_error("theora: reserved frame header bits must be 0");
    }

    Ok(FrameHeader { frame_type, qis })
}
