// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use palisade_core::errors::{unknown_content_error, Result};
use palisade_core::io::{BitReaderLtr, FiniteBitStream, ReadBitsLtr};

use log::debug;

use crate::common::*;

/// The only supported major version.
const THEORA_VERSION_MAJOR: u32 = 3;
/// The only supported minor version.
const THEORA_VERSION_MINOR: u32 = 2;
/// The maximum supported revision.
const THEORA_VERSION_REVISION_MAX: u32 = 1;

/// The color space of the decoded frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Undefined,
    Rec470M,
    Rec470BG,
}

/// The chroma subsampling of the decoded frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Chroma is subsampled by 2 both horizontally and vertically.
    Yuv420,
    /// Chroma is subsampled by 2 horizontally.
    Yuv422,
    /// No chroma subsampling.
    Yuv444,
}

/// The Theora identification header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub version_revision: u8,
    /// Frame width in macroblocks (FMBW).
    pub frame_mb_width: u16,
    /// Frame height in macroblocks (FMBH).
    pub frame_mb_height: u16,
    /// Picture region width in pixels (PICW).
    pub pic_width: u32,
    /// Picture region height in pixels (PICH).
    pub pic_height: u32,
    /// Picture region X offset in pixels (PICX).
    pub pic_x: u8,
    /// Picture region Y offset in pixels (PICY).
    pub pic_y: u8,
    pub frame_rate_num: u32,
    pub frame_rate_den: u32,
    pub aspect_num: u32,
    pub aspect_den: u32,
    pub color_space: ColorSpace,
    pub nominal_bitrate: u32,
    pub quality: u8,
    pub keyframe_granule_shift: u8,
    pub pixel_format: PixelFormat,
}

impl IdentHeader {
    /// Gets the coded frame width in pixels.
    pub fn frame_width(&self) -> u32 {
        u32::from(self.frame_mb_width) << 4
    }

    /// Gets the coded frame height in pixels.
    pub fn frame_height(&self) -> u32 {
        u32::from(self.frame_mb_height) << 4
    }
}

/// Reads and validates an identification header packet.
pub fn read_ident_header(bs: &mut BitReaderLtr<'_>) -> Result<IdentHeader> {
    // The packet type must be an identification header.
    read_header_prefix(bs, THEORA_PACKET_TYPE_IDENTIFICATION)?;

    // Only Theora 3.2.x, with a revision no greater than 1, is defined.
    let version_major = bs.read_bits_leq32(8)?;

    if version_major != THEORA_VERSION_MAJOR {
        debug!("theora: major version {}", version_major);
        return unknown_content_error("theora: unsupported major version");
    }

    let version_minor = bs.read_bits_leq32(8)?;

    if version_minor != THEORA_VERSION_MINOR {
        debug!("theora: minor version {}", version_minor);
        return unknown_content_error("theora: unsupported minor version");
    }

    let version_revision = bs.read_bits_leq32(8)?;

    if version_revision > THEORA_VERSION_REVISION_MAX {
        debug!("theora: version revision {}", version_revision);
        return unknown_content_error("theora: unsupported version revision");
    }

    // The frame dimensions, in macroblocks, must be non-zero.
    let frame_mb_width = bs.read_bits_leq32(16)?;

    if frame_mb_width == 0 {
        return unknown_content_error("theora: frame width cannot be 0");
    }

    let frame_mb_height = bs.read_bits_leq32(16)?;

    if frame_mb_height == 0 {
        return unknown_content_error("theora: frame height cannot be 0");
    }

    let frame_width = i64::from(frame_mb_width) * 16;
    let frame_height = i64::from(frame_mb_height) * 16;

    // The picture region must fit inside the coded frame.
    let pic_width = bs.read_bits_leq32(24)?;

    if i64::from(pic_width) > frame_width {
        debug!("theora: picture width {} exceeds frame width {}", pic_width, frame_width);
        return unknown_content_error("theora: picture width exceeds frame width");
    }

    let pic_height = bs.read_bits_leq32(24)?;

    if i64::from(pic_height) > frame_height {
        debug!("theora: picture height {} exceeds frame height {}", pic_height, frame_height);
        return unknown_content_error("theora: picture height exceeds frame height");
    }

    let pic_x = bs.read_bits_leq32(8)?;

    if i64::from(pic_x) > frame_width - i64::from(pic_x) {
        debug!("theora: picture x offset {} for frame width {}", pic_x, frame_width);
        return unknown_content_error("theora: picture x offset out-of-bounds");
    }

    let pic_y = bs.read_bits_leq32(8)?;

    if i64::from(pic_y) > frame_height - i64::from(pic_y) {
        debug!("theora: picture y offset {} for frame height {}", pic_y, frame_height);
        return unknown_content_error("theora: picture y offset out-of-bounds");
    }

    // The frame rate must be a valid, non-zero, fraction.
    let frame_rate_num = bs.read_bits_leq32(32)?;

    if frame_rate_num == 0 {
        return unknown_content_error("theora: frame rate numerator cannot be 0");
    }

    let frame_rate_den = bs.read_bits_leq32(32)?;

    if frame_rate_den == 0 {
        return unknown_content_error("theora: frame rate denominator cannot be 0");
    }

    // A zero pixel aspect ratio means unknown, and is allowed.
    let aspect_num = bs.read_bits_leq32(24)?;
    let aspect_den = bs.read_bits_leq32(24)?;

    let color_space = match bs.read_bits_leq32(8)? {
        0 => ColorSpace::Undefined,
        1 => ColorSpace::Rec470M,
        2 => ColorSpace::Rec470BG,
        cs => {
            debug!("theora: color space {}", cs);
            return unknown_content_error("theora: reserved color space");
        }
    };

    let nominal_bitrate = bs.read_bits_leq32(24)?;
    let quality = bs.read_bits_leq32(6)?;
    let keyframe_granule_shift = bs.read_bits_leq32(5)?;

    let pixel_format = match bs.read_bits_leq32(2)? {
        0 => PixelFormat::Yuv420,
        2 => PixelFormat::Yuv422,
        3 => PixelFormat::Yuv444,
        _ => return unknown_content_error("theora: reserved pixel format"),
    };

    if bs.read_bits_leq32(3)? != 0 {
        return unknown_content_error("theora: reserved bits must be 0");
    }

    if bs.bits_left() > 0 {
        debug!("theora: {} trailing bits after identification header", bs.bits_left());
    }

    Ok(IdentHeader {
        version_major: version_major as u8,
        version_minor: version_minor as u8,
        version_revision: version_revision as u8,
        frame_mb_width: frame_mb_width as u16,
        frame_mb_height: frame_mb_height as u16,
        pic_width,
        pic_height,
        pic_x: pic_x as u8,
        pic_y: pic_y as u8,
        frame_rate_num,
        frame_rate_den,
        aspect_num,
        aspect_den,
        color_space,
        nominal_bitrate,
        quality: quality as u8,
        keyframe_granule_shift: keyframe_granule_shift as u8,
        pixel_format,
    })
}
