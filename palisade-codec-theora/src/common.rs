// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use palisade_core::errors::{unknown_content_error, Result};
use palisade_core::io::{BitReaderLtr, ReadBitsLtr};

use log::debug;

/// The packet type for an identification header.
pub const THEORA_PACKET_TYPE_IDENTIFICATION: u8 = 0x80;
/// The packet type for a comment header.
pub const THEORA_PACKET_TYPE_COMMENT: u8 = 0x81;
/// The packet type for a setup header.
pub const THEORA_PACKET_TYPE_SETUP: u8 = 0x82;

/// The common header packet signature.
pub const THEORA_HEADER_PACKET_SIGNATURE: &[u8; 6] = b"theora";

/// The length of the packet type and signature that prefix every header packet.
pub const THEORA_HEADER_PREFIX_LEN: usize = 7;

/// Reads the packet type and signature common to all header packets, and checks that the packet
/// type matches `packet_type`. Returns the raw prefix bytes.
pub fn read_header_prefix(
    bs: &mut BitReaderLtr<'_>,
    packet_type: u8,
) -> Result<[u8; THEORA_HEADER_PREFIX_LEN]> {
    let mut prefix = [0; THEORA_HEADER_PREFIX_LEN];
    bs.read_buf_exact(&mut prefix)?;

    if prefix[0] != packet_type {
        debug!("theora: expected header packet type {:#x}, got {:#x}", packet_type, prefix[0]);
        return unknown_content_error("theora: invalid packet type for header");
    }

    if prefix[1..] != THEORA_HEADER_PACKET_SIGNATURE[..] {
        return unknown_content_error("theora: invalid header signature");
    }

    Ok(prefix)
}
