// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The comment header carries free-form text that is never forwarded. It is parsed in full, so
//! that a malformed header still rejects the stream, and then replaced by an empty comment header.

use palisade_core::errors::Result;
use palisade_core::io::{BitReaderLtr, FiniteBitStream, ReadBitsLtr};

use log::debug;

use crate::common::*;

/// The length of a comment header with an empty vendor string and no comments.
pub const EMPTY_COMMENT_HEADER_LEN: usize = THEORA_HEADER_PREFIX_LEN + 8;

/// Reads and validates a comment header packet. Returns the payload of an empty comment header
/// that should be forwarded in its place.
pub fn read_comment_header(bs: &mut BitReaderLtr<'_>) -> Result<Vec<u8>> {
    let prefix = read_header_prefix(bs, THEORA_PACKET_TYPE_COMMENT)?;

    // The vendor string.
    let vendor_len = bs.read_u32_le()?;
    bs.ignore_bytes(u64::from(vendor_len))?;

    // The user comments. Each length is checked against the remaining payload before the comment
    // is skipped.
    let n_comments = bs.read_u32_le()?;

    let mut text_len = u64::from(vendor_len);

    for _ in 0..n_comments {
        let comment_len = bs.read_u32_le()?;
        bs.ignore_bytes(u64::from(comment_len))?;
        text_len += u64::from(comment_len);
    }

    debug!(
        "theora: discarding comment header with {} comments and {} bytes of text",
        n_comments, text_len
    );

    if bs.bits_left() > 0 {
        debug!("theora: {} trailing bits after comment header", bs.bits_left());
    }

    // Vendor string length and comment count are both 0.
    let mut buf = Vec::with_capacity(EMPTY_COMMENT_HEADER_LEN);
    buf.extend_from_slice(&prefix);
    buf.extend_from_slice(&[0; 8]);

    Ok(buf)
}
