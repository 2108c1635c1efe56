// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `filters` module provides the traits and support structures necessary to implement packet
//! filters.

use crate::errors::Result;
use crate::packet::Packet;

/// `FilterOptions` is a common set of options that all packet filters use.
#[derive(Copy, Clone, Debug)]
pub struct FilterOptions {
    /// In addition to the per-frame header, validate the frame-level side information that
    /// precedes the entropy coded coefficients (for example coded block flags, coding modes, and
    /// motion vectors). Default: `true`.
    pub verify_frame_body: bool,
    /// The maximum number of blocks a single frame may contain for its body to be validated.
    /// Streams that declare a larger frame are rejected when `verify_frame_body` is set.
    /// Default: `4194304`.
    ///
    /// Note: Frame body validation allocates a small amount of memory per block. This limit bounds
    /// that memory for streams that declare very large frames.
    pub max_frame_blocks: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions { verify_frame_body: true, max_frame_blocks: 1 << 22 }
    }
}

/// A `PacketFilter` validates the packets of one elementary stream, in stream order.
///
/// A filter is stateful: each packet is checked against what the codec specification allows at
/// that position in the stream. Any error is terminal. Once `parse` has failed, the caller must
/// reject the entire stream, and the filter will reject every further packet.
///
/// A filter must be owned by exactly one stream. Filters for concurrently processed streams are
/// independent instances.
pub trait PacketFilter: Send {
    /// Attempts to instantiate a `PacketFilter` using the provided `FilterOptions`.
    fn try_new(options: &FilterOptions) -> Result<Self>
    where
        Self: Sized;

    /// Gets a short name for the codec this filter validates.
    fn name(&self) -> &'static str;

    /// Validates the next packet of the stream.
    ///
    /// On success, returns the packet that should be forwarded downstream. This is usually the
    /// packet that was passed in, but a filter may substitute a sanitized replacement.
    fn parse(&mut self, packet: Packet) -> Result<Packet>;
}

#[cfg(test)]
mod tests {
    use super::FilterOptions;

    #[test]
    fn verify_filter_options_default() {
        let options = FilterOptions::default();

        assert!(options.verify_frame_body);
        assert_eq!(options.max_frame_blocks, 4_194_304);
    }
}
