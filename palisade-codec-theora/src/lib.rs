// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Palisade crates. Please see the workspace Cargo.toml for
// their justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

//! A fail-closed validator for Theora video streams.
//!
//! [`TheoraFilter`] checks each packet of a Theora elementary stream against the Theora I
//! specification, in stream order. Packets that pass are forwarded, except for the comment header,
//! which is replaced by an empty comment header. The first packet that fails rejects the stream.

use palisade_core::errors::{data_filter_error, unknown_content_error, Result};
use palisade_core::filters::{FilterOptions, PacketFilter};
use palisade_core::io::{BitReaderLtr, FiniteBitStream};
use palisade_core::packet::Packet;

use log::{debug, trace, warn};

mod body;
mod comment;
mod common;
mod frame;
mod huffman;
mod ident;
mod layout;
mod mv;
mod runs;
mod setup;

#[cfg(test)]
mod test_util;

pub use body::{CodingMode, FrameBody};
pub use frame::{FrameHeader, FrameType};
pub use huffman::{HuffmanEntry, HuffmanTable};
pub use ident::{ColorSpace, IdentHeader, PixelFormat};
pub use layout::FrameLayout;
pub use mv::MotionVector;
pub use setup::{QuantRanges, SetupHeader};

use body::read_frame_body;
use comment::read_comment_header;
use frame::read_frame_header;
use ident::read_ident_header;
use setup::read_setup_header;

/// The position of a [`TheoraFilter`] in the stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterState {
    /// The next packet must be the identification header.
    AwaitingIdentification,
    /// The next packet must be the comment header.
    AwaitingComment,
    /// The next packet must be the setup header.
    AwaitingSetup,
    /// The next packet must be the first frame, which is an intra frame.
    AwaitingIntraFrame,
    /// The next packet must be a frame of either type.
    AwaitingInterFrame,
}

/// Theora packet filter.
pub struct TheoraFilter {
    options: FilterOptions,
    state: FilterState,
    ident: Option<IdentHeader>,
    setup: Option<SetupHeader>,
    /// The frame layout, if frame bodies are verified.
    layout: Option<FrameLayout>,
    /// Set once any packet has been rejected.
    rejected: bool,
}

impl TheoraFilter {
    /// Gets the position of the filter in the stream.
    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Gets the identification header, once it has been accepted.
    pub fn ident(&self) -> Option<&IdentHeader> {
        self.ident.as_ref()
    }

    /// Gets the setup header, once it has been accepted.
    pub fn setup(&self) -> Option<&SetupHeader> {
        self.setup.as_ref()
    }

    /// Returns `true` if the stream has been rejected.
    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    fn parse_inner(&mut self, packet: Packet) -> Result<Packet> {
        match self.state {
            FilterState::AwaitingIdentification => {
                let ident = read_ident_header(&mut BitReaderLtr::new(packet.buf()))?;

                // The layout is only needed to verify frame bodies.
                if self.options.verify_frame_body {
                    let layout = FrameLayout::try_new(&ident, self.options.max_frame_blocks)?;
                    self.layout = Some(layout);
                }

                debug!(
                    "theora: {}x{} frame, {}x{} picture at ({}, {}), {:?}, {}/{} fps",
                    ident.frame_width(),
                    ident.frame_height(),
                    ident.pic_width,
                    ident.pic_height,
                    ident.pic_x,
                    ident.pic_y,
                    ident.pixel_format,
                    ident.frame_rate_num,
                    ident.frame_rate_den,
                );

                self.ident = Some(ident);
                self.state = FilterState::AwaitingComment;

                Ok(packet)
            }
            FilterState::AwaitingComment => {
                let buf = read_comment_header(&mut BitReaderLtr::new(packet.buf()))?;

                self.state = FilterState::AwaitingSetup;

                Ok(Packet::new(buf))
            }
            FilterState::AwaitingSetup => {
                let setup = read_setup_header(&mut BitReaderLtr::new(packet.buf()))?;

                self.setup = Some(setup);
                self.state = FilterState::AwaitingIntraFrame;

                Ok(packet)
            }
            FilterState::AwaitingIntraFrame => {
                self.read_frame(packet.buf(), true)?;
                self.state = FilterState::AwaitingInterFrame;

                Ok(packet)
            }
            FilterState::AwaitingInterFrame => {
                self.read_frame(packet.buf(), false)?;

                Ok(packet)
            }
        }
    }

    fn read_frame(&self, buf: &[u8], keyframe_only: bool) -> Result<()> {
        if buf.is_empty() {
            return data_filter_error("theora: empty packet");
        }

        let mut bs = BitReaderLtr::new(buf);

        let header = read_frame_header(&mut bs, keyframe_only)?;

        match &self.layout {
            Some(layout) => {
                let body = read_frame_body(&mut bs, layout, &header)?;

                trace!(
                    "theora: {:?} frame, {} coded blocks, {} motion vectors, {} bits of tokens",
                    header.frame_type,
                    body.num_coded_blocks(),
                    body.motion_vectors.len(),
                    bs.bits_left()
                );
            }
            None => trace!("theora: {:?} frame, qis {:?}", header.frame_type, header.qis),
        }

        Ok(())
    }
}

impl PacketFilter for TheoraFilter {
    fn try_new(options: &FilterOptions) -> Result<Self> {
        Ok(TheoraFilter {
            options: *options,
            state: FilterState::AwaitingIdentification,
            ident: None,
            setup: None,
            layout: None,
            rejected: false,
        })
    }

    fn name(&self) -> &'static str {
        "theora"
    }

    fn parse(&mut self, packet: Packet) -> Result<Packet> {
        if self.rejected {
            warn!("theora: packet received after the stream was rejected");
            return unknown_content_error("theora: stream already rejected");
        }

        let result = self.parse_inner(packet);

        if let Err(err) = &result {
            warn!("theora: rejecting stream in state {:?}: {}", self.state, err);
            self.rejected = true;
        }

        result
    }
}
