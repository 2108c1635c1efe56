// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `packet` module defines the packet structure.

/// A `Packet` contains the complete payload of one logical packet of an elementary stream, as
/// delivered by the container demultiplexer.
///
/// A packet is immutable. A filter either forwards the packet it was given, forwards a replacement
/// packet it synthesized, or rejects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// The packet data buffer.
    data: Box<[u8]>,
}

impl Packet {
    /// Create a new `Packet` from a payload.
    pub fn new(data: impl Into<Box<[u8]>>) -> Self {
        Packet { data: data.into() }
    }

    /// Get an immutable slice to the packet buffer.
    pub fn buf(&self) -> &[u8] {
        &self.data
    }

    /// Get the length of the packet payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the packet has no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Packet {
    fn from(data: Vec<u8>) -> Self {
        Packet::new(data)
    }
}

impl From<&[u8]> for Packet {
    fn from(data: &[u8]) -> Self {
        Packet::new(data)
    }
}
