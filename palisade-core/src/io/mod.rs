// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module implements bit-level reading of packet payloads.
//!
//! A [`BitReaderLtr`] consumes a `&[u8]` holding exactly one packet. Every read is bounds
//! checked, and running off the end of the packet always produces [`Error::Truncation`].
//!
//! Readers operating on bits implement the [`ReadBitsLtr`] trait, and consume bits from the
//! most-significant to the least-significant bit of each byte.
//!
//! [`Error::Truncation`]: crate::errors::Error::Truncation

mod bit;

pub use bit::*;
