// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.
//!
//! Every error is terminal for the elementary stream that produced it. A filter never recovers from
//! an error, and the caller must reject the entire stream.

use std::error;
use std::fmt;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by Palisade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Fewer bits or bytes remained in the packet than a field declares or requires. This is the
    /// only error that means the packet itself was incomplete rather than semantically invalid.
    Truncation(&'static str),
    /// A field held a value outside of the set the codec specification allows. For example, a
    /// version mismatch, bad magic, a non-zero reserved field, an out-of-range count, or a
    /// malformed code table.
    UnknownContentType(&'static str),
    /// A data packet violated the structure required of frame data. For example, an empty packet,
    /// a header packet where a data packet was expected, or non-zero reserved bits.
    DataFilter(&'static str),
    /// A default or user-defined limit was reached while validating the stream. Limits are used to
    /// prevent denial-of-service attacks from malicious streams.
    LimitError(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Truncation(msg) => {
                write!(f, "truncated packet: {}", msg)
            }
            Error::UnknownContentType(msg) => {
                write!(f, "unknown content type: {}", msg)
            }
            Error::DataFilter(msg) => {
                write!(f, "invalid data packet: {}", msg)
            }
            Error::LimitError(constraint) => {
                write!(f, "limit reached: {}", constraint)
            }
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a truncation error.
pub fn truncation_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::Truncation(desc))
}

/// Convenience function to create an unknown content type error.
pub fn unknown_content_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::UnknownContentType(desc))
}

/// Convenience function to create a data filter error.
pub fn data_filter_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::DataFilter(desc))
}

/// Convenience function to create a limit error.
pub fn limit_error<T>(constraint: &'static str) -> Result<T> {
    Err(Error::LimitError(constraint))
}
