// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run-length coded flag strings (Theora I specification, sections 7.2.1 and 7.2.2).
//!
//! A flag string is coded as a sequence of runs of identical flags. The value of the first run is
//! coded explicitly. Each following run has the opposite value of the run before it.

use palisade_core::errors::{unknown_content_error, Result};
use palisade_core::io::{BitReaderLtr, ReadBitsLtr};

/// A run-length prefix code.
struct RunCode {
    /// The prefix length in bits.
    len: u32,
    /// The prefix.
    code: u32,
    /// The shortest run length coded with this prefix.
    start: u32,
    /// The number of bits of run length offset that follow the prefix.
    offset_bits: u32,
}

const fn run_code(len: u32, code: u32, start: u32, offset_bits: u32) -> RunCode {
    RunCode { len, code, start, offset_bits }
}

const LONG_RUN_CODES: [RunCode; 7] = [
    run_code(1, 0b0, 1, 0),
    run_code(2, 0b10, 2, 1),
    run_code(3, 0b110, 4, 1),
    run_code(4, 0b1110, 6, 2),
    run_code(5, 0b11110, 10, 3),
    run_code(6, 0b111110, 18, 4),
    run_code(6, 0b111111, 34, 12),
];

const SHORT_RUN_CODES: [RunCode; 6] = [
    run_code(1, 0b0, 1, 1),
    run_code(2, 0b10, 3, 1),
    run_code(3, 0b110, 5, 1),
    run_code(4, 0b1110, 7, 2),
    run_code(5, 0b11110, 11, 2),
    run_code(5, 0b11111, 15, 4),
];

/// The longest run a long-run code can express. A run of this length is not followed by an
/// implicit flag change. Instead, the value of the next run is coded explicitly.
const MAX_LONG_RUN: u32 = 4129;

/// The number of bits scanned for a run-length prefix before giving up.
const MAX_PREFIX_SCAN: u32 = 7;

fn read_run_length(bs: &mut BitReaderLtr<'_>, codes: &[RunCode]) -> Result<u32> {
    let mut code = 0;

    for len in 1..=MAX_PREFIX_SCAN {
        code = (code << 1) | u32::from(bs.read_bit()?);

        if let Some(rc) = codes.iter().find(|rc| rc.len == len && rc.code == code) {
            return Ok(rc.start + bs.read_bits_leq32(rc.offset_bits)?);
        }
    }

    unknown_content_error("theora: invalid run length code")
}

fn read_runs(
    bs: &mut BitReaderLtr<'_>,
    n_flags: usize,
    codes: &[RunCode],
    max_run: Option<u32>,
) -> Result<Vec<bool>> {
    let mut flags = Vec::with_capacity(n_flags);

    if n_flags == 0 {
        return Ok(flags);
    }

    let mut flag = bs.read_bit()?;

    loop {
        let run = read_run_length(bs, codes)?;

        if run as usize > n_flags - flags.len() {
            return unknown_content_error("theora: run length exceeds flag count");
        }

        flags.resize(flags.len() + run as usize, flag);

        if flags.len() == n_flags {
            break;
        }

        flag = if Some(run) == max_run { bs.read_bit()? } else { !flag };
    }

    Ok(flags)
}

/// Reads exactly `n_flags` flags coded with long runs.
pub fn read_long_run_flags(bs: &mut BitReaderLtr<'_>, n_flags: usize) -> Result<Vec<bool>> {
    read_runs(bs, n_flags, &LONG_RUN_CODES, Some(MAX_LONG_RUN))
}

/// Reads exactly `n_flags` flags coded with short runs.
pub fn read_short_run_flags(bs: &mut BitReaderLtr<'_>, n_flags: usize) -> Result<Vec<bool>> {
    read_runs(bs, n_flags, &SHORT_RUN_CODES, None)
}
