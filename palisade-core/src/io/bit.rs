// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::min;

use crate::errors::{truncation_error, Result};

fn end_of_bitstream_error<T>() -> Result<T> {
    truncation_error("unexpected end of bitstream")
}

mod private {
    use crate::errors::Result;

    pub trait FetchBitsLtr {
        /// Discard any remaining bits in the source and fetch new bits.
        fn fetch_bits(&mut self) -> Result<()>;

        /// Get all the bits in the source.
        fn get_bits(&self) -> u64;

        /// Get the number of bits left in the source.
        fn num_bits_left(&self) -> u32;

        /// Consume `num` bits from the source.
        fn consume_bits(&mut self, num: u32);
    }
}

/// A `FiniteBitStream` is a bit stream that has a known length in bits.
pub trait FiniteBitStream {
    /// Gets the number of bits left unread.
    fn bits_left(&self) -> u64;

    /// Gets the number of bits consumed so far.
    fn bits_read(&self) -> u64;
}

/// `ReadBitsLtr` reads bits from most-significant to least-significant.
pub trait ReadBitsLtr: private::FetchBitsLtr + FiniteBitStream {
    /// Ignores the specified number of bits from the stream or returns an error.
    ///
    /// The length is checked against the bits remaining before anything is consumed.
    fn ignore_bits(&mut self, mut num_bits: u64) -> Result<()> {
        if num_bits > self.bits_left() {
            return end_of_bitstream_error();
        }

        // Consume whole bit caches directly.
        while num_bits > u64::from(self.num_bits_left()) {
            num_bits -= u64::from(self.num_bits_left());
            self.fetch_bits()?;
        }

        if num_bits > 0 {
            // Shift out in two parts to prevent panicing when num_bits == 64.
            let num_bits = num_bits as u32;
            self.consume_bits(num_bits - 1);
            self.consume_bits(1);
        }

        Ok(())
    }

    /// Ignores the specified number of whole bytes from the stream or returns an error.
    #[inline(always)]
    fn ignore_bytes(&mut self, num_bytes: u64) -> Result<()> {
        match num_bytes.checked_mul(8) {
            Some(num_bits) => self.ignore_bits(num_bits),
            None => end_of_bitstream_error(),
        }
    }

    /// Read a single bit as a boolean value or returns an error.
    #[inline(always)]
    fn read_bit(&mut self) -> Result<bool> {
        if self.num_bits_left() < 1 {
            self.fetch_bits()?;
        }

        let bit = self.get_bits() & (1 << 63) != 0;

        self.consume_bits(1);
        Ok(bit)
    }

    /// Reads up-to 32-bits, most-significant bit first, and returns them as an unsigned integer or
    /// returns an error. Reading 0 bits always succeeds, returns 0, and consumes nothing.
    #[inline(always)]
    fn read_bits_leq32(&mut self, mut bit_width: u32) -> Result<u32> {
        debug_assert!(bit_width <= u32::BITS);

        // Shift in two 32-bit operations instead of a single 64-bit operation to avoid panicing
        // when bit_width == 0 (and thus shifting right 64-bits).
        let mut bits = (self.get_bits() >> u32::BITS) >> (u32::BITS - bit_width);

        while bit_width > self.num_bits_left() {
            bit_width -= self.num_bits_left();

            self.fetch_bits()?;

            // Unlike the first shift, bit_width is always > 0 here so this operation will never
            // shift by > 63 bits.
            bits |= self.get_bits() >> (u64::BITS - bit_width);
        }

        self.consume_bits(bit_width);

        Ok(bits as u32)
    }

    /// Reads a single byte or returns an error.
    #[inline(always)]
    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bits_leq32(8)? as u8)
    }

    /// Reads four bytes and interprets them as an unsigned 32-bit little-endian integer or returns
    /// an error.
    ///
    /// This is the only little-endian read. It exists for the length fields of comment headers.
    #[inline(always)]
    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads exactly the number of bytes required to fill the provided buffer or returns an error.
    fn read_buf_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if (buf.len() as u64) * 8 > self.bits_left() {
            return end_of_bitstream_error();
        }

        for byte in buf.iter_mut() {
            *byte = self.read_u8()?;
        }

        Ok(())
    }
}

/// `BitReaderLtr` reads bits from most-significant to least-significant from any `&[u8]`.
///
/// Stated another way, if N-bits are read from a `BitReaderLtr` then bit 0, the first bit read,
/// is the most-significant bit, and bit N-1, the last bit read, is the least-significant.
pub struct BitReaderLtr<'a> {
    buf: &'a [u8],
    bits: u64,
    n_bits_left: u32,
    len: u64,
}

impl<'a> BitReaderLtr<'a> {
    /// Instantiate a new `BitReaderLtr` with the given buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        BitReaderLtr { buf, bits: 0, n_bits_left: 0, len: 8 * buf.len() as u64 }
    }
}

impl private::FetchBitsLtr for BitReaderLtr<'_> {
    fn fetch_bits(&mut self) -> Result<()> {
        let mut buf = [0u8; std::mem::size_of::<u64>()];

        let read_len = min(self.buf.len(), std::mem::size_of::<u64>());

        if read_len == 0 {
            return end_of_bitstream_error();
        }

        buf[..read_len].copy_from_slice(&self.buf[..read_len]);

        self.buf = &self.buf[read_len..];

        self.bits = u64::from_be_bytes(buf);
        self.n_bits_left = (read_len as u32) << 3;

        Ok(())
    }

    #[inline(always)]
    fn get_bits(&self) -> u64 {
        self.bits
    }

    #[inline(always)]
    fn num_bits_left(&self) -> u32 {
        self.n_bits_left
    }

    #[inline(always)]
    fn consume_bits(&mut self, num: u32) {
        self.n_bits_left -= num;
        self.bits <<= num;
    }
}

impl ReadBitsLtr for BitReaderLtr<'_> {}

impl FiniteBitStream for BitReaderLtr<'_> {
    fn bits_left(&self) -> u64 {
        (8 * self.buf.len() as u64) + u64::from(self.n_bits_left)
    }

    fn bits_read(&self) -> u64 {
        self.len - self.bits_left()
    }
}
