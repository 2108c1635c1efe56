// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use palisade_core::errors::{unknown_content_error, Result};
use palisade_core::io::{BitReaderLtr, ReadBitsLtr};

/// A motion vector in half-pixel units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MotionVector {
    pub x: i8,
    pub y: i8,
}

/// How the motion vectors of a frame are coded (MVMODE).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotionVectorCoding {
    /// Each component is a variable length code.
    Huffman,
    /// Each component is a 5-bit magnitude followed by a sign bit.
    Raw,
}

struct MvCode {
    len: u32,
    code: u32,
    value: i8,
}

const fn mv_code(len: u32, code: u32, value: i8) -> MvCode {
    MvCode { len, code, value }
}

/// The motion vector component code.
const MV_CODES: [MvCode; 63] = [
    mv_code(3, 0b000, 0),
    mv_code(3, 0b001, 1),
    mv_code(3, 0b010, -1),
    mv_code(4, 0b0110, 2),
    mv_code(4, 0b0111, -2),
    mv_code(4, 0b1000, 3),
    mv_code(4, 0b1001, -3),
    mv_code(6, 0b101000, 4),
    mv_code(6, 0b101001, -4),
    mv_code(6, 0b101010, 5),
    mv_code(6, 0b101011, -5),
    mv_code(6, 0b101100, 6),
    mv_code(6, 0b101101, -6),
    mv_code(6, 0b101110, 7),
    mv_code(6, 0b101111, -7),
    mv_code(7, 0b1100000, 8),
    mv_code(7, 0b1100001, -8),
    mv_code(7, 0b1100010, 9),
    mv_code(7, 0b1100011, -9),
    mv_code(7, 0b1100100, 10),
    mv_code(7, 0b1100101, -10),
    mv_code(7, 0b1100110, 11),
    mv_code(7, 0b1100111, -11),
    mv_code(7, 0b1101000, 12),
    mv_code(7, 0b1101001, -12),
    mv_code(7, 0b1101010, 13),
    mv_code(7, 0b1101011, -13),
    mv_code(7, 0b1101100, 14),
    mv_code(7, 0b1101101, -14),
    mv_code(7, 0b1101110, 15),
    mv_code(7, 0b1101111, -15),
    mv_code(8, 0b11100000, 16),
    mv_code(8, 0b11100001, -16),
    mv_code(8, 0b11100010, 17),
    mv_code(8, 0b11100011, -17),
    mv_code(8, 0b11100100, 18),
    mv_code(8, 0b11100101, -18),
    mv_code(8, 0b11100110, 19),
    mv_code(8, 0b11100111, -19),
    mv_code(8, 0b11101000, 20),
    mv_code(8, 0b11101001, -20),
    mv_code(8, 0b11101010, 21),
    mv_code(8, 0b11101011, -21),
    mv_code(8, 0b11101100, 22),
    mv_code(8, 0b11101101, -22),
    mv_code(8, 0b11101110, 23),
    mv_code(8, 0b11101111, -23),
    mv_code(8, 0b11110000, 24),
    mv_code(8, 0b11110001, -24),
    mv_code(8, 0b11110010, 25),
    mv_code(8, 0b11110011, -25),
    mv_code(8, 0b11110100, 26),
    mv_code(8, 0b11110101, -26),
    mv_code(8, 0b11110110, 27),
    mv_code(8, 0b11110111, -27),
    mv_code(8, 0b11111000, 28),
    mv_code(8, 0b11111001, -28),
    mv_code(8, 0b11111010, 29),
    mv_code(8, 0b11111011, -29),
    mv_code(8, 0b11111100, 30),
    mv_code(8, 0b11111101, -30),
    mv_code(8, 0b11111110, 31),
    mv_code(8, 0b11111111, -31),
];

/// The longest motion vector component code.
const MAX_MV_CODE_LEN: u32 = 8;

fn read_huffman_component(bs: &mut BitReaderLtr<'_>) -> Result<i8> {
    let mut code = 0;

    for len in 1..=MAX_MV_CODE_LEN {
        code = (code << 1) | u32::from(bs.read_bit()?);

        if let Some(mv) = MV_CODES.iter().find(|mv| mv.len == len && mv.code == code) {
            return Ok(mv.value);
        }
    }

    unknown_content_error("theora: invalid motion vector code")
}

fn read_raw_component(bs: &mut BitReaderLtr<'_>) -> Result<i8> {
    let magnitude = bs.read_bits_leq32(5)? as i8;

    if bs.read_bit()? {
        Ok(-magnitude)
    }
    else {
        Ok(magnitude)
    }
}

/// Reads one motion vector, x component first.
pub fn read_motion_vector(
    bs: &mut BitReaderLtr<'_>,
    coding: MotionVectorCoding,
) -> Result<MotionVector> {
    let read_component = match coding {
        MotionVectorCoding::Huffman => read_huffman_component,
        MotionVectorCoding::Raw => read_raw_component,
    };

    let x = read_component(bs)?;
    let y = read_component(bs)?;

    Ok(MotionVector { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::BitWriter;
    use palisade_core::errors::Error;

    fn read(bw: &BitWriter, coding: MotionVectorCoding) -> Result<MotionVector> {
        read_motion_vector(&mut BitReaderLtr::new(&bw.to_bytes()), coding)
    }

    #[test]
    fn verify_mv_code_is_prefix_free() {
        for a in MV_CODES.iter() {
            for b in MV_CODES.iter() {
                if a.len < b.len {
                    let prefix = b.code >> (b.len - a.len);
                    assert_ne!(prefix, a.code, "{} prefixes {}", a.value, b.value);
                }
            }
        }

        // Every value from -31 to 31 has exactly one code.
        for value in -31..=31 {
            assert_eq!(MV_CODES.iter().filter(|mv| mv.value == value).count(), 1);
        }
    }

    #[test]
    fn verify_read_huffman_motion_vector() {
        let mut bw = BitWriter::new();
        bw.code("001 010");
        assert_eq!(read(&bw, MotionVectorCoding::Huffman), Ok(MotionVector { x: 1, y: -1 }));

        let mut bw = BitWriter::new();
        bw.code("1001 101110");
        assert_eq!(read(&bw, MotionVectorCoding::Huffman), Ok(MotionVector { x: -3, y: 7 }));

        let mut bw = BitWriter::new();
        bw.code("1101111 11111111");
        assert_eq!(read(&bw, MotionVectorCoding::Huffman), Ok(MotionVector { x: -15, y: -31 }));

        let mut bw = BitWriter::new();
        bw.code("000 11100000");
        assert_eq!(read(&bw, MotionVectorCoding::Huffman), Ok(MotionVector { x: 0, y: 16 }));
    }

    #[test]
    fn verify_read_raw_motion_vector() {
        let mut bw = BitWriter::new();
        bw.bits(31, 5).bit(true).bits(12, 5).bit(false);
        assert_eq!(read(&bw, MotionVectorCoding::Raw), Ok(MotionVector { x: -31, y: 12 }));

        // Negative zero is zero.
        let mut bw = BitWriter::new();
        bw.bits(0, 5).bit(true).bits(0, 5).bit(false);
        assert_eq!(read(&bw, MotionVectorCoding::Raw), Ok(MotionVector { x: 0, y: 0 }));
    }

    #[test]
    fn verify_truncated_motion_vector() {
        let mut bw = BitWriter::new();
        bw.code("1111111");
        assert!(matches!(read(&bw, MotionVectorCoding::Huffman), Err(Error::Truncation(_))));

        let mut bw = BitWriter::new();
        bw.bits(5, 5).bit(false).bits(5, 2);
        assert!(matches!(read(&bw, MotionVectorCoding::Raw), Err(Error::Truncation(_))));
    }
}
