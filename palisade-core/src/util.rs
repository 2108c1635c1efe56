// Palisade
// Copyright (c) 2026 The Project Palisade Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `util` module provides a repository of commonly used utility functions sorted into distinct
//! categories.
//!
//! If a function is used all-over the codebase, and does not belong to specific top-level module,
//! it should be placed here.

pub mod bits {
    //! Utilities for bit manipulation.

    /// Returns the minimum number of bits required to store the non-negative integer `x` in two's
    /// complement, or 0 if `x` is 0 or negative.
    ///
    /// Equivalently, this is the position (1 through 31) of the highest set bit of `x`. For
    /// example, `ilog(0) == 0`, `ilog(1) == 1`, `ilog(63) == 6`, and `ilog(64) == 7`.
    #[inline(always)]
    pub fn ilog(x: i32) -> u32 {
        if x <= 0 {
            0
        }
        else {
            i32::BITS - x.leading_zeros()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        #[test]
        fn verify_ilog() {
            assert_eq!(ilog(i32::MIN), 0);
            assert_eq!(ilog(-1), 0);
            assert_eq!(ilog(0), 0);
            assert_eq!(ilog(1), 1);
            assert_eq!(ilog(2), 2);
            assert_eq!(ilog(3), 2);
            assert_eq!(ilog(4), 3);
            assert_eq!(ilog(7), 3);
            assert_eq!(ilog(62), 6);
            assert_eq!(ilog(63), 6);
            assert_eq!(ilog(64), 7);
            assert_eq!(ilog(383), 9);
            assert_eq!(ilog(i32::MAX), 31);
        }

        #[test]
        fn verify_ilog_bounds() {
            // For all a >= 1, 2^(ilog(a) - 1) <= a < 2^ilog(a).
            let check = |a: i32| {
                let n = ilog(a);
                assert!(1i64 << (n - 1) <= i64::from(a), "lower bound failed for {}", a);
                assert!(i64::from(a) < 1i64 << n, "upper bound failed for {}", a);
            };

            (1..=4096).for_each(check);

            let mut rng = SmallRng::seed_from_u64(0x7468_656f_7261);

            for _ in 0..10_000 {
                check(rng.random_range(1..=i32::MAX));
            }
        }
    }
}
