//! 128-lane word
//!
//! Stored as a `u128`, but counted and filled as two 64-bit halves so the
//! hot path stays on native 64-bit popcount.

use rand::RngCore;

use super::{native_word, BitWord};

/// 128 lanes in a `u128`; lanes 0..64 are the low half
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bit128(pub u128);

native_word!(Bit128, u128);

impl Bit128 {
    /// Combine a low (lanes 0..64) and high (lanes 64..128) half
    #[inline]
    pub const fn from_halves(lo: u64, hi: u64) -> Self {
        Self(((hi as u128) << 64) | lo as u128)
    }

    /// Split into low and high 64-lane halves
    #[inline]
    pub const fn halves(self) -> (u64, u64) {
        (self.0 as u64, (self.0 >> 64) as u64)
    }
}

impl BitWord for Bit128 {
    const LANES: usize = 128;
    const ZERO: Self = Self(0);
    const ONES: Self = Self(u128::MAX);

    #[inline]
    fn get(self, lane: usize) -> bool {
        debug_assert!(lane < Self::LANES);
        (self.0 >> lane) & 1 == 1
    }

    #[inline]
    fn bitcount(self) -> u32 {
        let (lo, hi) = self.halves();
        lo.count_ones() + hi.count_ones()
    }

    #[inline]
    fn onehot(lane: usize) -> Self {
        debug_assert!(lane < Self::LANES);
        Self(1 << lane)
    }

    #[inline]
    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let lo = rng.next_u64();
        let hi = rng.next_u64();
        Self::from_halves(lo, hi)
    }
}
