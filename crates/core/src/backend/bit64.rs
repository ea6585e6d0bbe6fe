//! 64-lane word

use rand::RngCore;

use super::{native_word, BitWord};

/// 64 lanes in a `u64`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bit64(pub u64);

native_word!(Bit64, u64);

impl BitWord for Bit64 {
    const LANES: usize = 64;
    const ZERO: Self = Self(0);
    const ONES: Self = Self(u64::MAX);

    #[inline]
    fn get(self, lane: usize) -> bool {
        debug_assert!(lane < Self::LANES);
        (self.0 >> lane) & 1 == 1
    }

    #[inline]
    fn bitcount(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    fn onehot(lane: usize) -> Self {
        debug_assert!(lane < Self::LANES);
        Self(1 << lane)
    }

    #[inline]
    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self(rng.next_u64())
    }
}
