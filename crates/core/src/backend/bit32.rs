//! 32-lane word

use rand::RngCore;

use super::{native_word, BitWord};

/// 32 lanes in a `u32`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bit32(pub u32);

native_word!(Bit32, u32);

impl BitWord for Bit32 {
    const LANES: usize = 32;
    const ZERO: Self = Self(0);
    const ONES: Self = Self(u32::MAX);

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
        Self(rng.next_u32())
    }
}
