//! 256-lane word
//!
//! Backed by an AVX2 `__m256i` register when the target enables AVX2,
//! otherwise by two [`Bit128`] halves. Both representations expose the same
//! lane layout: lane `i` lives in 64-bit limb `i / 64`, bit `i % 64`.

use rand::RngCore;
use std::fmt;
use std::ops::{BitAndAssign, BitOrAssign, BitXorAssign, Shl, Shr};

use super::{Bit128, BitWord};

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
mod repr {
    use std::arch::x86_64::*;

    /// 256 lanes in an AVX2 register
    #[derive(Clone, Copy)]
    #[repr(transparent)]
    pub struct Bit256(__m256i);

    impl Bit256 {
        pub(super) const ZERO_REPR: Self = Self(unsafe { std::mem::transmute::<[u64; 4], __m256i>([0; 4]) });
        pub(super) const ONES_REPR: Self =
            Self(unsafe { std::mem::transmute::<[u64; 4], __m256i>([u64::MAX; 4]) });

        #[inline]
        #[allow(unused_unsafe)]
        pub(super) fn to_limbs(self) -> [u64; 4] {
            let mut out = [0u64; 4];
            // SAFETY: `out` is 32 bytes and the unaligned store has no alignment requirement.
            unsafe { _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, self.0) };
            out
        }

        #[inline]
        #[allow(unused_unsafe)]
        pub(super) fn from_limbs(limbs: [u64; 4]) -> Self {
            // SAFETY: `limbs` is 32 bytes and the unaligned load has no alignment requirement.
            Self(unsafe { _mm256_loadu_si256(limbs.as_ptr() as *const __m256i) })
        }

        #[inline]
        #[allow(unused_unsafe)]
        pub(super) fn and_repr(self, rhs: Self) -> Self {
            // SAFETY: AVX2 is enabled at compile time for this target.
            Self(unsafe { _mm256_and_si256(self.0, rhs.0) })
        }

        #[inline]
        #[allow(unused_unsafe)]
        pub(super) fn or_repr(self, rhs: Self) -> Self {
            // SAFETY: AVX2 is enabled at compile time for this target.
            Self(unsafe { _mm256_or_si256(self.0, rhs.0) })
        }

        #[inline]
        #[allow(unused_unsafe)]
        pub(super) fn xor_repr(self, rhs: Self) -> Self {
            // SAFETY: AVX2 is enabled at compile time for this target.
            Self(unsafe { _mm256_xor_si256(self.0, rhs.0) })
        }

        #[inline]
        pub(super) fn not_repr(self) -> Self {
            self.xor_repr(Self::ONES_REPR)
        }

        #[inline]
        #[allow(unused_unsafe)]
        pub(super) fn is_zero_repr(self) -> bool {
            // SAFETY: AVX2 is enabled at compile time for this target.
            unsafe { _mm256_testz_si256(self.0, self.0) == 1 }
        }
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2")))]
mod repr {
    use super::Bit128;

    /// 256 lanes in two 128-bit halves
    #[derive(Clone, Copy)]
    pub struct Bit256 {
        lo: Bit128,
        hi: Bit128,
    }

    impl Bit256 {
        pub(super) const ZERO_REPR: Self = Self {
            lo: Bit128(0),
            hi: Bit128(0),
        };
        pub(super) const ONES_REPR: Self = Self {
            lo: Bit128(u128::MAX),
            hi: Bit128(u128::MAX),
        };

        #[inline]
        pub(super) fn to_limbs(self) -> [u64; 4] {
            let (a, b) = self.lo.halves();
            let (c, d) = self.hi.halves();
            [a, b, c, d]
        }

        #[inline]
        pub(super) fn from_limbs(limbs: [u64; 4]) -> Self {
            Self {
                lo: Bit128::from_halves(limbs[0], limbs[1]),
                hi: Bit128::from_halves(limbs[2], limbs[3]),
            }
        }

        #[inline]
        pub(super) fn and_repr(self, rhs: Self) -> Self {
            Self {
                lo: self.lo & rhs.lo,
                hi: self.hi & rhs.hi,
            }
        }

        #[inline]
        pub(super) fn or_repr(self, rhs: Self) -> Self {
            Self {
                lo: self.lo | rhs.lo,
                hi: self.hi | rhs.hi,
            }
        }

        #[inline]
        pub(super) fn xor_repr(self, rhs: Self) -> Self {
            Self {
                lo: self.lo ^ rhs.lo,
                hi: self.hi ^ rhs.hi,
            }
        }

        #[inline]
        pub(super) fn not_repr(self) -> Self {
            Self {
                lo: !self.lo,
                hi: !self.hi,
            }
        }

        #[inline]
        pub(super) fn is_zero_repr(self) -> bool {
            self.lo.0 == 0 && self.hi.0 == 0
        }
    }
}

pub use repr::Bit256;

impl Bit256 {
    /// Combine a low (lanes 0..128) and high (lanes 128..256) half
    #[inline]
    pub fn from_halves(lo: Bit128, hi: Bit128) -> Self {
        let (a, b) = lo.halves();
        let (c, d) = hi.halves();
        Self::from_limbs([a, b, c, d])
    }

    /// Split into low and high 128-lane halves
    #[inline]
    pub fn halves(self) -> (Bit128, Bit128) {
        let [a, b, c, d] = self.to_limbs();
        (Bit128::from_halves(a, b), Bit128::from_halves(c, d))
    }
}

impl PartialEq for Bit256 {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.xor_repr(*other).is_zero_repr()
    }
}

impl Eq for Bit256 {}

impl Default for Bit256 {
    fn default() -> Self {
        Self::ZERO_REPR
    }
}

impl fmt::Debug for Bit256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.to_limbs();
        write!(f, "Bit256({:#018x}_{:016x}_{:016x}_{:016x})", d, c, b, a)
    }
}

impl std::ops::BitAnd for Bit256 {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.and_repr(rhs)
    }
}

impl std::ops::BitOr for Bit256 {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.or_repr(rhs)
    }
}

impl std::ops::BitXor for Bit256 {
    type Output = Self;
    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        self.xor_repr(rhs)
    }
}

impl std::ops::Not for Bit256 {
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        self.not_repr()
    }
}

impl BitAndAssign for Bit256 {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.and_repr(rhs);
    }
}

impl BitOrAssign for Bit256 {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.or_repr(rhs);
    }
}

impl BitXorAssign for Bit256 {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = self.xor_repr(rhs);
    }
}

// Lane shifts cross the 128-bit boundary, so they go through the halves.
impl Shl<usize> for Bit256 {
    type Output = Self;
    #[inline]
    fn shl(self, k: usize) -> Self {
        if k == 0 {
            return self;
        }
        if k >= 256 {
            return Self::ZERO;
        }
        let (lo, hi) = self.halves();
        if k >= 128 {
            return Self::from_halves(Bit128::ZERO, lo << (k - 128));
        }
        Self::from_halves(lo << k, (hi << k) | (lo >> (128 - k)))
    }
}

impl Shr<usize> for Bit256 {
    type Output = Self;
    #[inline]
    fn shr(self, k: usize) -> Self {
        if k == 0 {
            return self;
        }
        if k >= 256 {
            return Self::ZERO;
        }
        let (lo, hi) = self.halves();
        if k >= 128 {
            return Self::from_halves(hi >> (k - 128), Bit128::ZERO);
        }
        Self::from_halves((lo >> k) | (hi << (128 - k)), hi >> k)
    }
}

impl BitWord for Bit256 {
    const LANES: usize = 256;
    const ZERO: Self = Bit256::ZERO_REPR;
    const ONES: Self = Bit256::ONES_REPR;

    #[inline]
    fn get(self, lane: usize) -> bool {
        debug_assert!(lane < Self::LANES);
        (self.to_limbs()[lane / 64] >> (lane % 64)) & 1 == 1
    }

    #[inline]
    fn bitcount(self) -> u32 {
        self.to_limbs().iter().map(|limb| limb.count_ones()).sum()
    }

    #[inline]
    fn any(self) -> bool {
        !self.is_zero_repr()
    }

    #[inline]
    fn onehot(lane: usize) -> Self {
        debug_assert!(lane < Self::LANES);
        let mut limbs = [0u64; 4];
        limbs[lane / 64] = 1 << (lane % 64);
        Self::from_limbs(limbs)
    }

    #[inline]
    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut limbs = [0u64; 4];
        for limb in &mut limbs {
            *limb = rng.next_u64();
        }
        Self::from_limbs(limbs)
    }
}
