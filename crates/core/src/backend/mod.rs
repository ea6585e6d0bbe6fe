//! Fixed-width bit-plane words
//!
//! A [`BitWord`] is a W-lane register: bit `i` of the word belongs to lane
//! `i`. The bitwise operators act on all lanes at once, `<<`/`>>` move bits
//! between lanes with zero fill. No operation validates its inputs; lane
//! indices must be below [`BitWord::LANES`].

use rand::RngCore;
use std::fmt;
use std::ops::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, Shr,
};

use crate::rng::with_lane_rng;

mod bit128;
mod bit256;
mod bit32;
mod bit64;

pub use bit128::Bit128;
pub use bit256::Bit256;
pub use bit32::Bit32;
pub use bit64::Bit64;

/// A W-lane bit register used as one bit-plane of a lane set
pub trait BitWord:
    Copy
    + Eq
    + Default
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + BitAndAssign
    + BitOrAssign
    + BitXorAssign
    + Shl<usize, Output = Self>
    + Shr<usize, Output = Self>
{
    /// Number of lanes (bits) in the word
    const LANES: usize;
    /// All lanes clear
    const ZERO: Self;
    /// All lanes set
    const ONES: Self;

    /// Value of lane `lane`
    fn get(self, lane: usize) -> bool;

    /// Population count across all lanes
    fn bitcount(self) -> u32;

    /// A word with exactly lane `lane` set
    fn onehot(lane: usize) -> Self;

    /// A word with every lane drawn independently and uniformly from `rng`
    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self;

    /// Set lane `lane` in place
    #[inline]
    fn set(&mut self, lane: usize, value: bool) {
        if value {
            *self |= Self::onehot(lane);
        } else {
            *self &= !Self::onehot(lane);
        }
    }

    /// True if any lane is set
    #[inline]
    fn any(self) -> bool {
        self != Self::ZERO
    }

    /// `ONES` for `true`, `ZERO` for `false`
    #[inline]
    fn splat(bit: bool) -> Self {
        if bit {
            Self::ONES
        } else {
            Self::ZERO
        }
    }

    /// Per-lane multiplexer: lanes of `if_set` where `mask` is set, `if_clear` elsewhere
    #[inline]
    fn select(mask: Self, if_set: Self, if_clear: Self) -> Self {
        (mask & if_set) | (!mask & if_clear)
    }

    /// A random word from the process-wide generator for this width
    fn random() -> Self {
        with_lane_rng(Self::LANES, |rng| Self::random_with(rng))
    }
}

/// Bitwise operators and formatting for words backed by a native unsigned integer.
macro_rules! native_word {
    ($name:ident, $repr:ty) => {
        impl std::ops::BitAnd for $name {
            type Output = Self;
            #[inline]
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitXor for $name {
            type Output = Self;
            #[inline]
            fn bitxor(self, rhs: Self) -> Self {
                Self(self.0 ^ rhs.0)
            }
        }

        impl std::ops::Not for $name {
            type Output = Self;
            #[inline]
            fn not(self) -> Self {
                Self(!self.0)
            }
        }

        impl std::ops::BitAndAssign for $name {
            #[inline]
            fn bitand_assign(&mut self, rhs: Self) {
                self.0 &= rhs.0;
            }
        }

        impl std::ops::BitOrAssign for $name {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl std::ops::BitXorAssign for $name {
            #[inline]
            fn bitxor_assign(&mut self, rhs: Self) {
                self.0 ^= rhs.0;
            }
        }

        // Shifts of LANES or more clear the word instead of overflowing.
        impl std::ops::Shl<usize> for $name {
            type Output = Self;
            #[inline]
            fn shl(self, k: usize) -> Self {
                let shifted = u32::try_from(k).ok().and_then(|k| self.0.checked_shl(k));
                Self(shifted.unwrap_or(0))
            }
        }

        impl std::ops::Shr<usize> for $name {
            type Output = Self;
            #[inline]
            fn shr(self, k: usize) -> Self {
                let shifted = u32::try_from(k).ok().and_then(|k| self.0.checked_shr(k));
                Self(shifted.unwrap_or(0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({:#0width$x})"),
                    self.0,
                    width = std::mem::size_of::<$repr>() * 2 + 2
                )
            }
        }
    };
}

pub(crate) use native_word;
