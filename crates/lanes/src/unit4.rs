//! Bit-sliced 4-bit lane arithmetic
//!
//! A [`Unit4`] packs `W::LANES` signed 4-bit numbers into four bit-planes.
//! Each lane is a two's complement nibble in units of [`STEP`]:
//!
//! ```text
//! value = (v0 + 2*v1 + 4*v2 - 8*sgn) / 8        range [-1, 7/8]
//! ```
//!
//! The sign-set, zero-magnitude pattern is `-1` and is kept as such.
//! Every operator is a boolean circuit over whole words, so one call computes
//! all lanes at once.

use bitplane_core::BitWord;
use rand::RngCore;
use std::ops::{Add, Mul, Neg, Shl, Shr, Sub};

/// Value of one quantization level
pub const STEP: f64 = 0.125;

/// Largest positive level (7/8)
pub const MAX_LEVEL: i8 = 7;

/// Smallest negative level (-1)
pub const MIN_LEVEL: i8 = -8;

/// W lanes of 4-bit two's complement numbers, one word per bit-plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unit4<W: BitWord> {
    /// Weight 1/8
    pub v0: W,
    /// Weight 2/8
    pub v1: W,
    /// Weight 4/8
    pub v2: W,
    /// Weight -1
    pub sgn: W,
}

/// Sum and carry of a bit-sliced full adder
#[inline]
fn full_add<W: BitWord>(a: W, b: W, carry: W) -> (W, W) {
    let half = a ^ b;
    (half ^ carry, (a & b) | (carry & half))
}

/// Ripple-carry addition of two 8-plane unsigned numbers, wrapping at 2^8
fn ripple_add<W: BitWord>(a: [W; 8], b: [W; 8]) -> [W; 8] {
    let mut out = [W::ZERO; 8];
    let mut carry = W::ZERO;
    for k in 0..8 {
        let (sum, next) = full_add(a[k], b[k], carry);
        out[k] = sum;
        carry = next;
    }
    out
}

/// Encode `value` (in lane units) to a level, truncating toward zero.
///
/// Magnitudes are decomposed bit by bit from the top, then clamped to the
/// representable range. NaN encodes as zero.
pub fn quantize(value: f64) -> i8 {
    if value.is_nan() {
        return 0;
    }
    let mut rest = value.abs();
    let mut magnitude = 0i8;
    for (bit, weight) in [(8, 1.0), (4, 0.5), (2, 0.25), (1, STEP)] {
        if rest >= weight {
            magnitude |= bit;
            rest -= weight;
        }
    }
    if value < 0.0 {
        -magnitude.min(-MIN_LEVEL)
    } else {
        magnitude.min(MAX_LEVEL)
    }
}

impl<W: BitWord> Unit4<W> {
    /// Number of lanes
    pub const LANES: usize = W::LANES;

    /// All lanes zero
    pub const ZERO: Self = Self {
        v0: W::ZERO,
        v1: W::ZERO,
        v2: W::ZERO,
        sgn: W::ZERO,
    };

    /// Every lane set to `value` (in lane units)
    pub fn broadcast(value: f64) -> Self {
        Self::splat_level(quantize(value))
    }

    /// Every lane set to `level` (clamped to `[-8, 7]`)
    pub fn splat_level(level: i8) -> Self {
        let bits = level.clamp(MIN_LEVEL, MAX_LEVEL) as u8;
        Self {
            v0: W::splat(bits & 1 != 0),
            v1: W::splat(bits & 2 != 0),
            v2: W::splat(bits & 4 != 0),
            sgn: W::splat(bits & 8 != 0),
        }
    }

    /// Every plane drawn from the process-wide generator for this width
    pub fn random() -> Self {
        Self {
            v0: W::random(),
            v1: W::random(),
            v2: W::random(),
            sgn: W::random(),
        }
    }

    /// Every plane drawn from `rng`
    pub fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self {
            v0: W::random_with(rng),
            v1: W::random_with(rng),
            v2: W::random_with(rng),
            sgn: W::random_with(rng),
        }
    }

    /// Integer level of lane `lane`, in `[-8, 7]`
    #[inline]
    pub fn level(&self, lane: usize) -> i8 {
        let magnitude =
            self.v0.get(lane) as i8 | (self.v1.get(lane) as i8) << 1 | (self.v2.get(lane) as i8) << 2;
        magnitude - 8 * self.sgn.get(lane) as i8
    }

    /// Set lane `lane` to `level` (clamped to `[-8, 7]`)
    #[inline]
    pub fn set_level(&mut self, lane: usize, level: i8) {
        let bits = level.clamp(MIN_LEVEL, MAX_LEVEL) as u8;
        self.v0.set(lane, bits & 1 != 0);
        self.v1.set(lane, bits & 2 != 0);
        self.v2.set(lane, bits & 4 != 0);
        self.sgn.set(lane, bits & 8 != 0);
    }

    /// Decoded value of lane `lane`
    #[inline]
    pub fn get(&self, lane: usize) -> f64 {
        self.level(lane) as f64 * STEP
    }

    /// Encode `value` into lane `lane`
    #[inline]
    pub fn set(&mut self, lane: usize, value: f64) {
        self.set_level(lane, quantize(value));
    }

    /// True if every lane is positive zero
    pub fn is_zero(&self) -> bool {
        !(self.v0 | self.v1 | self.v2 | self.sgn).any()
    }

    /// Reset every lane to zero
    pub fn clear(&mut self) {
        *self = Self::ZERO;
    }

    /// Lanes holding the `-1` pattern
    #[inline]
    pub fn min_lanes(&self) -> W {
        self.sgn & !(self.v0 | self.v1 | self.v2)
    }

    /// True if any lane holds `-1`
    pub fn has_min_lanes(&self) -> bool {
        self.min_lanes().any()
    }

    /// Two's complement negation: invert all planes, then add one.
    ///
    /// `-1` negates to itself.
    pub fn complement(self) -> Self {
        let (n0, n1, n2, ns) = (!self.v0, !self.v1, !self.v2, !self.sgn);
        let c0 = n0;
        let c1 = n1 & c0;
        let c2 = n2 & c1;
        Self {
            v0: !n0,
            v1: n1 ^ c0,
            v2: n2 ^ c1,
            sgn: ns ^ c2,
        }
    }

    /// Wrapping addition plus the lanes that overflowed
    pub fn overflowing_add(self, rhs: Self) -> (Self, W) {
        let v0 = self.v0 ^ rhs.v0;
        let c0 = self.v0 & rhs.v0;
        let (v1, c1) = full_add(self.v1, rhs.v1, c0);
        let (v2, c2) = full_add(self.v2, rhs.v2, c1);
        let sgn = self.sgn ^ rhs.sgn ^ c2;
        let overflow = !(self.sgn ^ rhs.sgn) & (sgn ^ self.sgn);
        (Self { v0, v1, v2, sgn }, overflow)
    }

    /// Wrapping addition
    pub fn wrapping_add(self, rhs: Self) -> Self {
        self.overflowing_add(rhs).0
    }

    /// Wrapping subtraction (addition of the complement)
    pub fn wrapping_sub(self, rhs: Self) -> Self {
        self.overflowing_add(rhs.complement()).0
    }

    /// Magnitude planes `[m0, m1, m2, m3]`; `-1` has magnitude 8
    fn magnitude(self) -> [W; 4] {
        let negated = self.complement();
        [
            W::select(self.sgn, negated.v0, self.v0),
            W::select(self.sgn, negated.v1, self.v1),
            W::select(self.sgn, negated.v2, self.v2),
            self.sgn & negated.sgn,
        ]
    }

    /// Lane product, truncated toward zero.
    ///
    /// The 4x4-bit magnitude product is accumulated row by row through the
    /// ripple adder; bits 3..=6 are the product in lane units. `-1 * -1`
    /// saturates to `7/8`.
    pub fn multiply(self, rhs: Self) -> Self {
        let a = self.magnitude();
        let b = rhs.magnitude();

        let mut acc = [W::ZERO; 8];
        for (j, &bj) in b.iter().enumerate() {
            let mut row = [W::ZERO; 8];
            for (i, &ai) in a.iter().enumerate() {
                row[i + j] = ai & bj;
            }
            acc = ripple_add(acc, row);
        }

        let negative = self.sgn ^ rhs.sgn;
        let saturated = !negative & acc[6];
        let product = Self {
            v0: acc[3] | saturated,
            v1: acc[4] | saturated,
            v2: acc[5] | saturated,
            sgn: acc[6] & !saturated,
        };
        let negated = product.complement();
        Self {
            v0: W::select(negative, negated.v0, product.v0),
            v1: W::select(negative, negated.v1, product.v1),
            v2: W::select(negative, negated.v2, product.v2),
            sgn: negative & negated.sgn,
        }
    }

    /// Negative lanes become zero
    pub fn relu(self) -> Self {
        let mut out = self;
        out.relu_in_place();
        out
    }

    /// Negative lanes become zero, in place
    pub fn relu_in_place(&mut self) {
        let keep = !self.sgn;
        self.v0 &= keep;
        self.v1 &= keep;
        self.v2 &= keep;
        self.sgn = W::ZERO;
    }

    /// Sum of all lanes, in lane units
    pub fn sum(&self) -> f64 {
        let weighted = |mask: W| {
            (self.v0 & mask).bitcount() as i64
                + 2 * (self.v1 & mask).bitcount() as i64
                + 4 * (self.v2 & mask).bitcount() as i64
        };
        let total = weighted(!self.sgn) + weighted(self.sgn) - 8 * self.sgn.bitcount() as i64;
        total as f64 * STEP
    }

    /// Largest magnitude among lanes in `mask`, scanning planes from the top
    fn scan(&self, mask: W) -> i8 {
        let mut live = mask;
        let mut best = 0;
        for (plane, weight) in [(self.v2, 4), (self.v1, 2), (self.v0, 1)] {
            let hit = live & plane;
            if hit.any() {
                best += weight;
                live = hit;
            }
        }
        best
    }

    /// Largest absolute lane value, in `[0, 1]`
    pub fn absmax(&self) -> f64 {
        if self.has_min_lanes() {
            return 1.0;
        }
        let positive = self.scan(!self.sgn);
        let negative = self.complement().scan(self.sgn);
        positive.max(negative) as f64 * STEP
    }

    /// Arithmetic shift of every lane by one level (`v0<-v1, v1<-v2, v2<-sgn`).
    ///
    /// Halves each lane, rounding toward negative infinity.
    pub fn halve_in_place(&mut self) {
        self.v0 = self.v1;
        self.v1 = self.v2;
        self.v2 = self.sgn;
    }

    /// Double every lane (`v2<-v1, v1<-v0, v0<-0`); exact only when [`can_double`](Self::can_double)
    pub fn double_in_place(&mut self) {
        self.v2 = self.v1;
        self.v1 = self.v0;
        self.v0 = W::ZERO;
    }

    /// True if every lane lies in `[-1/2, 3/8]`, so doubling is exact
    pub fn can_double(&self) -> bool {
        !(self.v2 ^ self.sgn).any()
    }

    /// Decoded values of all lanes
    pub fn to_vec(&self) -> Vec<f64> {
        (0..W::LANES).map(|lane| self.get(lane)).collect()
    }

    fn map_planes(self, f: impl Fn(W) -> W) -> Self {
        Self {
            v0: f(self.v0),
            v1: f(self.v1),
            v2: f(self.v2),
            sgn: f(self.sgn),
        }
    }
}

impl<W: BitWord> Add for Unit4<W> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
}

impl<W: BitWord> Sub for Unit4<W> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }
}

impl<W: BitWord> Mul for Unit4<W> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl<W: BitWord> Neg for Unit4<W> {
    type Output = Self;
    fn neg(self) -> Self {
        self.complement()
    }
}

/// Lane `i` takes lane `i + k`; the top `k` lanes become zero.
impl<W: BitWord> Shl<usize> for Unit4<W> {
    type Output = Self;
    fn shl(self, k: usize) -> Self {
        self.map_planes(|plane| plane >> k)
    }
}

/// Lane `i` takes lane `i - k`; the bottom `k` lanes become zero.
impl<W: BitWord> Shr<usize> for Unit4<W> {
    type Output = Self;
    fn shr(self, k: usize) -> Self {
        self.map_planes(|plane| plane << k)
    }
}
