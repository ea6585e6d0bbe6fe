//! Block floating-point lane sets
//!
//! A [`ScaledLane`] pairs a [`Unit4`] with one shared scale, so lane `i`
//! represents `unit.get(i) * scale`. Every arithmetic result is
//! standardized: the unit is doubled (and the scale halved) for as long as
//! that is exact, leaving the largest lane magnitude in `[1/2, 1]`.

use bitplane_core::{BitWord, EngineConfig};
use rand::RngCore;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Shl, Shr, Sub, SubAssign};

use crate::error::{LaneError, Result};
use crate::unit4::{Unit4, STEP};

/// Operands whose scale is below this fraction of the other operand's scale
/// contribute nothing after alignment
const FLUSH_RATIO: f64 = 1.0 / 16.0;

/// Residual alignment ratios at or above this are treated as 1
const UNIT_RATIO: f64 = 15.0 / 16.0;

/// W lanes sharing one scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledLane<W: BitWord> {
    unit: Unit4<W>,
    scale: f64,
}

/// True if `ratio` encodes without clamping
#[inline]
fn fits(ratio: f64) -> bool {
    (-1.0..1.0).contains(&ratio)
}

/// Keep a scale finite and strictly positive
#[inline]
fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        1.0
    } else {
        scale.clamp(f64::MIN_POSITIVE, f64::MAX)
    }
}

impl<W: BitWord> ScaledLane<W> {
    /// Assemble from a unit and a scale, then standardize
    pub fn from_parts(unit: Unit4<W>, scale: f64) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(LaneError::InvalidScale(scale));
        }
        Ok(Self { unit, scale }.standardized())
    }

    /// All lanes zero at the configured initial scale
    pub fn zero() -> Self {
        Self {
            unit: Unit4::ZERO,
            scale: EngineConfig::global().initial_scale(),
        }
    }

    /// Every lane set to `value`, starting from the configured initial scale
    pub fn broadcast(value: f64) -> Self {
        Self::broadcast_at(value, EngineConfig::global().initial_scale_exponent)
    }

    /// Every lane set to `value`, starting from scale `2^exponent`
    pub fn broadcast_at(value: f64, exponent: i32) -> Self {
        let mut scale = clamp_scale(2f64.powi(exponent));
        if value.is_finite() && !fits(value / scale) {
            scale = clamp_scale(2.0 * value.abs());
            tracing::trace!(value, scale, "Broadcast value outside initial scale");
        }
        Self {
            unit: Unit4::broadcast(value / scale),
            scale,
        }
        .standardized()
    }

    /// [`broadcast`](Self::broadcast) with an explicit, validated configuration
    pub fn broadcast_with(value: f64, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::broadcast_at(value, config.initial_scale_exponent))
    }

    /// Random lanes at scale 1 from the process-wide generator for this width
    pub fn random() -> Self {
        Self {
            unit: Unit4::random(),
            scale: 1.0,
        }
        .standardized()
    }

    /// Random lanes at scale 1 drawn from `rng`
    pub fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self {
            unit: Unit4::random_with(rng),
            scale: 1.0,
        }
        .standardized()
    }

    /// Lane set holding `values` in its first lanes and zero elsewhere
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() > W::LANES {
            return Err(LaneError::TooManyValues {
                capacity: W::LANES,
                got: values.len(),
            });
        }
        let peak = values
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0f64, |peak, v| peak.max(v.abs()));
        let mut lane = Self::zero();
        if peak > 0.0 {
            lane.scale = clamp_scale(2.0 * peak);
        }
        for (i, &value) in values.iter().enumerate() {
            lane.set(i, value);
        }
        lane.standardize();
        Ok(lane)
    }

    /// The lane unit
    pub fn unit(&self) -> &Unit4<W> {
        &self.unit
    }

    /// The shared scale factor
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of lanes
    pub fn size(&self) -> usize {
        W::LANES
    }

    /// Decoded value of lane `lane`
    pub fn get(&self, lane: usize) -> f64 {
        self.unit.get(lane) * self.scale
    }

    /// Encode `value` into lane `lane`.
    ///
    /// A value outside the current range rescales the whole lane set: an
    /// all-zero set adopts a scale of `2|value|`, otherwise every lane is
    /// halved (scale doubled) until `value` fits.
    pub fn set(&mut self, lane: usize, value: f64) {
        if value.is_finite() && !fits(value / self.scale) {
            if self.unit.is_zero() {
                self.scale = clamp_scale(2.0 * value.abs());
            } else {
                let mut halvings = 0u32;
                while !fits(value / self.scale) && self.scale < f64::MAX {
                    self.unit.halve_in_place();
                    self.scale = clamp_scale(self.scale * 2.0);
                    halvings += 1;
                }
                tracing::trace!(lane, value, halvings, "Rescaled lane set");
            }
        }
        self.unit.set(lane, value / self.scale);
    }

    /// Sum of all lanes
    pub fn sum(&self) -> f64 {
        self.unit.sum() * self.scale
    }

    /// Largest absolute lane value
    pub fn absmax(&self) -> f64 {
        self.unit.absmax() * self.scale
    }

    /// Decoded values of all lanes
    pub fn to_vec(&self) -> Vec<f64> {
        self.unit.to_vec().into_iter().map(|v| v * self.scale).collect()
    }

    /// Double the unit and halve the scale while that is exact
    pub fn standardize(&mut self) {
        while !self.unit.is_zero() && self.unit.can_double() {
            self.unit.double_in_place();
            self.scale = clamp_scale(self.scale * 0.5);
        }
    }

    /// Standardized copy
    pub fn standardized(mut self) -> Self {
        self.standardize();
        self
    }

    /// Negative lanes become zero
    pub fn relu(self) -> Self {
        let mut out = self;
        out.relu_in_place();
        out
    }

    /// Negative lanes become zero, in place
    pub fn relu_in_place(&mut self) {
        self.unit.relu_in_place();
        self.standardize();
    }

    /// The unit re-expressed at `scale`, which must not be below `self.scale`
    fn aligned_to(&self, scale: f64) -> Unit4<W> {
        let mut ratio = self.scale / scale;
        if ratio >= 1.0 {
            return self.unit;
        }
        if ratio < FLUSH_RATIO {
            return Unit4::ZERO;
        }
        let mut unit = self.unit;
        while ratio <= 0.5 {
            unit.halve_in_place();
            ratio *= 2.0;
        }
        if ratio < UNIT_RATIO {
            unit = unit * Unit4::splat_level((ratio / STEP).round() as i8);
        }
        unit
    }

    /// `self + rhs`, or `self - rhs` when `negate` is set
    fn combine(self, rhs: Self, negate: bool) -> Self {
        let mut scale = self.scale.max(rhs.scale);
        let mut lhs_unit = self.aligned_to(scale);
        let mut rhs_unit = rhs.aligned_to(scale);

        // -1 has no positive counterpart in a nibble
        if negate && rhs_unit.has_min_lanes() {
            lhs_unit.halve_in_place();
            rhs_unit.halve_in_place();
            scale = clamp_scale(scale * 2.0);
            tracing::trace!(scale, "Halved operands before negation");
        }
        if negate {
            rhs_unit = rhs_unit.complement();
        }

        let (mut unit, overflow) = lhs_unit.overflowing_add(rhs_unit);
        if overflow.any() {
            lhs_unit.halve_in_place();
            rhs_unit.halve_in_place();
            scale = clamp_scale(scale * 2.0);
            unit = lhs_unit.wrapping_add(rhs_unit);
            tracing::trace!(scale, overflowed = overflow.bitcount(), "Halved operands on overflow");
        }

        Self { unit, scale }.standardized()
    }

    /// Multiply every lane by `factor`
    fn scaled_by(self, factor: f64) -> Self {
        if factor == 0.0 || !factor.is_finite() {
            return Self::zero();
        }
        let mut unit = self.unit;
        let mut scale = self.scale;
        if factor < 0.0 {
            if unit.has_min_lanes() {
                unit.halve_in_place();
                scale = clamp_scale(scale * 2.0);
            }
            unit = unit.complement();
        }
        Self {
            unit,
            scale: clamp_scale(scale * factor.abs()),
        }
        .standardized()
    }
}

impl<W: BitWord> Default for ScaledLane<W> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<W: BitWord> Add for ScaledLane<W> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.combine(rhs, false)
    }
}

impl<W: BitWord> Sub for ScaledLane<W> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.combine(rhs, true)
    }
}

impl<W: BitWord> Mul for ScaledLane<W> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            unit: self.unit * rhs.unit,
            scale: clamp_scale(self.scale * rhs.scale),
        }
        .standardized()
    }
}

impl<W: BitWord> Mul<f64> for ScaledLane<W> {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scaled_by(rhs)
    }
}

impl<W: BitWord> Neg for ScaledLane<W> {
    type Output = Self;
    fn neg(self) -> Self {
        self.scaled_by(-1.0)
    }
}

impl<W: BitWord> AddAssign for ScaledLane<W> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<W: BitWord> SubAssign for ScaledLane<W> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<W: BitWord> MulAssign for ScaledLane<W> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<W: BitWord> MulAssign<f64> for ScaledLane<W> {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

/// Lane `i` takes lane `i + k`
impl<W: BitWord> Shl<usize> for ScaledLane<W> {
    type Output = Self;
    fn shl(self, k: usize) -> Self {
        Self {
            unit: self.unit << k,
            scale: self.scale,
        }
        .standardized()
    }
}

/// Lane `i` takes lane `i - k`
impl<W: BitWord> Shr<usize> for ScaledLane<W> {
    type Output = Self;
    fn shr(self, k: usize) -> Self {
        Self {
            unit: self.unit >> k,
            scale: self.scale,
        }
        .standardized()
    }
}

impl<W: BitWord> fmt::Display for ScaledLane<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for lane in 0..W::LANES {
            if lane > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", self.get(lane))?;
        }
        write!(f, "]")
    }
}
