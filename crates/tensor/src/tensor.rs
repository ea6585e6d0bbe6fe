//! The tensor capability set
//!
//! Anything a layer combinator needs from an element: construction,
//! elementwise algebra, lane shifts, relu and reduction. [`ScaledLane`] is
//! the bit-plane element, `f64` the double-precision reference element, and
//! [`Array`](crate::Array) lifts both positionally.

use bitplane_core::{with_lane_rng, BitWord};
use bitplane_lanes::ScaledLane;
use rand::{Rng, RngCore};
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use crate::error::{Result, TensorError};

/// Elementwise numeric algebra shared by lane sets and arrays of them
pub trait Tensor:
    Clone
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + MulAssign<f64>
{
    /// All zeros
    fn zero() -> Self;

    /// Every scalar set to `value`
    fn broadcast(value: f64) -> Self;

    /// Random contents from the process-wide generators
    fn random() -> Self;

    /// Random contents drawn from `rng`
    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self;

    /// Negative scalars become zero, in place
    fn relu_in_place(&mut self);

    /// Sum of every scalar
    fn sum(&self) -> f64;

    /// Largest absolute value of any lane
    fn absmax(&self) -> f64;

    /// Number of slots at this level (lanes, or array positions)
    fn size(&self) -> usize;

    /// Lane `i` takes lane `i + k`, zero-filling the top
    fn shift_lanes_left(&self, k: usize) -> Self;

    /// Lane `i` takes lane `i - k`, zero-filling the bottom
    fn shift_lanes_right(&self, k: usize) -> Self;

    /// Negative scalars become zero
    fn relu(&self) -> Self {
        let mut out = self.clone();
        out.relu_in_place();
        out
    }
}

/// Check a tensor's size at an assembly boundary
pub fn ensure_size<T: Tensor>(tensor: &T, expected: usize) -> Result<()> {
    let got = tensor.size();
    if got != expected {
        return Err(TensorError::SizeMismatch { expected, got });
    }
    Ok(())
}

impl<W: BitWord> Tensor for ScaledLane<W> {
    fn zero() -> Self {
        ScaledLane::zero()
    }

    fn broadcast(value: f64) -> Self {
        ScaledLane::broadcast(value)
    }

    fn random() -> Self {
        ScaledLane::random()
    }

    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        ScaledLane::random_with(rng)
    }

    fn relu_in_place(&mut self) {
        ScaledLane::relu_in_place(self)
    }

    fn sum(&self) -> f64 {
        ScaledLane::sum(self)
    }

    fn absmax(&self) -> f64 {
        ScaledLane::absmax(self)
    }

    fn size(&self) -> usize {
        ScaledLane::size(self)
    }

    fn shift_lanes_left(&self, k: usize) -> Self {
        *self << k
    }

    fn shift_lanes_right(&self, k: usize) -> Self {
        *self >> k
    }

    fn relu(&self) -> Self {
        ScaledLane::relu(*self)
    }
}

/// A single exact lane
impl Tensor for f64 {
    fn zero() -> Self {
        0.0
    }

    fn broadcast(value: f64) -> Self {
        value
    }

    fn random() -> Self {
        with_lane_rng(1, |rng| rng.gen())
    }

    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        rng.gen()
    }

    fn relu_in_place(&mut self) {
        *self = self.max(0.0);
    }

    fn sum(&self) -> f64 {
        *self
    }

    fn absmax(&self) -> f64 {
        self.abs()
    }

    fn size(&self) -> usize {
        1
    }

    fn shift_lanes_left(&self, k: usize) -> Self {
        if k == 0 {
            *self
        } else {
            0.0
        }
    }

    fn shift_lanes_right(&self, k: usize) -> Self {
        self.shift_lanes_left(k)
    }
}
