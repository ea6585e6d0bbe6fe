//! Exact reference lanes
//!
//! [`ReferenceLanes`] holds `L` lanes as plain `f64` values and implements
//! [`Tensor`] with the same lane-shift convention as a bit-plane lane set.
//! Generic scenario code can therefore run unchanged on both and the results
//! compared lane by lane.

use bitplane_lanes::LaneError;
use bitplane_tensor::{Array, Tensor};
use rand::RngCore;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use crate::error::Result;

/// `L` exact lanes
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLanes<const L: usize> {
    lanes: Array<f64, L>,
}

impl<const L: usize> ReferenceLanes<L> {
    /// Lanes holding `values` first and zero elsewhere
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() > L {
            return Err(LaneError::TooManyValues {
                capacity: L,
                got: values.len(),
            }
            .into());
        }
        Ok(Self {
            lanes: Array::from_fn(|i| values.get(i).copied().unwrap_or(0.0)),
        })
    }

    /// Value of lane `lane`
    pub fn get(&self, lane: usize) -> f64 {
        self.lanes[lane]
    }

    /// All lane values
    pub fn to_vec(&self) -> Vec<f64> {
        self.lanes.as_slice().to_vec()
    }
}

impl<const L: usize> Tensor for ReferenceLanes<L> {
    fn zero() -> Self {
        Self {
            lanes: Array::zero(),
        }
    }

    fn broadcast(value: f64) -> Self {
        Self {
            lanes: Array::broadcast(value),
        }
    }

    fn random() -> Self {
        Self {
            lanes: Array::random(),
        }
    }

    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self {
            lanes: Array::random_with(rng),
        }
    }

    fn relu_in_place(&mut self) {
        self.lanes.relu_in_place();
    }

    fn sum(&self) -> f64 {
        self.lanes.sum()
    }

    fn absmax(&self) -> f64 {
        self.lanes.absmax()
    }

    fn size(&self) -> usize {
        L
    }

    fn shift_lanes_left(&self, k: usize) -> Self {
        Self {
            lanes: self.lanes.shallow_shift_left(k),
        }
    }

    fn shift_lanes_right(&self, k: usize) -> Self {
        Self {
            lanes: self.lanes.shallow_shift_right(k),
        }
    }
}

impl<const L: usize> Add for ReferenceLanes<L> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            lanes: self.lanes + rhs.lanes,
        }
    }
}

impl<const L: usize> Sub for ReferenceLanes<L> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            lanes: self.lanes - rhs.lanes,
        }
    }
}

impl<const L: usize> Mul for ReferenceLanes<L> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            lanes: self.lanes * rhs.lanes,
        }
    }
}

impl<const L: usize> Mul<f64> for ReferenceLanes<L> {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            lanes: self.lanes * rhs,
        }
    }
}

impl<const L: usize> AddAssign for ReferenceLanes<L> {
    fn add_assign(&mut self, rhs: Self) {
        self.lanes += rhs.lanes;
    }
}

impl<const L: usize> SubAssign for ReferenceLanes<L> {
    fn sub_assign(&mut self, rhs: Self) {
        self.lanes -= rhs.lanes;
    }
}

impl<const L: usize> MulAssign for ReferenceLanes<L> {
    fn mul_assign(&mut self, rhs: Self) {
        self.lanes *= rhs.lanes;
    }
}

impl<const L: usize> MulAssign<f64> for ReferenceLanes<L> {
    fn mul_assign(&mut self, rhs: f64) {
        self.lanes *= rhs;
    }
}
