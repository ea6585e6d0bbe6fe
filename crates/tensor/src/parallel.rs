//! Parallel elementwise operations
//!
//! Array elements are independent, so elementwise work can be spread across
//! rayon's thread pool. Results are identical to the sequential operators.

use rayon::prelude::*;

use crate::array::Array;
use crate::tensor::Tensor;

impl<T: Tensor, const N: usize> Array<T, N> {
    /// Elementwise `self + rhs` across the thread pool
    pub fn par_add(&self, rhs: &Self) -> Self {
        tracing::trace!(positions = N, "Parallel add");
        let mut out = self.clone();
        out.items_mut()
            .par_iter_mut()
            .zip(rhs.as_slice().par_iter())
            .for_each(|(item, other)| *item += other.clone());
        out
    }

    /// Elementwise `self * rhs` across the thread pool
    pub fn par_mul(&self, rhs: &Self) -> Self {
        tracing::trace!(positions = N, "Parallel multiply");
        let mut out = self.clone();
        out.items_mut()
            .par_iter_mut()
            .zip(rhs.as_slice().par_iter())
            .for_each(|(item, other)| *item *= other.clone());
        out
    }

    /// Apply `f` to every element across the thread pool
    pub fn par_map<F>(&self, f: F) -> Self
    where
        F: Fn(&T) -> T + Send + Sync,
    {
        tracing::trace!(positions = N, "Parallel map");
        let mut out = self.clone();
        out.items_mut().par_iter_mut().for_each(|item| *item = f(item));
        out
    }
}
