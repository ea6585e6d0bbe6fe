//! Fixed-size arrays of tensors
//!
//! An [`Array`] lifts the element algebra positionally. Nesting arrays gives
//! 2-D and 3-D tensors. Two kinds of shift coexist: the lane shifts `<<`/`>>`
//! act inside every element, the shallow shifts move whole elements between
//! positions. Both zero-fill.

use bitplane_lanes::ScaledLane;
use rand::RngCore;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Shl, Shr, Sub, SubAssign};

use crate::error::{Result, TensorError};
use crate::tensor::Tensor;

/// `N` elements of one tensor type
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T, const N: usize> {
    items: [T; N],
}

/// `CHANNELS` planes of `WIDTH` columns; each column is one `T`
pub type Image<T, const WIDTH: usize, const CHANNELS: usize> = Array<Array<T, WIDTH>, CHANNELS>;

/// Image whose columns are bit-plane lane sets, one lane per row
pub type FastImage<W, const WIDTH: usize, const CHANNELS: usize> =
    Image<ScaledLane<W>, WIDTH, CHANNELS>;

/// Image of exact `f64` values with `HEIGHT` rows
pub type ExactImage<const HEIGHT: usize, const WIDTH: usize, const CHANNELS: usize> =
    Image<Array<f64, HEIGHT>, WIDTH, CHANNELS>;

impl<T, const N: usize> Array<T, N> {
    /// Wrap an array of elements
    pub fn new(items: [T; N]) -> Self {
        Self { items }
    }

    /// Build element `i` with `f(i)`
    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self {
            items: std::array::from_fn(f),
        }
    }

    /// Number of positions
    pub const fn len(&self) -> usize {
        N
    }

    /// True for a zero-length array
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Iterate over the elements
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The elements as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Unwrap into the backing array
    pub fn into_inner(self) -> [T; N] {
        self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [T; N] {
        &mut self.items
    }
}

impl<T: Tensor, const N: usize> Array<T, N> {
    /// Assemble from a vector holding exactly `N` elements
    pub fn try_from_vec(items: Vec<T>) -> Result<Self> {
        let got = items.len();
        let items: [T; N] = items
            .try_into()
            .map_err(|_| TensorError::SizeMismatch { expected: N, got })?;
        Ok(Self { items })
    }

    /// Apply `f` to every element
    pub fn map(&self, mut f: impl FnMut(&T) -> T) -> Self {
        Self::from_fn(|i| f(&self.items[i]))
    }

    /// Add `element` to every position
    pub fn add_element(&self, element: &T) -> Self {
        self.map(|x| x.clone() + element.clone())
    }

    /// Multiply every position by `element`
    pub fn mul_element(&self, element: &T) -> Self {
        self.map(|x| x.clone() * element.clone())
    }

    /// Position `i` takes position `i + k`; the top `k` positions become zero
    pub fn shallow_shift_left(&self, k: usize) -> Self {
        Self::from_fn(|i| match i.checked_add(k) {
            Some(src) if src < N => self.items[src].clone(),
            _ => T::zero(),
        })
    }

    /// Position `i` takes position `i - k`; the bottom `k` positions become zero
    pub fn shallow_shift_right(&self, k: usize) -> Self {
        Self::from_fn(|i| match i.checked_sub(k) {
            Some(src) => self.items[src].clone(),
            None => T::zero(),
        })
    }

    /// Elementwise sum of all positions
    pub fn reduce_sum(&self) -> T {
        self.items
            .iter()
            .cloned()
            .fold(T::zero(), |acc, item| acc + item)
    }
}

impl<T, const N: usize> Index<usize> for Array<T, N> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Array<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<T: Tensor, const N: usize> Tensor for Array<T, N> {
    fn zero() -> Self {
        Self::from_fn(|_| T::zero())
    }

    fn broadcast(value: f64) -> Self {
        Self::from_fn(|_| T::broadcast(value))
    }

    fn random() -> Self {
        Self::from_fn(|_| T::random())
    }

    fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self::from_fn(|_| T::random_with(&mut *rng))
    }

    fn relu_in_place(&mut self) {
        for item in self.items.iter_mut() {
            item.relu_in_place();
        }
    }

    fn sum(&self) -> f64 {
        self.items.iter().map(|item| item.sum()).sum()
    }

    fn absmax(&self) -> f64 {
        self.items.iter().map(|item| item.absmax()).fold(0.0, f64::max)
    }

    fn size(&self) -> usize {
        N
    }

    fn shift_lanes_left(&self, k: usize) -> Self {
        self.map(|item| item.shift_lanes_left(k))
    }

    fn shift_lanes_right(&self, k: usize) -> Self {
        self.map(|item| item.shift_lanes_right(k))
    }
}

impl<T: Tensor, const N: usize> Add for Array<T, N> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<T: Tensor, const N: usize> Sub for Array<T, N> {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<T: Tensor, const N: usize> Mul for Array<T, N> {
    type Output = Self;
    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

impl<T: Tensor, const N: usize> Mul<f64> for Array<T, N> {
    type Output = Self;
    fn mul(mut self, rhs: f64) -> Self {
        self *= rhs;
        self
    }
}

impl<'a, T: Tensor, const N: usize> Add<&'a Array<T, N>> for &'a Array<T, N> {
    type Output = Array<T, N>;
    fn add(self, rhs: Self) -> Array<T, N> {
        Array::from_fn(|i| self.items[i].clone() + rhs.items[i].clone())
    }
}

impl<'a, T: Tensor, const N: usize> Sub<&'a Array<T, N>> for &'a Array<T, N> {
    type Output = Array<T, N>;
    fn sub(self, rhs: Self) -> Array<T, N> {
        Array::from_fn(|i| self.items[i].clone() - rhs.items[i].clone())
    }
}

impl<'a, T: Tensor, const N: usize> Mul<&'a Array<T, N>> for &'a Array<T, N> {
    type Output = Array<T, N>;
    fn mul(self, rhs: Self) -> Array<T, N> {
        Array::from_fn(|i| self.items[i].clone() * rhs.items[i].clone())
    }
}

impl<'a, T: Tensor, const N: usize> Mul<f64> for &'a Array<T, N> {
    type Output = Array<T, N>;
    fn mul(self, rhs: f64) -> Array<T, N> {
        self.map(|item| item.clone() * rhs)
    }
}

impl<T: Tensor, const N: usize> AddAssign for Array<T, N> {
    fn add_assign(&mut self, rhs: Self) {
        for (item, other) in self.items.iter_mut().zip(rhs.items) {
            *item += other;
        }
    }
}

impl<T: Tensor, const N: usize> SubAssign for Array<T, N> {
    fn sub_assign(&mut self, rhs: Self) {
        for (item, other) in self.items.iter_mut().zip(rhs.items) {
            *item -= other;
        }
    }
}

impl<T: Tensor, const N: usize> MulAssign for Array<T, N> {
    fn mul_assign(&mut self, rhs: Self) {
        for (item, other) in self.items.iter_mut().zip(rhs.items) {
            *item *= other;
        }
    }
}

impl<T: Tensor, const N: usize> MulAssign<f64> for Array<T, N> {
    fn mul_assign(&mut self, rhs: f64) {
        for item in self.items.iter_mut() {
            *item *= rhs;
        }
    }
}

impl<T: Tensor, const N: usize> Shl<usize> for Array<T, N> {
    type Output = Self;
    fn shl(self, k: usize) -> Self {
        self.shift_lanes_left(k)
    }
}

impl<T: Tensor, const N: usize> Shr<usize> for Array<T, N> {
    type Output = Self;
    fn shr(self, k: usize) -> Self {
        self.shift_lanes_right(k)
    }
}

impl<T: fmt::Display, const N: usize> fmt::Display for Array<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitplane_core::Bit32;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    type Lane = ScaledLane<Bit32>;

    fn ramp<const N: usize>() -> Array<f64, N> {
        Array::from_fn(|i| i as f64 + 1.0)
    }

    #[test]
    fn test_elementwise_ops() {
        let a: Array<f64, 4> = ramp();
        let b = Array::<f64, 4>::broadcast(2.0);
        assert_eq!((&a + &b).into_inner(), [3.0, 4.0, 5.0, 6.0]);
        assert_eq!((&a - &b).into_inner(), [-1.0, 0.0, 1.0, 2.0]);
        assert_eq!((&a * &b).into_inner(), [2.0, 4.0, 6.0, 8.0]);
        assert_eq!((&a * 0.5).into_inner(), [0.5, 1.0, 1.5, 2.0]);
        assert_eq!(a.clone() + b.clone(), &a + &b);

        let mut c = a.clone();
        c += b.clone();
        c -= a.clone();
        c *= b;
        c *= 0.25;
        assert_eq!(c.into_inner(), [1.0; 4]);
    }

    #[test]
    fn test_element_forms() {
        let a: Array<f64, 3> = ramp();
        assert_eq!(a.add_element(&1.0).into_inner(), [2.0, 3.0, 4.0]);
        assert_eq!(a.mul_element(&-1.0).into_inner(), [-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_shallow_shifts_zero_fill() {
        let a: Array<f64, 5> = ramp();
        assert_eq!(a.shallow_shift_left(2).into_inner(), [3.0, 4.0, 5.0, 0.0, 0.0]);
        assert_eq!(a.shallow_shift_right(2).into_inner(), [0.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(a.shallow_shift_left(0), a);
        assert_eq!(a.shallow_shift_left(5), Array::zero());
        assert_eq!(a.shallow_shift_right(usize::MAX), Array::zero());
        assert_eq!(a.shallow_shift_left(usize::MAX), Array::zero());
    }

    #[test]
    fn test_left_then_right_restores_tail() {
        let a = Array::<Lane, 6>::broadcast(0.75);
        let k = 2;
        let back = a.shallow_shift_left(k).shallow_shift_right(k);
        for i in 0..k {
            assert_eq!(back[i].sum(), 0.0);
        }
        for i in k..6 {
            assert_eq!(back[i], a[i]);
        }
    }

    #[test]
    fn test_reduce_sum() {
        let a: Array<f64, 4> = ramp();
        assert_eq!(a.reduce_sum(), 10.0);
        assert_eq!(a.sum(), 10.0);

        let lanes = Array::<Lane, 3>::broadcast(0.5);
        let total = lanes.reduce_sum();
        assert_eq!(total.get(0), 1.5);
        assert_eq!(lanes.sum(), 48.0);
    }

    #[test]
    fn test_relu_positional() {
        let a = Array::new([-1.0, 2.0, -3.0]);
        assert_eq!(Tensor::relu(&a).into_inner(), [0.0, 2.0, 0.0]);
        assert_eq!(Tensor::absmax(&a), 3.0);
        let mut b = a;
        b.relu_in_place();
        assert_eq!(Tensor::relu(&b), b);
    }

    #[test]
    fn test_lane_shifts_delegate() {
        let mut lane = Lane::zero();
        lane.set(1, 0.5);
        let a = Array::<Lane, 2>::new([lane, lane]);
        let left = a.clone() << 1;
        assert_eq!(left[0].get(0), 0.5);
        assert_eq!(left[1].get(1), 0.0);
        let right = a >> 1;
        assert_eq!(right[1].get(2), 0.5);
    }

    #[test]
    fn test_nested_arrays() {
        let grid = Array::<Array<f64, 3>, 2>::broadcast(1.5);
        assert_eq!(grid.sum(), 9.0);
        assert_eq!(grid.size(), 2);
        assert_eq!(grid[1].size(), 3);
        let shifted = grid.shallow_shift_left(1);
        assert_eq!(shifted.sum(), 4.5);
    }

    #[test]
    fn test_image_shapes() {
        let fast = FastImage::<Bit32, 3, 2>::broadcast(0.5);
        assert_eq!(fast.size(), 2);
        assert_eq!(fast[0].size(), 3);
        assert_eq!(fast[0][0].size(), 32);
        assert_eq!(fast.sum(), 96.0);

        let exact = ExactImage::<4, 3, 2>::broadcast(-1.0);
        assert_eq!(exact[1][2].size(), 4);
        assert_eq!(exact.sum(), -24.0);
        assert_eq!(exact.absmax(), 1.0);
        assert_eq!(exact.relu().sum(), 0.0);
    }

    #[test]
    fn test_try_from_vec() {
        let a = Array::<f64, 3>::try_from_vec(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(a[2], 3.0);
        let err = Array::<f64, 3>::try_from_vec(vec![1.0]).unwrap_err();
        assert!(matches!(err, TensorError::SizeMismatch { expected: 3, got: 1 }));
    }

    #[test]
    fn test_random_with_is_deterministic() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let a = Array::<Lane, 4>::random_with(&mut rng);
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let b = Array::<Lane, 4>::random_with(&mut rng);
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn test_display() {
        let a = Array::new([1.0, 0.5]);
        assert_eq!(a.to_string(), "[1,0.5]");
        let nested = Array::new([a.clone(), a]);
        assert_eq!(nested.to_string(), "[[1,0.5],[1,0.5]]");
    }
}
