//! Bitplane Tensor
//!
//! Fixed-size container algebra over bit-plane lane sets.
//!
//! [`Tensor`] is the capability set layer code relies on (construction,
//! elementwise algebra, lane shifts, relu, reduction). It is implemented by
//! [`ScaledLane`](bitplane_lanes::ScaledLane), by `f64` as an exact
//! reference element, and by [`Array`], which nests to build 2-D and 3-D
//! tensors.

mod array;
mod error;
mod parallel;
mod tensor;

pub use array::{Array, ExactImage, FastImage, Image};
pub use error::{Result, TensorError};
pub use tensor::{ensure_size, Tensor};
