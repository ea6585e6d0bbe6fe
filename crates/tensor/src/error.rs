//! Tensor error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("Size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    #[error("Lane error: {0}")]
    Lane(#[from] bitplane_lanes::LaneError),
}

pub type Result<T> = std::result::Result<T, TensorError>;
