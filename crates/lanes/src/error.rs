//! Lane error types

use bitplane_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaneError {
    #[error("Too many values for lane set: capacity {capacity}, got {got}")]
    TooManyValues { capacity: usize, got: usize },

    #[error("Invalid scale: {0} (must be finite and positive)")]
    InvalidScale(f64),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, LaneError>;
