//! Harness error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Core error: {0}")]
    Core(#[from] bitplane_core::CoreError),

    #[error("Lane error: {0}")]
    Lane(#[from] bitplane_lanes::LaneError),

    #[error("Tensor error: {0}")]
    Tensor(#[from] bitplane_tensor::TensorError),

    #[error("Scenario {scenario} failed: max error {max_error} exceeds tolerance {tolerance}")]
    ToleranceExceeded {
        scenario: String,
        max_error: f64,
        tolerance: f64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
