//! Bitplane Test Harness
//!
//! Exact reference lanes and verification scenarios for checking that the
//! bit-plane engine approximates `f64` arithmetic at its advertised
//! precision.

mod error;
mod pipeline;
mod reference;

pub use error::{HarnessError, Result};
pub use pipeline::{
    compare, product_sum, product_sum_expr, run_suite, shift_scale, shift_scale_expr, stencil,
    stencil_expr, ApproximationReport, ScenarioReport, SUITE_ROWS,
};
pub use reference::ReferenceLanes;
