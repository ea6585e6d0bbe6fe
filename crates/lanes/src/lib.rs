//! Bitplane Lanes
//!
//! Bit-sliced 4-bit lane arithmetic and the block floating-point wrapper
//! built on it.
//!
//! A [`Unit4`] holds W signed nibbles as four bit-planes and implements
//! add, subtract, multiply, shift, relu and reductions as boolean circuits.
//! A [`ScaledLane`] attaches one shared scale factor so the lanes can
//! represent arbitrary magnitudes at 4-bit relative precision.

mod error;
mod scaled;
mod unit4;

pub use error::{LaneError, Result};
pub use scaled::ScaledLane;
pub use unit4::{quantize, Unit4, MAX_LEVEL, MIN_LEVEL, STEP};

use bitplane_core::{Bit128, Bit256, Bit32, Bit64};

/// 32 scaled lanes
pub type Fast32 = ScaledLane<Bit32>;
/// 64 scaled lanes
pub type Fast64 = ScaledLane<Bit64>;
/// 128 scaled lanes
pub type Fast128 = ScaledLane<Bit128>;
/// 256 scaled lanes
pub type Fast256 = ScaledLane<Bit256>;
