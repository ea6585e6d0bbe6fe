//! Bitplane Core
//!
//! Fixed-width bit-plane words and the process-wide state shared by the
//! bit-sliced numeric engine.
//!
//! # Architecture
//!
//! A backend word holds one bit of every lane of a lane set. Arithmetic
//! circuits in `bitplane-lanes` are written once against [`BitWord`] and
//! instantiated for every width:
//!
//! | Word | Lanes | Storage |
//! |------|-------|---------|
//! | [`Bit32`] | 32 | `u32` |
//! | [`Bit64`] | 64 | `u64` |
//! | [`Bit128`] | 128 | `u128`, popcount over two 64-bit halves |
//! | [`Bit256`] | 256 | `__m256i` with AVX2, otherwise two 128-bit halves |
//!
//! Every operation on a word is lane-independent apart from lane indexing
//! and the zero-filling lane shifts.

pub mod backend;
pub mod config;
pub mod error;
pub mod rng;

pub use backend::{Bit128, Bit256, Bit32, Bit64, BitWord};
pub use config::{EngineConfig, DEFAULT_SCALE_EXPONENT, MAX_SCALE_EXPONENT, MIN_SCALE_EXPONENT};
pub use error::{CoreError, Result};
pub use rng::with_lane_rng;
