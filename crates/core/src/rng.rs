//! Per-width lane generators
//!
//! Each lane width owns one `ChaCha20Rng`, created on first use and seeded
//! from [`EngineConfig::global`]. With a configured seed the stream for width
//! `W` is seeded with `seed ^ W`, so widths never share a stream. Scalar
//! draws use width 1.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::config::EngineConfig;

static RNG_SCALAR: Lazy<Mutex<ChaCha20Rng>> = Lazy::new(|| seeded(1));
static RNG_32: Lazy<Mutex<ChaCha20Rng>> = Lazy::new(|| seeded(32));
static RNG_64: Lazy<Mutex<ChaCha20Rng>> = Lazy::new(|| seeded(64));
static RNG_128: Lazy<Mutex<ChaCha20Rng>> = Lazy::new(|| seeded(128));
static RNG_256: Lazy<Mutex<ChaCha20Rng>> = Lazy::new(|| seeded(256));

fn seeded(lanes: u64) -> Mutex<ChaCha20Rng> {
    let rng = generator(EngineConfig::global().seed, lanes);
    tracing::debug!(lanes, "Seeded lane generator");
    Mutex::new(rng)
}

fn generator(seed: Option<u64>, lanes: u64) -> ChaCha20Rng {
    match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed ^ lanes),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Run `f` with exclusive access to the generator for `lanes`-wide words.
///
/// `lanes == 1` selects the scalar generator. Widths other than
/// 1/32/64/128 share the 256-lane generator.
pub fn with_lane_rng<T>(lanes: usize, f: impl FnOnce(&mut ChaCha20Rng) -> T) -> T {
    let cell: &Mutex<ChaCha20Rng> = match lanes {
        1 => &RNG_SCALAR,
        32 => &RNG_32,
        64 => &RNG_64,
        128 => &RNG_128,
        _ => &RNG_256,
    };
    let mut rng = cell.lock();
    f(&mut rng)
}
