//! Bitplane Integration Tests
//!
//! Properties of the engine checked across every lane width, plus the
//! verification scenarios end to end.

use bitplane_core::{Bit128, Bit256, Bit32, Bit64, BitWord, EngineConfig};
use bitplane_harness::{run_suite, shift_scale_expr, ReferenceLanes};
use bitplane_lanes::{Fast32, Fast64, ScaledLane, Unit4, STEP};
use bitplane_tensor::{Array, Tensor};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn random_values(rng: &mut ChaCha20Rng, n: usize, magnitude: f64) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-magnitude..magnitude)).collect()
}

fn is_standard<W: BitWord>(lane: &ScaledLane<W>) -> bool {
    let peak = lane.unit().absmax();
    lane.unit().is_zero() || (0.5..=1.0).contains(&peak)
}

// =============================================================================
// Section 1: Encoding
// =============================================================================

mod encoding_tests {
    use super::*;

    fn check_decode_within_step<W: BitWord>(seed: u64) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for magnitude in [1e-3, 0.9, 17.0, 5e4] {
            let values = random_values(&mut rng, W::LANES, magnitude);
            let peak = values.iter().fold(0.0f64, |p, v| p.max(v.abs()));
            let lane = ScaledLane::<W>::from_slice(&values).unwrap();
            // Encoding happens at scale 2 * peak
            let step = STEP * 2.0 * peak;
            for (i, &v) in values.iter().enumerate() {
                let err = (lane.get(i) - v).abs();
                assert!(
                    err < step,
                    "W={} lane {}: {} decoded as {}, error {}",
                    W::LANES,
                    i,
                    v,
                    lane.get(i),
                    err
                );
            }
        }
    }

    /// decode(encode(v)) stays within one quantization step
    #[test]
    fn test_decode_within_step_all_widths() {
        check_decode_within_step::<Bit32>(1);
        check_decode_within_step::<Bit64>(2);
        check_decode_within_step::<Bit128>(3);
        check_decode_within_step::<Bit256>(4);
    }

    /// The -1 pattern survives encode and decode
    #[test]
    fn test_min_pattern_preserved() {
        let mut unit = Unit4::<Bit64>::ZERO;
        unit.set(5, -1.0);
        assert_eq!(unit.get(5), -1.0);
        assert!(unit.has_min_lanes());
        assert_eq!(unit.absmax(), 1.0);
    }

    /// Rendering lists decoded lanes in order
    #[test]
    fn test_display_lists_lanes() {
        let lane = Fast32::broadcast(0.0);
        let text = lane.to_string();
        assert!(text.starts_with('[') && text.ends_with(']'));
        assert_eq!(text.split(',').count(), 32);
    }
}

// =============================================================================
// Section 2: Arithmetic Properties
// =============================================================================

mod arithmetic_tests {
    use super::*;

    fn check_commutative<W: BitWord>(seed: u64) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for _ in 0..25 {
            let a = ScaledLane::<W>::random_with(&mut rng) * rng.gen_range(0.01..100.0);
            let b = ScaledLane::<W>::random_with(&mut rng) * rng.gen_range(0.01..100.0);
            assert_eq!(a + b, b + a);
            assert_eq!(a * b, b * a);
        }
    }

    /// Addition and multiplication commute bit for bit
    #[test]
    fn test_commutativity_all_widths() {
        check_commutative::<Bit32>(10);
        check_commutative::<Bit64>(11);
        check_commutative::<Bit128>(12);
        check_commutative::<Bit256>(13);
    }

    fn check_renormalized<W: BitWord>(seed: u64) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for _ in 0..25 {
            let a = ScaledLane::<W>::random_with(&mut rng) * rng.gen_range(0.01..100.0);
            let b = ScaledLane::<W>::random_with(&mut rng) * rng.gen_range(0.01..100.0);
            let c = rng.gen_range(-10.0..10.0);
            for result in [a + b, a - b, b - a, a * b, a * c, a << 7, b >> 3, a.relu()] {
                assert!(
                    is_standard(&result),
                    "unit absmax {} after arithmetic",
                    result.unit().absmax()
                );
            }
        }
    }

    /// Every arithmetic result is standardized
    #[test]
    fn test_renormalization_invariant_all_widths() {
        check_renormalized::<Bit32>(20);
        check_renormalized::<Bit64>(21);
        check_renormalized::<Bit128>(22);
        check_renormalized::<Bit256>(23);
    }

    /// relu is idempotent and never negative
    #[test]
    fn test_relu_idempotent() {
        let mut rng = ChaCha20Rng::seed_from_u64(30);
        for _ in 0..25 {
            let x = Fast64::random_with(&mut rng) - Fast64::broadcast(0.25);
            let once = x.relu();
            assert_eq!(once.relu(), once);
            assert!(once.to_vec().iter().all(|&v| v >= 0.0));
        }
    }

    /// Scalar multiplication distributes over addition
    #[test]
    fn test_scalar_distributes() {
        let mut rng = ChaCha20Rng::seed_from_u64(40);
        for _ in 0..25 {
            let a = Fast64::random_with(&mut rng);
            let b = Fast64::random_with(&mut rng) * 0.5;
            for c in [0.75, 3.0, 0.1] {
                let lhs = (a + b) * c;
                let rhs = a * c + b * c;
                let tolerance = 2.0 * STEP * lhs.scale().max(rhs.scale());
                for i in 0..64 {
                    assert!(
                        (lhs.get(i) - rhs.get(i)).abs() <= tolerance,
                        "lane {}: {} vs {}",
                        i,
                        lhs.get(i),
                        rhs.get(i)
                    );
                }
            }
        }
    }

    /// Sums of a large and a much smaller operand keep the large one
    #[test]
    fn test_mixed_scale_addition() {
        let big = Fast32::broadcast(1000.0);
        let small = Fast32::broadcast(0.001);
        let sum = big + small;
        assert_eq!(sum.get(0), 1000.0);
        assert_eq!((small + big), sum);
    }
}

// =============================================================================
// Section 3: Reductions & Random
// =============================================================================

mod reduction_tests {
    use super::*;

    fn check_zero_sum<W: BitWord>() {
        assert_eq!(ScaledLane::<W>::broadcast(0.0).sum(), 0.0);
        assert_eq!(ScaledLane::<W>::zero().sum(), 0.0);
    }

    /// broadcast(0).sum() is exactly zero
    #[test]
    fn test_zero_broadcast_sums_to_zero() {
        check_zero_sum::<Bit32>();
        check_zero_sum::<Bit64>();
        check_zero_sum::<Bit128>();
        check_zero_sum::<Bit256>();
    }

    fn check_random_within_scale<W: BitWord>() {
        for _ in 0..10 {
            let lane = ScaledLane::<W>::random();
            assert!(lane.to_vec().iter().all(|v| v.abs() <= lane.scale()));
            assert!(lane.absmax() <= lane.scale());
        }
    }

    /// Random lanes never decode beyond their scale
    #[test]
    fn test_random_within_scale_all_widths() {
        check_random_within_scale::<Bit32>();
        check_random_within_scale::<Bit64>();
        check_random_within_scale::<Bit128>();
        check_random_within_scale::<Bit256>();
    }

    /// Lane sums match the decoded values
    #[test]
    fn test_sum_matches_decoded_lanes() {
        let mut rng = ChaCha20Rng::seed_from_u64(50);
        let lane = ScaledLane::<Bit256>::random_with(&mut rng) * 7.0;
        let decoded: f64 = lane.to_vec().iter().sum();
        assert!((lane.sum() - decoded).abs() < 1e-9);
    }
}

// =============================================================================
// Section 4: Container Algebra
// =============================================================================

mod container_tests {
    use super::*;

    /// Left then right by k restores [k, N) and zero-fills [0, k)
    #[test]
    fn test_shallow_shift_zero_fill() {
        let a = Array::<Fast32, 8>::broadcast(0.6);
        for k in 0..=8 {
            let back = a.shallow_shift_left(k).shallow_shift_right(k);
            for i in 0..8 {
                if i < k {
                    assert!(back[i].unit().is_zero(), "k={} i={}", k, i);
                } else {
                    assert_eq!(back[i], a[i], "k={} i={}", k, i);
                }
            }
        }
    }

    /// a * 0.5 + (b << 1) * 2 on lane sets assembled lane by lane
    #[test]
    fn test_shift_scale_scenario() {
        let mut a = Fast32::zero();
        for (i, v) in [1.0, 0.5, 0.25, 1.25].into_iter().enumerate() {
            a.set(i, v);
        }
        let mut b = Fast32::zero();
        for i in 0..4 {
            b.set(i, 0.5);
        }

        let result = a * 0.5 + (b << 1) * 2.0;
        assert_eq!(result.get(0), 1.5);

        let expected = [1.25, 1.125, 0.625];
        for (i, e) in expected.into_iter().enumerate() {
            let lane = i + 1;
            assert!((result.get(lane) - e).abs() <= 2.0 * STEP * result.scale());
        }
    }

    /// Generic expressions agree between lane sets and exact lanes
    #[test]
    fn test_generic_expression_against_reference() {
        let values_a = [0.5, -0.25, 0.75, 0.0];
        let values_b = [0.25, 0.5, -0.5, 0.125];
        let a = Fast32::from_slice(&values_a).unwrap();
        let b = Fast32::from_slice(&values_b).unwrap();
        let ref_a = ReferenceLanes::<32>::from_slice(&a.to_vec()).unwrap();
        let ref_b = ReferenceLanes::<32>::from_slice(&b.to_vec()).unwrap();

        let actual = shift_scale_expr(&a, &b);
        let expected = shift_scale_expr(&ref_a, &ref_b);
        for i in 0..32 {
            assert!(
                (actual.get(i) - expected.get(i)).abs() <= 2.0 * STEP * actual.scale(),
                "lane {}",
                i
            );
        }
    }

    /// Reduction folds positions through lane-set addition
    #[test]
    fn test_reduce_sum_of_grid() {
        let grid = Array::<Fast64, 4>::broadcast(0.25);
        let total = grid.reduce_sum();
        assert_eq!(total.get(0), 1.0);
        assert_eq!(grid.sum(), 64.0);
    }

    /// Parallel elementwise forms agree with the sequential operators
    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = ChaCha20Rng::seed_from_u64(60);
        let a = Array::<Fast64, 32>::random_with(&mut rng);
        let b = Array::<Fast64, 32>::random_with(&mut rng);
        assert_eq!(a.par_add(&b), &a + &b);
        assert_eq!(a.par_mul(&b), &a * &b);
        assert_eq!(a.par_map(|x| x.relu()), Tensor::relu(&a));
    }
}

// =============================================================================
// Section 5: Verification Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    /// Every scenario passes on every width with seeded inputs
    #[test]
    fn test_suite_passes_all_widths() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
        let mut reports = Vec::new();
        reports.extend(run_suite::<Bit32, 32>(&mut rng).unwrap());
        reports.extend(run_suite::<Bit64, 64>(&mut rng).unwrap());
        reports.extend(run_suite::<Bit128, 128>(&mut rng).unwrap());
        reports.extend(run_suite::<Bit256, 256>(&mut rng).unwrap());

        assert_eq!(reports.len(), 12);
        for outcome in &reports {
            assert!(
                outcome.check().is_ok(),
                "{} W={}: {:?}",
                outcome.scenario,
                outcome.lanes,
                outcome.report
            );
        }
    }
}

// =============================================================================
// Section 6: Configuration
// =============================================================================

mod config_tests {
    use super::*;

    /// A configuration file drives broadcast's starting scale
    #[test]
    fn test_config_file_drives_broadcast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bitplane.toml");
        std::fs::write(&path, "initial_scale_exponent = 4\nseed = 3\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.initial_scale(), 16.0);

        // 3.0 fits the starting scale of 16 and is encoded there, then standardized
        let lane = ScaledLane::<Bit32>::broadcast_with(3.0, &config).unwrap();
        assert!((lane.get(0) - 3.0).abs() <= STEP * 16.0);
        assert!(is_standard(&lane));
    }
}
