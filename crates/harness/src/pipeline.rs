//! Verification scenarios
//!
//! Each scenario builds bit-plane lane sets from input values, decodes them
//! back, and runs the same generic expression on the lane sets and on exact
//! [`ReferenceLanes`] holding the decoded inputs. Input quantization is
//! therefore excluded and the reports measure arithmetic error only.

use bitplane_core::BitWord;
use bitplane_lanes::{ScaledLane, STEP};
use bitplane_tensor::{ensure_size, Array, Tensor, TensorError};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::error::{HarnessError, Result};
use crate::reference::ReferenceLanes;

/// Levels of slack per unit of magnitude bound in `shift_scale`
const SHIFT_SCALE_STEPS: f64 = 6.0;

/// Levels of slack per unit of magnitude bound in `stencil`
const STENCIL_STEPS: f64 = 12.0;

/// Stencil weights: centre, previous row, next row, previous lane, next lane
const STENCIL_WEIGHTS: [f64; 5] = [0.5, 0.25, 0.25, 0.125, -0.125];

/// Error statistics of an approximate result against a reference
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximationReport {
    /// Largest absolute error
    pub max_abs_error: f64,
    /// Mean absolute error
    pub mean_abs_error: f64,
    /// Largest acceptable absolute error
    pub tolerance: f64,
    /// Whether `max_abs_error <= tolerance`
    pub passed: bool,
}

/// Outcome of one scenario on one lane width
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: &'static str,
    /// Lane width
    pub lanes: usize,
    /// Error statistics
    pub report: ApproximationReport,
}

impl ScenarioReport {
    /// Turn a failed report into an error
    pub fn check(&self) -> Result<()> {
        if self.report.passed {
            return Ok(());
        }
        Err(HarnessError::ToleranceExceeded {
            scenario: format!("{}/{}", self.scenario, self.lanes),
            max_error: self.report.max_abs_error,
            tolerance: self.report.tolerance,
        })
    }
}

/// Compare `actual` against `expected` element by element
pub fn compare(actual: &[f64], expected: &[f64], tolerance: f64) -> Result<ApproximationReport> {
    if actual.len() != expected.len() {
        return Err(TensorError::SizeMismatch {
            expected: expected.len(),
            got: actual.len(),
        }
        .into());
    }
    let errors: Vec<f64> = actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e).abs())
        .collect();
    let max_abs_error = errors.iter().copied().fold(0.0, f64::max);
    let mean_abs_error = if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<f64>() / errors.len() as f64
    };
    Ok(ApproximationReport {
        max_abs_error,
        mean_abs_error,
        tolerance,
        passed: max_abs_error <= tolerance,
    })
}

/// `a * 0.5 + (a lane-shifted b) * 2`
pub fn shift_scale_expr<T: Tensor>(a: &T, b: &T) -> T {
    a.clone() * 0.5 + b.shift_lanes_left(1) * 2.0
}

/// Five-point stencil over rows and lanes, followed by relu
pub fn stencil_expr<T: Tensor, const N: usize>(x: &Array<T, N>) -> Array<T, N> {
    let [centre, up, down, left, right] = STENCIL_WEIGHTS;
    let mut acc = x.clone() * centre;
    acc += x.shallow_shift_right(1) * up;
    acc += x.shallow_shift_left(1) * down;
    acc += x.shift_lanes_right(1) * left;
    acc += x.shift_lanes_left(1) * right;
    acc.relu()
}

/// Sum of the lane products
pub fn product_sum_expr<T: Tensor>(a: &T, b: &T) -> f64 {
    (a.clone() * b.clone()).sum()
}

/// A lane set and its exact twin holding the decoded lane values
fn lane_pair<W: BitWord, const L: usize>(
    values: &[f64],
) -> Result<(ScaledLane<W>, ReferenceLanes<L>)> {
    let lane = ScaledLane::<W>::from_slice(values)?;
    ensure_size(&lane, L)?;
    let reference = ReferenceLanes::from_slice(&lane.to_vec())?;
    Ok((lane, reference))
}

fn peak(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |peak, v| peak.max(v.abs()))
}

/// `a * 0.5 + (b << 1) * 2` on `W`-lane sets
pub fn shift_scale<W: BitWord, const L: usize>(a: &[f64], b: &[f64]) -> Result<ScenarioReport> {
    let (lane_a, ref_a) = lane_pair::<W, L>(a)?;
    let (lane_b, ref_b) = lane_pair::<W, L>(b)?;

    let actual = shift_scale_expr(&lane_a, &lane_b);
    let expected = shift_scale_expr(&ref_a, &ref_b);

    let bound = 2.0 * (0.5 * peak(&ref_a.to_vec()) + 2.0 * peak(&ref_b.to_vec()));
    let report = compare(
        &actual.to_vec(),
        &expected.to_vec(),
        SHIFT_SCALE_STEPS * STEP * bound,
    )?;
    Ok(ScenarioReport {
        scenario: "shift_scale",
        lanes: L,
        report,
    })
}

/// Five-point stencil over `N` rows of `W` lanes
pub fn stencil<W: BitWord, const L: usize, const N: usize>(
    rows: &[Vec<f64>],
) -> Result<ScenarioReport> {
    let mut lanes = Vec::with_capacity(rows.len());
    let mut references = Vec::with_capacity(rows.len());
    for row in rows {
        let (lane, reference) = lane_pair::<W, L>(row)?;
        lanes.push(lane);
        references.push(reference);
    }
    let grid = Array::<ScaledLane<W>, N>::try_from_vec(lanes)?;
    let reference = Array::<ReferenceLanes<L>, N>::try_from_vec(references)?;

    let actual = stencil_expr(&grid);
    let expected = stencil_expr(&reference);

    let magnitude = references_peak(&reference);
    let bound = 2.0 * STENCIL_WEIGHTS.iter().map(|w| w.abs()).sum::<f64>() * magnitude;
    let report = compare(
        &actual.iter().flat_map(|lane| lane.to_vec()).collect::<Vec<_>>(),
        &expected.iter().flat_map(|lane| lane.to_vec()).collect::<Vec<_>>(),
        STENCIL_STEPS * STEP * bound,
    )?;
    Ok(ScenarioReport {
        scenario: "stencil",
        lanes: L,
        report,
    })
}

fn references_peak<const L: usize, const N: usize>(grid: &Array<ReferenceLanes<L>, N>) -> f64 {
    grid.iter().map(|row| peak(&row.to_vec())).fold(0.0, f64::max)
}

/// Sum of lane products; each lane product truncates by under one level
pub fn product_sum<W: BitWord, const L: usize>(a: &[f64], b: &[f64]) -> Result<ScenarioReport> {
    let (lane_a, ref_a) = lane_pair::<W, L>(a)?;
    let (lane_b, ref_b) = lane_pair::<W, L>(b)?;

    let actual = product_sum_expr(&lane_a, &lane_b);
    let expected = product_sum_expr(&ref_a, &ref_b);

    let tolerance = L as f64 * STEP * lane_a.scale() * lane_b.scale();
    let report = compare(&[actual], &[expected], tolerance)?;
    Ok(ScenarioReport {
        scenario: "product_sum",
        lanes: L,
        report,
    })
}

fn random_values(rng: &mut ChaCha20Rng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Rows in the stencil grid used by [`run_suite`]
pub const SUITE_ROWS: usize = 8;

/// Every scenario on `W`-lane sets with random inputs from `rng`
pub fn run_suite<W: BitWord, const L: usize>(rng: &mut ChaCha20Rng) -> Result<Vec<ScenarioReport>> {
    if W::LANES != L {
        return Err(HarnessError::InvalidInput(format!(
            "reference width {} does not match {} lanes",
            L,
            W::LANES
        )));
    }

    let a = random_values(rng, L);
    let b = random_values(rng, L);
    let rows: Vec<Vec<f64>> = (0..SUITE_ROWS).map(|_| random_values(rng, L)).collect();

    let reports = vec![
        shift_scale::<W, L>(&a, &b)?,
        stencil::<W, L, SUITE_ROWS>(&rows)?,
        product_sum::<W, L>(&a, &b)?,
    ];
    for outcome in &reports {
        tracing::debug!(
            scenario = outcome.scenario,
            lanes = outcome.lanes,
            max_abs_error = outcome.report.max_abs_error,
            mean_abs_error = outcome.report.mean_abs_error,
            passed = outcome.report.passed,
            "Scenario finished"
        );
    }
    Ok(reports)
}
