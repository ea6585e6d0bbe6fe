//! Bit-plane engine verification
//!
//! Runs every scenario on every lane width against exact reference lanes and
//! reports the approximation error.
//!
//! Run with: cargo run -p bitplane-harness --bin bitplane-verify -- [config.toml]

use std::path::PathBuf;

use anyhow::Context;
use bitplane_core::{Bit128, Bit256, Bit32, Bit64, EngineConfig};
use bitplane_harness::{run_suite, ScenarioReport};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scenario input seed when the configuration has none
const DEFAULT_SEED: u64 = 0x5eed;

#[derive(Parser, Debug)]
#[command(name = "bitplane-verify")]
#[command(version)]
#[command(about = "Check bit-plane arithmetic against exact f64 lanes on every width")]
struct Cli {
    /// Engine configuration file (TOML); the environment is used when absent
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitplane=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match cli.config {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::from_env(),
    };
    let seed = config.seed.unwrap_or(DEFAULT_SEED);
    config.install()?;
    tracing::info!("Bitplane verify v{}", env!("CARGO_PKG_VERSION"));

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut reports: Vec<ScenarioReport> = Vec::new();
    reports.extend(run_suite::<Bit32, 32>(&mut rng)?);
    reports.extend(run_suite::<Bit64, 64>(&mut rng)?);
    reports.extend(run_suite::<Bit128, 128>(&mut rng)?);
    reports.extend(run_suite::<Bit256, 256>(&mut rng)?);

    let mut failures = 0;
    for outcome in &reports {
        let report = &outcome.report;
        tracing::info!(
            "{:>12} W={:<3}  max {:.6}  mean {:.6}  tol {:.6}  {}",
            outcome.scenario,
            outcome.lanes,
            report.max_abs_error,
            report.mean_abs_error,
            report.tolerance,
            if report.passed { "ok" } else { "FAILED" }
        );
        if let Err(e) = outcome.check() {
            tracing::error!("{}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} scenarios failed", failures, reports.len());
    }
    tracing::info!("All {} scenarios passed", reports.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_optional() {
        let cli = Cli::try_parse_from(["bitplane-verify"]).unwrap();
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["bitplane-verify", "engine.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("engine.toml")));
    }

    #[test]
    fn test_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["bitplane-verify", "a.toml", "b.toml"]).is_err());
    }
}
