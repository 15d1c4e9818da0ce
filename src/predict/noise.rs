use anyhow::{Context, Result};
use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Number of binomial trials for sequencer noise, matching a read depth of
/// 3000 reads per base.
pub const NOISE_TRIALS: u64 = 3000;

/// Add binomial sequencer noise to a probability signal.
///
/// Each entry gets an independent `Binomial(n, p)` draw divided by `n` added
/// to it, i.e. the fraction of n reads that a sequencer with per-read error
/// rate p would misreport.
pub fn add_binomial_noise<R: Rng>(signal: &[f64], n: u64, p: f64, rng: &mut R) -> Result<Vec<f64>> {
    let dist = Binomial::new(n, p)
        .with_context(|| format!("invalid binomial noise parameters n={}, p={}", n, p))?;
    Ok(signal
        .iter()
        .map(|&s| s + dist.sample(rng) as f64 / n as f64)
        .collect())
}
