use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::FilterError;

/// Generates white noise test data for correlated noise cancellation.
///
/// A common noise signal `c(n)` is present in every witness channel and in
/// the target. Each witness channel additionally carries its own uncorrelated
/// sensor noise:
///
/// ```text
/// witness_i(n) = (c(n) + witness_noise_level_i · s_i(n)) · transfer_function
/// target(n)    =  c(n) + target_noise_level · s_t(n)
/// ```
///
/// All noise sources have an amplitude spectral density of one at the given
/// sample rate. The channel count is the length of `witness_noise_level`.
#[derive(Debug, Clone)]
pub struct CorrelatedNoiseGenerator {
    witness_noise_level: Vec<f64>,
    target_noise_level: f64,
    transfer_function: f64,
    noise: Normal<f64>,
}

impl CorrelatedNoiseGenerator {
    pub fn new(witness_noise_level: Vec<f64>) -> Result<Self, FilterError> {
        CorrelatedNoiseGenerator::from_options(witness_noise_level, 0.0, 1.0, 1.0)
    }

    pub fn from_options(
        witness_noise_level: Vec<f64>,
        target_noise_level: f64,
        transfer_function: f64,
        sample_rate: f64,
    ) -> Result<Self, FilterError> {
        if witness_noise_level.is_empty() {
            return Err(FilterError::InvalidGenerator(
                "at least one witness noise level is required",
            ));
        }
        let is_level = |level: &f64| level.is_finite() && *level >= 0.0;
        if !witness_noise_level.iter().all(is_level) || !is_level(&target_noise_level) {
            return Err(FilterError::InvalidGenerator(
                "noise levels must be finite and not negative",
            ));
        }
        if !transfer_function.is_finite() {
            return Err(FilterError::InvalidGenerator("transfer function must be finite"));
        }
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(FilterError::InvalidGenerator("sample rate must be positive"));
        }

        let noise = Normal::new(0.0, 1.0 / sample_rate.sqrt())
            .map_err(|_| FilterError::InvalidGenerator("sample rate must be positive"))?;

        Ok(CorrelatedNoiseGenerator {
            witness_noise_level,
            target_noise_level,
            transfer_function,
            noise,
        })
    }

    pub fn n_channel(&self) -> usize {
        self.witness_noise_level.len()
    }

    /// Generates `n_samples` of witness (`channel × sample`) and target data.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, n_samples: usize) -> (Array2<f64>, Vec<f64>) {
        let common: Vec<f64> = (0..n_samples).map(|_| self.noise.sample(rng)).collect();

        let mut witness = Array2::zeros((self.n_channel(), n_samples));
        for (mut channel, level) in witness.outer_iter_mut().zip(self.witness_noise_level.iter()) {
            for (value, c) in channel.iter_mut().zip(common.iter()) {
                *value = (c + level * self.noise.sample(rng)) * self.transfer_function;
            }
        }

        let target = common
            .iter()
            .map(|c| c + self.target_noise_level * self.noise.sample(rng))
            .collect();

        (witness, target)
    }

    /// Like `generate()`, using a [`StdRng`] seeded with `seed`.
    pub fn generate_seeded(&self, n_samples: usize, seed: u64) -> (Array2<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(&mut rng, n_samples)
    }
}
