// External crates
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors produced while synthesizing a waveform
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("num_points must be greater than zero")]
    EmptyGrid,

    #[error("invalid sample range: xmin {xmin} must be less than xmax {xmax}")]
    InvalidRange { xmin: f64, xmax: f64 },

    #[error("noise_std must be non-negative, got {0}")]
    InvalidNoise(f64),
}

/// Configuration for the synthetic waveform
///
/// The generated signal is `amplitude * sin(frequency * x + phase) + trend * x`
/// sampled on a uniform grid over `[xmin, xmax)`, with optional additive
/// Gaussian noise on every sample.
#[derive(Debug, Clone)]
pub struct WaveformConfig {
    pub xmin: f64,
    pub xmax: f64,
    pub num_points: usize,
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    /// Standard deviation of the additive Gaussian noise (0.0 disables noise)
    pub noise_std: f64,
    /// Slope of the linear trend added on top of the sine
    pub trend: f64,
    /// Seed for the noise generator; `None` draws a fresh seed per run
    pub seed: Option<u64>,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            xmin: 0.0,
            xmax: 50.0,
            num_points: 500,
            amplitude: 1.0,
            frequency: 1.0,
            phase: 0.0,
            noise_std: 0.05,
            trend: 0.0,
            seed: None,
        }
    }
}

/// A sampled synthetic waveform
///
/// Holds the sample grid, the (possibly noisy) observed values, and the
/// configuration, so that noise-free ground truth can be re-evaluated at any
/// coordinate for forecast comparison.
#[derive(Debug, Clone)]
pub struct Waveform {
    config: WaveformConfig,
    xs: Vec<f64>,
    values: Vec<f64>,
    resolution: f64,
}

impl Waveform {
    /// Generate a waveform from the given configuration
    pub fn generate(config: WaveformConfig) -> Result<Self, SignalError> {
        if config.num_points == 0 {
            return Err(SignalError::EmptyGrid);
        }
        if config.xmax <= config.xmin {
            return Err(SignalError::InvalidRange {
                xmin: config.xmin,
                xmax: config.xmax,
            });
        }
        if config.noise_std < 0.0 {
            return Err(SignalError::InvalidNoise(config.noise_std));
        }

        let resolution = (config.xmax - config.xmin) / config.num_points as f64;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut xs = Vec::with_capacity(config.num_points);
        let mut values = Vec::with_capacity(config.num_points);
        for i in 0..config.num_points {
            let x = config.xmin + i as f64 * resolution;
            let noise = if config.noise_std > 0.0 {
                gaussian(&mut rng) * config.noise_std
            } else {
                0.0
            };
            xs.push(x);
            values.push(eval_truth(&config, x) + noise);
        }

        Ok(Self {
            config,
            xs,
            values,
            resolution,
        })
    }

    /// Noise-free signal value at a single coordinate
    pub fn ground_truth(&self, x: f64) -> f64 {
        eval_truth(&self.config, x)
    }

    /// Noise-free signal values over a slice of coordinates
    pub fn ground_truth_series(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.ground_truth(x)).collect()
    }

    /// Spacing between consecutive samples
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    /// Time-ordered split of the observed values at `train_ratio`
    ///
    /// Returns `(train, test)` slices; the test slice is the chronological
    /// tail, never a shuffled sample.
    pub fn split_at_ratio(&self, train_ratio: f64) -> (&[f64], &[f64]) {
        let split = ((self.values.len() as f64) * train_ratio.clamp(0.0, 1.0)) as usize;
        self.values.split_at(split)
    }
}

fn eval_truth(config: &WaveformConfig, x: f64) -> f64 {
    config.amplitude * (config.frequency * x + config.phase).sin() + config.trend * x
}

// Box-Muller transform; rand's distribution crates are not in the dependency
// tree, and two uniform draws per sample are plenty here.
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
