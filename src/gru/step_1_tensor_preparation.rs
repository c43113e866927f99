// External crates
use anyhow::Result;
use burn::tensor::{backend::Backend, Tensor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use thiserror::Error;

/// Errors produced while slicing a series into mini-batches
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("series of length {len} is too short for sequence length {sequence_length} (need at least {required} points)")]
    SeriesTooShort {
        len: usize,
        sequence_length: usize,
        required: usize,
    },

    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,

    #[error("sequence_length must be greater than zero")]
    ZeroSequenceLength,
}

/// One training window: an input sequence and its label sequence
///
/// The label is the input shifted one step into the future, so the network
/// learns to predict the next sample at every position of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub input: Vec<f64>,
    pub label: Vec<f64>,
}

/// # Mini-batch sequencer
///
/// Slices a flat time series into overlapping sequence/label windows and
/// serves them in shuffled mini-batches while tracking training epochs.
///
/// A window starting at index `i` covers `series[i .. i + L]` as input and
/// `series[i + 1 .. i + L + 1]` as label, where `L` is the sequence length.
/// Valid starts are `0 ..= len - L - 1`, so every sample of the series is
/// seen both as an input and as a label (except the two ends).
///
/// Batches are drawn by a cursor walking a shuffled list of window starts.
/// When a batch exhausts the list it is completed from a freshly reshuffled
/// list and `epochs_completed` is incremented, so batches are always full and
/// every window is visited once per epoch.
pub struct BatchSequencer {
    series: Vec<f64>,
    sequence_length: usize,
    batch_size: usize,
    starts: Vec<usize>,
    cursor: usize,
    epochs_completed: usize,
    rng: StdRng,
}

impl BatchSequencer {
    /// Create a sequencer over `series`
    ///
    /// Bounds are validated once here; window extraction never panics
    /// afterwards. A `seed` makes the shuffle order reproducible.
    pub fn new(
        series: &[f64],
        sequence_length: usize,
        batch_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, BatchError> {
        if sequence_length == 0 {
            return Err(BatchError::ZeroSequenceLength);
        }
        if batch_size == 0 {
            return Err(BatchError::ZeroBatchSize);
        }
        let required = sequence_length + 1;
        if series.len() < required {
            return Err(BatchError::SeriesTooShort {
                len: series.len(),
                sequence_length,
                required,
            });
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut starts: Vec<usize> = (0..series.len() - sequence_length).collect();
        starts.shuffle(&mut rng);

        Ok(Self {
            series: series.to_vec(),
            sequence_length,
            batch_size,
            starts,
            cursor: 0,
            epochs_completed: 0,
            rng,
        })
    }

    /// Number of distinct windows in the series
    pub fn num_windows(&self) -> usize {
        self.starts.len()
    }

    /// Batches needed to visit every window once
    pub fn batches_per_epoch(&self) -> usize {
        self.num_windows().div_ceil(self.batch_size)
    }

    /// Full passes over the window list completed so far
    pub fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }

    /// Draw the next mini-batch of windows
    pub fn next_batch(&mut self) -> Vec<Window> {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            if self.cursor >= self.starts.len() {
                self.starts.shuffle(&mut self.rng);
                self.cursor = 0;
                self.epochs_completed += 1;
            }
            batch.push(self.window_at(self.starts[self.cursor]));
            self.cursor += 1;
        }
        batch
    }

    fn window_at(&self, start: usize) -> Window {
        Window {
            input: self.series[start..start + self.sequence_length].to_vec(),
            label: self.series[start + 1..start + self.sequence_length + 1].to_vec(),
        }
    }
}

/// Convert a batch of windows into input/label tensors
///
/// Inputs and labels both have shape `[batch_size, sequence_length, 1]`: the
/// waveform is univariate, so the feature dimension is 1 and the label carries
/// the full shifted sequence rather than a single horizon value.
pub fn windows_to_tensors<B: Backend>(
    windows: &[Window],
    device: &B::Device,
) -> Result<(Tensor<B, 3>, Tensor<B, 3>)> {
    if windows.is_empty() {
        return Err(anyhow::anyhow!("cannot build tensors from an empty batch"));
    }
    let batch_size = windows.len();
    let sequence_length = windows[0].input.len();

    let mut input_data = Vec::with_capacity(batch_size * sequence_length);
    let mut label_data = Vec::with_capacity(batch_size * sequence_length);
    for window in windows {
        if window.input.len() != sequence_length || window.label.len() != sequence_length {
            return Err(anyhow::anyhow!("ragged window lengths in batch"));
        }
        input_data.extend(window.input.iter().map(|&v| v as f32));
        label_data.extend(window.label.iter().map(|&v| v as f32));
    }

    let inputs = Tensor::<B, 1>::from_floats(input_data.as_slice(), device).reshape([
        batch_size,
        sequence_length,
        1,
    ]);
    let labels = Tensor::<B, 1>::from_floats(label_data.as_slice(), device).reshape([
        batch_size,
        sequence_length,
        1,
    ]);

    Ok((inputs, labels))
}

/// Slice every overlapping window of a series into tensors
///
/// Used for full-series evaluation; window extraction is parallelized since
/// evaluation series can cover the whole signal.
pub fn series_to_tensors<B: Backend>(
    series: &[f64],
    sequence_length: usize,
    device: &B::Device,
) -> Result<(Tensor<B, 3>, Tensor<B, 3>)> {
    if sequence_length == 0 {
        return Err(BatchError::ZeroSequenceLength.into());
    }
    if series.len() < sequence_length + 1 {
        return Err(BatchError::SeriesTooShort {
            len: series.len(),
            sequence_length,
            required: sequence_length + 1,
        }
        .into());
    }

    let num_windows = series.len() - sequence_length;
    let windows: Vec<Window> = (0..num_windows)
        .into_par_iter()
        .map(|start| Window {
            input: series[start..start + sequence_length].to_vec(),
            label: series[start + 1..start + sequence_length + 1].to_vec(),
        })
        .collect();

    windows_to_tensors(&windows, device)
}

/// Parameters of a min-max scaling, kept so forecasts can be mapped back
#[derive(Debug, Clone, Copy)]
pub struct ScaleParams {
    pub min: f64,
    pub max: f64,
}

impl ScaleParams {
    fn range(&self) -> f64 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            1.0
        } else {
            range
        }
    }
}

/// Min-max scale a series into `[0, 1]`
///
/// The sine demo is already unit-scale; this exists for waveforms with large
/// amplitudes or trends, where raw values would slow training down.
pub fn scale_series(series: &[f64]) -> (Vec<f64>, ScaleParams) {
    let min = series.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let params = ScaleParams { min, max };
    let scaled = series.iter().map(|&v| (v - min) / params.range()).collect();
    (scaled, params)
}

/// Map a scaled value back to the original range
pub fn unscale_value(value: f64, params: &ScaleParams) -> f64 {
    value * params.range() + params.min
}

/// Map a scaled series back to the original range
pub fn unscale_series(series: &[f64], params: &ScaleParams) -> Vec<f64> {
    series.iter().map(|&v| unscale_value(v, params)).collect()
}
