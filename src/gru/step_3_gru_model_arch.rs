// External imports
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::prelude::Backend;
use burn::tensor::Tensor;

// Internal imports
use crate::constants::{DEFAULT_DROPOUT, L2_REGULARIZATION};
use crate::gru::step_2_gru_cell::Gru;

/// # SequenceGru Architecture
///
/// A stack of GRU layers followed by a dense projection applied at every time
/// step, trained sequence-to-sequence: the network emits a prediction for
/// each position of the input window, and the loss compares the whole output
/// sequence against the shifted label sequence.
///
/// ## Architecture Overview
///
/// 1. **Input**: univariate windows in shape [batch_size, seq_len, input_size]
/// 2. **GRU stack**: `num_layers` recurrent layers, dropout between layers
/// 3. **Output projection**: a shared Linear mapping each hidden state to
///    `output_size` values
///
/// The output is left unclamped: targets are a signed waveform.
#[derive(Module, Debug)]
pub struct SequenceGru<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    layers: Vec<Gru<B>>,
    dropout: Dropout,
    projection: Linear<B>,
    regularization: f64,
}

impl<B: Backend> SequenceGru<B> {
    /// Creates a new stacked GRU model
    ///
    /// # Arguments
    ///
    /// * `input_size` - Features per time step (1 for a univariate series)
    /// * `hidden_size` - Dimension of each GRU hidden state
    /// * `output_size` - Features predicted per time step
    /// * `num_layers` - Number of stacked GRU layers (must be at least 1)
    /// * `dropout_prob` - Dropout probability between recurrent layers
    /// * `device` - Device to allocate tensors on
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        num_layers: usize,
        dropout_prob: f64,
        device: &B::Device,
    ) -> Self {
        assert!(num_layers > 0, "a stacked GRU needs at least one layer");

        let dropout_prob = if dropout_prob <= 0.0 {
            DEFAULT_DROPOUT
        } else {
            dropout_prob
        };

        // Layer 0 consumes the input features, deeper layers consume hidden states
        let mut layers = Vec::with_capacity(num_layers);
        layers.push(Gru::new(input_size, hidden_size, device));
        for _ in 1..num_layers {
            layers.push(Gru::new(hidden_size, hidden_size, device));
        }

        let dropout = DropoutConfig::new(dropout_prob).init();
        let projection = LinearConfig::new(hidden_size, output_size).init(device);

        Self {
            input_size,
            hidden_size,
            output_size,
            layers,
            dropout,
            projection,
            regularization: L2_REGULARIZATION,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    /// Forward pass over a batch of windows
    ///
    /// # Process Flow
    ///
    /// 1. Run the sequence through every GRU layer, dropout in between
    /// 2. Project each hidden state to the output dimension
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape [batch_size, seq_len, input_size]
    ///
    /// # Returns
    ///
    /// Predictions for every time step, shape [batch_size, seq_len, output_size]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let batch_size = x.dims()[0];
        let seq_len = x.dims()[1];

        let mut hidden_seq = x;
        let last = self.layers.len() - 1;
        for (idx, layer) in self.layers.iter().enumerate() {
            hidden_seq = layer.forward(hidden_seq);
            if idx < last {
                hidden_seq = self.dropout.forward(hidden_seq);
            }
        }

        // Shared projection applied per time step
        let flat = hidden_seq.reshape([batch_size * seq_len, self.hidden_size]);
        let projected = self.projection.forward(flat);
        projected.reshape([batch_size, seq_len, self.output_size])
    }

    /// L2 penalty on the projection weights
    pub fn l2_penalty(&self) -> Tensor<B, 1> {
        let device = &self.projection.weight.device();
        let mut squared_sum = Tensor::zeros([1], device);

        let weights = self.projection.weight.val().clone();
        let weight_squared = weights.clone() * weights;
        squared_sum = squared_sum + weight_squared.sum();

        squared_sum * self.regularization
    }

    /// Mean squared error over the full output sequence, with L2 regularization
    pub fn mse_loss(&self, pred: Tensor<B, 3>, target: Tensor<B, 3>) -> Tensor<B, 1> {
        let diff = pred - target;
        let squared_diff = diff.clone() * diff.clone();

        let total = squared_diff.sum();
        let count = diff.dims().iter().product::<usize>() as f64;
        let mse = total / count;

        if self.regularization > 0.0 {
            mse + self.l2_penalty()
        } else {
            mse
        }
    }
}
