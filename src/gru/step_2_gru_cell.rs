// External imports
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::{activation, backend::Backend, Tensor};

/// # GRU Recurrence
///
/// A single gated-recurrent-unit layer. The GRU keeps one hidden state and
/// two gates:
///
/// - **Update gate (z)**: how much of the previous hidden state to keep
/// - **Reset gate (r)**: how much of the previous hidden state feeds the
///   candidate state
///
/// For input x_t and previous hidden state h_(t-1):
///
/// 1. z_t = σ(W_z · x_t + U_z · h_(t-1))
/// 2. r_t = σ(W_r · x_t + U_r · h_(t-1))
/// 3. n_t = tanh(W_n · x_t + r_t ∘ (U_n · h_(t-1)))
/// 4. h_t = (1 - z_t) ∘ n_t + z_t ∘ h_(t-1)
///
/// The three input projections are fused into one `Linear` of width
/// `3 * hidden_size`, and likewise for the hidden projections.
#[derive(Module, Debug)]
pub struct Gru<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    input_weights: Linear<B>,
    hidden_weights: Linear<B>,
}

impl<B: Backend> Gru<B> {
    /// Create a new GRU layer
    ///
    /// # Arguments
    ///
    /// * `input_size` - Number of features in each input step
    /// * `hidden_size` - Number of features in the hidden state
    /// * `device` - Device to allocate tensors on
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        // Fused projections: one matrix for the three gates (update, reset, new)
        let gate_size = 3 * hidden_size;
        let input_weights = LinearConfig::new(input_size, gate_size).init(device);
        let hidden_weights = LinearConfig::new(hidden_size, gate_size).init(device);

        Self {
            input_size,
            hidden_size,
            input_weights,
            hidden_weights,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Advance the recurrence by one time step
    ///
    /// # Arguments
    ///
    /// * `x_t` - Input at the current step, shape [batch_size, input_size]
    /// * `h` - Previous hidden state, shape [batch_size, hidden_size]
    ///
    /// # Returns
    ///
    /// The new hidden state, shape [batch_size, hidden_size]
    pub fn forward_step(&self, x_t: Tensor<B, 2>, h: Tensor<B, 2>) -> Tensor<B, 2> {
        let batch_size = x_t.dims()[0];

        let input_projection = self.input_weights.forward(x_t);
        let hidden_projection = self.hidden_weights.forward(h.clone());

        // Split the fused projections into the three gates
        let input_gates = input_projection.reshape([batch_size, 3, self.hidden_size]);
        let z_input = input_gates
            .clone()
            .narrow(1, 0, 1)
            .reshape([batch_size, self.hidden_size]);
        let r_input = input_gates
            .clone()
            .narrow(1, 1, 1)
            .reshape([batch_size, self.hidden_size]);
        let n_input = input_gates
            .narrow(1, 2, 1)
            .reshape([batch_size, self.hidden_size]);

        let hidden_gates = hidden_projection.reshape([batch_size, 3, self.hidden_size]);
        let z_hidden = hidden_gates
            .clone()
            .narrow(1, 0, 1)
            .reshape([batch_size, self.hidden_size]);
        let r_hidden = hidden_gates
            .clone()
            .narrow(1, 1, 1)
            .reshape([batch_size, self.hidden_size]);
        let n_hidden = hidden_gates
            .narrow(1, 2, 1)
            .reshape([batch_size, self.hidden_size]);

        let z = activation::sigmoid(z_input + z_hidden);
        let r = activation::sigmoid(r_input + r_hidden);
        let n = activation::tanh(n_input + (r * n_hidden));

        // h = (1 - z) * n + z * h
        (Tensor::ones_like(&z) - z.clone()) * n + z * h
    }

    /// Run the recurrence over a full sequence from a zero hidden state
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape [batch_size, seq_len, input_size]
    ///
    /// # Returns
    ///
    /// Hidden states for every time step, shape [batch_size, seq_len, hidden_size]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let device = x.device();
        let batch_size = x.dims()[0];
        let seq_len = x.dims()[1];

        let mut h = Tensor::zeros([batch_size, self.hidden_size], &device);
        let mut output_sequence = Tensor::zeros([batch_size, seq_len, self.hidden_size], &device);

        for t in 0..seq_len {
            let x_t = x
                .clone()
                .narrow(1, t, 1)
                .reshape([batch_size, self.input_size]);

            h = self.forward_step(x_t, h);

            output_sequence = output_sequence.slice_assign(
                [0..batch_size, t..t + 1, 0..self.hidden_size],
                h.clone().reshape([batch_size, 1, self.hidden_size]),
            );
        }

        output_sequence
    }
}
