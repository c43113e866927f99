// External imports
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use burn_ndarray::NdArray;

// Internal imports
use crate::constants::SEQUENCE_LENGTH;
use crate::gru::step_2_gru_cell::Gru;
use crate::gru::step_3_gru_model_arch::SequenceGru;
use crate::gru::step_5_prediction::{forecast_autoregressive, free_run, predict_next_step};

type TestBackend = NdArray<f32>;

fn test_device() -> <TestBackend as Backend>::Device {
    <TestBackend as Backend>::Device::default()
}

fn sine_window(len: usize) -> Vec<f64> {
    (0..len).map(|i| (i as f64 * 0.1).sin()).collect()
}

#[test]
fn test_gru_cell_forward_pass() {
    let device = test_device();

    // A small batch: batch_size=2, seq_len=3, input_size=4
    let input = Tensor::<TestBackend, 3>::ones([2, 3, 4], &device);
    let gru = Gru::<TestBackend>::new(4, 5, &device);

    let output = gru.forward(input);

    let dims = output.dims();
    assert_eq!(dims[0], 2, "Batch size should be 2");
    assert_eq!(dims[1], 3, "Sequence length should be 3");
    assert_eq!(dims[2], 5, "Hidden size should be 5");

    let data = output.to_data();
    for val in data.convert::<f32>().as_slice::<f32>().unwrap() {
        assert!(!val.is_nan(), "Output contains NaN values");
    }
}

#[test]
fn test_gru_forward_step() {
    let device = test_device();

    let gru = Gru::<TestBackend>::new(4, 5, &device);
    let x_t = Tensor::<TestBackend, 2>::ones([2, 4], &device);
    let h = Tensor::<TestBackend, 2>::zeros([2, 5], &device);

    let h_next = gru.forward_step(x_t, h);
    assert_eq!(h_next.dims(), [2, 5]);

    // Hidden state values stay inside the tanh range
    let data = h_next.to_data();
    for val in data.convert::<f32>().as_slice::<f32>().unwrap() {
        assert!(*val > -1.0 && *val < 1.0, "Hidden state out of range");
    }
}

#[test]
fn test_sequence_gru_model_shapes() {
    let device = test_device();

    let model = SequenceGru::<TestBackend>::new(
        1,   // input_size
        16,  // hidden_size
        1,   // output_size
        3,   // num_layers
        0.1, // dropout
        &device,
    );
    assert_eq!(model.num_layers(), 3);

    let input = Tensor::<TestBackend, 3>::ones([2, 5, 1], &device);
    let output = model.forward(input);

    // Per-step projection: one prediction per input position
    let dims = output.dims();
    assert_eq!(dims[0], 2, "Batch size should be 2");
    assert_eq!(dims[1], 5, "Sequence length should be preserved");
    assert_eq!(dims[2], 1, "Output size should be 1");

    let data = output.to_data();
    for val in data.convert::<f32>().as_slice::<f32>().unwrap() {
        assert!(val.is_finite(), "Output contains non-finite values");
    }
}

#[test]
fn test_single_layer_stack_is_valid() {
    let device = test_device();

    let model = SequenceGru::<TestBackend>::new(1, 8, 1, 1, 0.1, &device);
    let input = Tensor::<TestBackend, 3>::ones([1, 4, 1], &device);

    assert_eq!(model.forward(input).dims(), [1, 4, 1]);
}

#[test]
fn test_mse_loss_is_finite_and_positive() {
    let device = test_device();

    let model = SequenceGru::<TestBackend>::new(1, 8, 1, 2, 0.1, &device);
    let pred = Tensor::<TestBackend, 3>::ones([2, 4, 1], &device);
    let target = Tensor::<TestBackend, 3>::zeros([2, 4, 1], &device);

    let loss = model.mse_loss(pred, target);
    let data = loss.to_data().convert::<f32>();
    let slice = data.as_slice::<f32>().unwrap();
    let loss_value = slice[0] as f64;

    assert!(loss_value.is_finite(), "Loss should be finite");
    // MSE of all-ones vs all-zeros is 1.0, plus a small L2 penalty
    assert!(loss_value >= 1.0, "Loss should be at least the plain MSE");
    assert!(loss_value < 2.0, "L2 penalty should stay small");
}

#[test]
fn test_forecast_autoregressive() {
    let device = test_device();
    let model = SequenceGru::<TestBackend>::new(1, 8, 1, 2, 0.1, &device);

    let seed = sine_window(SEQUENCE_LENGTH + 10);
    let predictions = forecast_autoregressive(&model, &seed, 10, &device).unwrap();

    assert_eq!(predictions.len(), 10);
    assert!(predictions.iter().all(|v| v.is_finite()));
}

#[test]
fn test_forecast_zero_horizon_is_empty() {
    let device = test_device();
    let model = SequenceGru::<TestBackend>::new(1, 8, 1, 2, 0.1, &device);

    let seed = sine_window(SEQUENCE_LENGTH);
    let predictions = forecast_autoregressive(&model, &seed, 0, &device).unwrap();
    assert!(predictions.is_empty());
}

#[test]
fn test_forecast_short_seed_is_rejected() {
    let device = test_device();
    let model = SequenceGru::<TestBackend>::new(1, 8, 1, 2, 0.1, &device);

    let seed = sine_window(SEQUENCE_LENGTH - 1);
    assert!(forecast_autoregressive(&model, &seed, 5, &device).is_err());
    assert!(predict_next_step(&model, &seed, &device).is_err());
}

#[test]
fn test_free_run_produces_horizon_values() {
    let device = test_device();
    let model = SequenceGru::<TestBackend>::new(1, 8, 1, 2, 0.1, &device);

    let dreamed = free_run(&model, 5, &device).unwrap();
    assert_eq!(dreamed.len(), 5);
    assert!(dreamed.iter().all(|v| v.is_finite()));
}

#[test]
fn test_predict_next_step_uses_window_tail() {
    let device = test_device();
    let model = SequenceGru::<TestBackend>::new(1, 8, 1, 2, 0.1, &device);

    // A long window and its tail must produce the same prediction
    let long_window = sine_window(SEQUENCE_LENGTH * 2);
    let tail = long_window[long_window.len() - SEQUENCE_LENGTH..].to_vec();

    let from_long = predict_next_step(&model, &long_window, &device).unwrap();
    let from_tail = predict_next_step(&model, &tail, &device).unwrap();
    assert!((from_long - from_tail).abs() < 1e-9);
}
