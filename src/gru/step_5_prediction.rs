// External imports
use anyhow::{bail, Result};
use burn::tensor::{backend::Backend, Tensor};
use log::debug;

// Internal imports
use super::step_3_gru_model_arch::SequenceGru;
use crate::constants::SEQUENCE_LENGTH;

/// Predict the value following a window of observations
///
/// The window must hold at least `SEQUENCE_LENGTH` points; the most recent
/// `SEQUENCE_LENGTH` of them are fed through the network and the output at
/// the final time step is the next-value prediction.
pub fn predict_next_step<B: Backend>(
    model: &SequenceGru<B>,
    window: &[f64],
    device: &B::Device,
) -> Result<f64> {
    if window.len() < SEQUENCE_LENGTH {
        bail!(
            "prediction window holds {} points, need at least {}",
            window.len(),
            SEQUENCE_LENGTH
        );
    }
    let tail = &window[window.len() - SEQUENCE_LENGTH..];

    let data: Vec<f32> = tail.iter().map(|&v| v as f32).collect();
    let input =
        Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape([1, SEQUENCE_LENGTH, 1]);

    let output = model.forward(input);

    // The last time step of the output sequence is the next-value prediction
    let last = output
        .narrow(1, SEQUENCE_LENGTH - 1, 1)
        .reshape([1usize]);
    let data = last.to_data().convert::<f32>();
    let slice = data.as_slice::<f32>().unwrap();
    let value = slice[0] as f64;

    if !value.is_finite() {
        bail!("model produced a non-finite prediction");
    }
    Ok(value)
}

/// Generate a multi-step forecast by feeding predictions back as inputs
///
/// Starts from the tail of `seed` and repeats `horizon` times: predict the
/// next value, slide the window one step and append the prediction, so each
/// forecast step conditions on the previous ones.
pub fn forecast_autoregressive<B: Backend>(
    model: &SequenceGru<B>,
    seed: &[f64],
    horizon: usize,
    device: &B::Device,
) -> Result<Vec<f64>> {
    if horizon == 0 {
        return Ok(Vec::new());
    }
    if seed.len() < SEQUENCE_LENGTH {
        bail!(
            "forecast seed holds {} points, need at least {}",
            seed.len(),
            SEQUENCE_LENGTH
        );
    }

    let mut window: Vec<f64> = seed[seed.len() - SEQUENCE_LENGTH..].to_vec();
    let mut predictions = Vec::with_capacity(horizon);

    for step in 0..horizon {
        let next_value = predict_next_step(model, &window, device)?;
        debug!("forecast step {}: {:.6}", step, next_value);
        predictions.push(next_value);

        // Slide the window: drop the oldest point, append the prediction
        window.remove(0);
        window.push(next_value);
    }

    Ok(predictions)
}

/// Let the network dream a waveform from an all-zero seed
///
/// With no observations at all, the feedback loop alone decides the shape of
/// the output; a well-trained network settles into the waveform it was
/// trained on.
pub fn free_run<B: Backend>(
    model: &SequenceGru<B>,
    horizon: usize,
    device: &B::Device,
) -> Result<Vec<f64>> {
    let seed = vec![0.0; SEQUENCE_LENGTH];
    forecast_autoregressive(model, &seed, horizon, device)
}
