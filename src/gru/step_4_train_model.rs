// External imports
use anyhow::{bail, Result};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::Backend;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use log::debug;
use std::time::Instant;

// Internal imports
use super::step_1_tensor_preparation::{series_to_tensors, windows_to_tensors, BatchSequencer};
use super::step_3_gru_model_arch::SequenceGru;
use super::step_6_model_serialization::ModelMetadata;
use crate::constants::{
    DEFAULT_DROPOUT, DEFAULT_HIDDEN_SIZE, DEFAULT_NUM_LAYERS, MODEL_FILE_NAME, SEQUENCE_LENGTH,
    VALIDATION_SPLIT_RATIO,
};
use crate::util::model_utils;
use crate::util::run_logger::TrainingRun;

/// Backend used for training (CPU with automatic differentiation)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Configuration for training the model
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub batch_size: usize,
    pub epochs: usize,
    pub validation_split: f64,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub dropout: f64,
    pub patience: usize,
    pub min_delta: f64,
    pub checkpoint_epochs: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            batch_size: 32,
            epochs: 10,
            validation_split: VALIDATION_SPLIT_RATIO,
            hidden_size: DEFAULT_HIDDEN_SIZE,
            num_layers: DEFAULT_NUM_LAYERS,
            dropout: DEFAULT_DROPOUT,
            patience: 5,      // Early stopping patience
            min_delta: 0.001, // Minimum improvement threshold
            checkpoint_epochs: 5,
        }
    }
}

/// Outcome of a training session
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub loss_history: Vec<f64>,
    pub val_rmse_history: Vec<f64>,
    pub best_val_rmse: f64,
    pub epochs_run: usize,
    pub run: TrainingRun,
}

/// Train a stacked GRU on a flat series
///
/// The tail `validation_split` of the series is held out; mini-batches over
/// the head are drawn by a `BatchSequencer` so each epoch covers every
/// training window once. Early stopping restores the best model seen on the
/// validation split.
pub fn train_model(
    series: &[f64],
    config: &TrainingConfig,
    device: &<TrainingBackend as Backend>::Device,
    run_name: &str,
) -> Result<(SequenceGru<TrainingBackend>, TrainingReport)> {
    println!("Starting model training...");
    let start_time = Instant::now();

    // Chronological train/validation split
    let val_size = (series.len() as f64 * config.validation_split).round() as usize;
    let train_size = series.len() - val_size;
    if train_size < SEQUENCE_LENGTH + 1 {
        bail!(
            "training split of {} points is too short for sequence length {}",
            train_size,
            SEQUENCE_LENGTH
        );
    }
    if val_size < SEQUENCE_LENGTH + 1 {
        bail!(
            "validation split of {} points is too short for sequence length {}",
            val_size,
            SEQUENCE_LENGTH
        );
    }
    let (train_series, val_series) = series.split_at(train_size);
    println!(
        "Data split: train samples: {}, validation samples: {}",
        train_size, val_size
    );

    let mut sequencer = BatchSequencer::new(train_series, SEQUENCE_LENGTH, config.batch_size, None)?;
    let (val_inputs, val_labels) =
        series_to_tensors::<TrainingBackend>(val_series, SEQUENCE_LENGTH, device)?;

    let mut model = SequenceGru::<TrainingBackend>::new(
        1, // univariate input
        config.hidden_size,
        1, // one prediction per time step
        config.num_layers,
        config.dropout,
        device,
    );

    // Setup for early stopping
    let mut best_model = model.clone();
    let mut best_val_rmse = f64::INFINITY;
    let mut epochs_no_improve = 0;

    let mut optimizer = AdamConfig::new().init();

    let mut loss_history = Vec::new();
    let mut val_rmse_history = Vec::new();
    let mut epochs_run = 0;
    let model_name = format!("{}{}", run_name, MODEL_FILE_NAME);

    for epoch in 1..=config.epochs {
        // Linear learning rate decay, floored to stay positive
        let mut current_lr =
            config.learning_rate * (1.0 - (epoch as f64 - 1.0) / (config.epochs as f64));
        if current_lr < 1e-8 {
            current_lr = 1e-8;
        }

        let mut epoch_loss = 0.0;
        let batches = sequencer.batches_per_epoch();
        for _ in 0..batches {
            let batch = sequencer.next_batch();
            let (inputs, labels) = windows_to_tensors::<TrainingBackend>(&batch, device)?;

            // Forward pass and loss
            let predictions = model.forward(inputs);
            let loss_tensor = model.mse_loss(predictions, labels);
            let loss = loss_tensor.clone().into_scalar() as f64;
            epoch_loss += loss;

            // Backward pass and optimizer step
            let grads = loss_tensor.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(current_lr, model, grads);
        }
        let avg_loss = epoch_loss / batches as f64;
        loss_history.push(avg_loss);
        epochs_run = epoch;
        debug!(
            "epoch {} sequencer epochs completed: {}",
            epoch,
            sequencer.epochs_completed()
        );

        // Validation pass
        let val_preds = model.forward(val_inputs.clone());
        let val_diff = val_preds - val_labels.clone();
        let val_mse_tensor = (val_diff.clone() * val_diff).mean();
        let val_mse_data = val_mse_tensor.to_data().convert::<f32>();
        let val_mse_slice = val_mse_data.as_slice::<f32>().unwrap();
        let val_rmse = (val_mse_slice[0] as f64).sqrt();
        val_rmse_history.push(val_rmse);

        println!(
            "Epoch {}/{} - loss: {:.6} - val RMSE: {:.6} (lr {:.6})",
            epoch, config.epochs, avg_loss, val_rmse, current_lr
        );

        // Early stopping logic
        if best_val_rmse - val_rmse > config.min_delta {
            best_val_rmse = val_rmse;
            best_model = model.clone();
            epochs_no_improve = 0;
        } else {
            epochs_no_improve += 1;
            if epochs_no_improve >= config.patience {
                println!(
                    "Early stopping triggered at epoch {} (best val RMSE = {:.6})",
                    epoch, best_val_rmse
                );
                model = best_model.clone();
                break;
            }
        }

        // Periodic checkpoint
        if config.checkpoint_epochs > 0 && epoch % config.checkpoint_epochs == 0 {
            let _ = model_utils::save_model_checkpoint(
                &model,
                run_name,
                &model_name,
                epoch,
                training_metadata(config, "checkpoint"),
            );
        }
    }

    // Keep the best model when validation never improved past the last epoch
    if best_val_rmse.is_finite() {
        model = best_model;
    }

    // Save the final model after training
    let _ = model_utils::save_trained_model(
        &model,
        run_name,
        &model_name,
        training_metadata(config, "stacked GRU waveform forecasting model"),
    );

    let elapsed = start_time.elapsed().as_secs_f64();
    let mut run = TrainingRun::new(
        run_name,
        config.hidden_size,
        config.num_layers,
        config.dropout,
        config.batch_size,
        config.learning_rate,
    );
    run.set_epochs_run(epochs_run);
    if let Some(&final_loss) = loss_history.last() {
        run.set_final_train_loss(final_loss);
    }
    run.set_best_val_rmse(best_val_rmse);
    run.set_training_time(elapsed);

    println!("Training completed in {:.1}s.", elapsed);

    let report = TrainingReport {
        loss_history,
        val_rmse_history,
        best_val_rmse,
        epochs_run,
        run,
    };
    Ok((model, report))
}

/// Evaluate one-step prediction RMSE over every window of a held-out series
pub fn evaluate_model<B: Backend>(
    model: &SequenceGru<B>,
    series: &[f64],
    device: &B::Device,
) -> Result<f64> {
    let (inputs, labels) = series_to_tensors::<B>(series, SEQUENCE_LENGTH, device)?;

    let predictions = model.forward(inputs);
    let diff = predictions - labels;
    let mse_tensor = (diff.clone() * diff).mean();
    let mse_data = mse_tensor.to_data().convert::<f32>();
    let mse_slice = mse_data.as_slice::<f32>().unwrap();
    let mse = mse_slice[0] as f64;
    Ok(mse.sqrt())
}

fn training_metadata(config: &TrainingConfig, description: &str) -> ModelMetadata {
    ModelMetadata::new(
        1,
        config.hidden_size,
        1,
        config.num_layers,
        config.dropout,
        config.learning_rate,
        SEQUENCE_LENGTH,
        description,
    )
}
