// External imports
use anyhow::Result;
use burn::tensor::backend::Backend;

// Internal imports
use crate::gru::step_4_train_model::{
    evaluate_model, train_model, TrainingBackend, TrainingConfig,
};
use crate::gru::step_5_prediction::forecast_autoregressive;
use crate::util::forecast_report;
use crate::util::signal_generator::{Waveform, WaveformConfig};

/// Full pipeline on a tiny network: generate, train, evaluate, forecast.
///
/// Uses a noise-free wave, a small stack and two epochs so the test stays
/// fast; assertions cover wiring and numeric sanity, not model quality.
#[test]
fn test_train_and_forecast_smoke() -> Result<()> {
    // Keep relative model/checkpoint writes inside a temp directory
    let temp_dir = tempfile::tempdir()?;
    let original_dir = std::env::current_dir()?;
    std::env::set_current_dir(temp_dir.path())?;

    let waveform = Waveform::generate(WaveformConfig {
        num_points: 250,
        noise_std: 0.0,
        seed: Some(11),
        ..Default::default()
    })?;
    let (train_series, test_series) = waveform.split_at_ratio(0.8);

    let config = TrainingConfig {
        epochs: 2,
        batch_size: 16,
        hidden_size: 8,
        num_layers: 2,
        patience: 5,
        checkpoint_epochs: 0, // no checkpoints in the smoke test
        ..Default::default()
    };
    let device = <TrainingBackend as Backend>::Device::default();

    let (model, report) = train_model(train_series, &config, &device, "smoke_test")?;

    assert_eq!(report.loss_history.len(), report.epochs_run);
    assert!(report.loss_history.iter().all(|l| l.is_finite()));
    assert!(report.best_val_rmse.is_finite());
    assert_eq!(report.run.epochs_run, report.epochs_run);

    let test_rmse = evaluate_model(&model, test_series, &device)?;
    assert!(test_rmse.is_finite());

    let predictions = forecast_autoregressive(&model, train_series, 10, &device)?;
    assert_eq!(predictions.len(), 10);

    let summary = forecast_report::summarize(&test_series[..10], &predictions)?;
    assert!(summary.rmse.is_finite());
    assert!(summary.mae.is_finite());

    std::env::set_current_dir(original_dir)?;
    temp_dir.close()?;
    Ok(())
}

/// Training must refuse a series that cannot fill both splits
#[test]
fn test_training_rejects_short_series() {
    let device = <TrainingBackend as Backend>::Device::default();
    let series: Vec<f64> = (0..40).map(|i| (i as f64 * 0.1).sin()).collect();

    let config = TrainingConfig {
        epochs: 1,
        ..Default::default()
    };
    assert!(train_model(&series, &config, &device, "too_short").is_err());
}
