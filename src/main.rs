// External crates
use anyhow::Result;
use burn::tensor::backend::Backend as BurnBackendTrait;
use std::env;
use std::path::PathBuf;

// Local modules
use wavecast::constants::{self, FORECAST_PATH, SEQUENCE_LENGTH};
use wavecast::gru::step_4_train_model::{
    evaluate_model, train_model, TrainingBackend, TrainingConfig,
};
use wavecast::gru::step_5_prediction;
use wavecast::util::forecast_report;
use wavecast::util::signal_generator::{Waveform, WaveformConfig};

fn main() -> Result<()> {
    // Accept num_points, epochs and forecast horizon as command-line arguments
    let args: Vec<String> = env::args().collect();
    let num_points: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(500);
    let epochs: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
    let horizon: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(50);
    println!(
        "Using num_points: {} | epochs: {} | horizon: {}",
        num_points, epochs, horizon
    );

    let run_name = "sine_demo";

    // Synthesize the waveform
    let waveform = Waveform::generate(WaveformConfig {
        num_points,
        seed: Some(42),
        ..Default::default()
    })?;
    println!(
        "Generated waveform: {} points over [{}, {}), resolution {:.4}",
        waveform.len(),
        waveform.config().xmin,
        waveform.config().xmax,
        waveform.resolution()
    );

    // Split into training and testing spans (80/20)
    let (train_series, test_series) = waveform.split_at_ratio(0.8);
    println!("Training span: {} points", train_series.len());
    println!("Testing span: {} points", test_series.len());

    // Train the model
    let device = <TrainingBackend as BurnBackendTrait>::Device::default();
    let training_config = TrainingConfig {
        epochs,
        ..Default::default()
    };
    let (model, report) = train_model(train_series, &training_config, &device, run_name)?;
    println!(
        "Best validation RMSE after {} epochs: {:.6}",
        report.epochs_run, report.best_val_rmse
    );

    // One-step evaluation over the held-out span
    let test_rmse = evaluate_model(&model, test_series, &device)?;
    println!("Test one-step RMSE: {:.6}", test_rmse);

    // Autoregressive forecast across the test span, seeded with the
    // last training observations
    let forecast_horizon = horizon.min(test_series.len());
    if forecast_horizon < horizon {
        println!(
            "Horizon clipped to the {} points of ground truth available",
            forecast_horizon
        );
    }
    let predictions =
        step_5_prediction::forecast_autoregressive(&model, train_series, forecast_horizon, &device)?;

    let actual = &test_series[..forecast_horizon];
    let xs = &waveform.xs()[train_series.len()..train_series.len() + forecast_horizon];
    let summary = forecast_report::summarize(actual, &predictions)?;
    println!(
        "Forecast over {} steps - RMSE: {:.6} | MAE: {:.6} | R2: {:.4}",
        summary.horizon, summary.rmse, summary.mae, summary.r2
    );

    // Write the step-by-step comparison table
    let mut frame = forecast_report::build_forecast_frame(xs, actual, &predictions)?;
    let report_path = PathBuf::from(FORECAST_PATH).join(format!("{}_forecast.csv", run_name));
    forecast_report::write_forecast_csv(&mut frame, &report_path)?;
    println!("Forecast report written to: {}", report_path.display());

    // Let the network dream the waveform from a zero seed
    let dreamed = step_5_prediction::free_run(&model, SEQUENCE_LENGTH, &device)?;
    println!("Free-run sample (first 5 of {}):", dreamed.len());
    for (i, value) in dreamed.iter().take(5).enumerate() {
        println!("Step {}: {:.4}", i + 1, value);
    }

    // Record the session
    let mut run = report.run.clone();
    run.set_test_rmse(summary.rmse);
    run.add_note("synthetic sine demo run");
    let run_path = run.save(&PathBuf::from(constants::MODEL_PATH).join(run_name))?;
    println!("Training run recorded at: {}", run_path.display());

    Ok(())
}
