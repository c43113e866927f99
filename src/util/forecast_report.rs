// External crates
use anyhow::{Context, Result};
use ndarray::Array1;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

// Internal modules
use crate::util::metrics;

/// Summary statistics of a forecast against ground truth
#[derive(Debug, Clone)]
pub struct ForecastSummary {
    pub horizon: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Compute the headline comparison numbers for a forecast
pub fn summarize(actual: &[f64], predicted: &[f64]) -> Result<ForecastSummary> {
    let y_true = Array1::from_vec(actual.to_vec());
    let y_pred = Array1::from_vec(predicted.to_vec());

    Ok(ForecastSummary {
        horizon: actual.len(),
        rmse: metrics::rmse(&y_true, &y_pred)?,
        mae: metrics::mae(&y_true, &y_pred)?,
        r2: metrics::r2_score(&y_true, &y_pred)?,
    })
}

/// Build a step-by-step comparison table of a forecast
///
/// Columns: `step`, `x` (sample coordinate), `actual`, `forecast`, `error`.
pub fn build_forecast_frame(
    xs: &[f64],
    actual: &[f64],
    predicted: &[f64],
) -> PolarsResult<DataFrame> {
    if xs.len() != actual.len() || actual.len() != predicted.len() {
        return Err(PolarsError::ComputeError(
            format!(
                "forecast frame length mismatch: {} coordinates, {} actual, {} predicted",
                xs.len(),
                actual.len(),
                predicted.len()
            )
            .into(),
        ));
    }

    let steps: Vec<u32> = (0..xs.len() as u32).collect();
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| p - a)
        .collect();

    DataFrame::new(vec![
        Series::new("step".into(), steps).into(),
        Series::new("x".into(), xs.to_vec()).into(),
        Series::new("actual".into(), actual.to_vec()).into(),
        Series::new("forecast".into(), predicted.to_vec()).into(),
        Series::new("error".into(), errors).into(),
    ])
}

/// Write a forecast comparison table as CSV
pub fn write_forecast_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create forecast output directory")?;
    }
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create forecast file {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .context("Failed to write forecast CSV")?;
    Ok(())
}
