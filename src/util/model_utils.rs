use anyhow::{Context, Result};
use burn::prelude::Backend;
use chrono::{DateTime, Local};
use serde_json::from_str;
use std::path::{Path, PathBuf};

use crate::constants::MODEL_PATH;
use crate::gru::step_3_gru_model_arch::SequenceGru;
use crate::gru::step_6_model_serialization::{
    load_model_with_metadata, save_model_with_metadata, ModelMetadata,
};

/// Get the directory a run's models are saved under
pub fn get_model_path(run_name: &str) -> PathBuf {
    PathBuf::from(MODEL_PATH).join(run_name)
}

/// Save a trained model with its metadata under MODEL_PATH
pub fn save_trained_model<B: Backend>(
    model: &SequenceGru<B>,
    run_name: &str,
    model_name: &str,
    metadata: ModelMetadata,
) -> Result<PathBuf> {
    let model_dir = get_model_path(run_name);
    std::fs::create_dir_all(&model_dir).context("Failed to create models directory")?;

    let model_path = model_dir.join(model_name);
    save_model_with_metadata(model, metadata, &model_path).context("Failed to save model")?;

    println!("Model saved successfully to: {}", model_path.display());
    Ok(model_path)
}

/// Load a trained model with its metadata from MODEL_PATH
pub fn load_trained_model<B: Backend>(
    run_name: &str,
    model_name: &str,
    device: &B::Device,
) -> Result<(SequenceGru<B>, ModelMetadata)> {
    let model_path = get_model_path(run_name).join(model_name);
    println!("Loading model from: {}", model_path.display());
    load_model_with_metadata(&model_path, device).context("Failed to load model")
}

/// Save a model checkpoint during training
pub fn save_model_checkpoint<B: Backend>(
    model: &SequenceGru<B>,
    run_name: &str,
    model_name: &str,
    epoch: usize,
    metadata: ModelMetadata,
) -> Result<PathBuf> {
    let checkpoint_name = format!("{}_epoch_{}", model_name, epoch);
    save_trained_model(model, run_name, &checkpoint_name, metadata)
}

/// Check if the saved model's version matches the current code version
/// and was saved today
pub fn is_model_version_current(model_base_path: &Path, current_version: &str) -> bool {
    let metadata_path = model_base_path.with_extension("meta.json");
    if let Ok(metadata_json) = std::fs::read_to_string(&metadata_path) {
        if let Ok(metadata) = from_str::<ModelMetadata>(&metadata_json) {
            if metadata.version != current_version {
                return false;
            }
            let model_date = DateTime::from_timestamp(metadata.timestamp as i64, 0)
                .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
            let now = Local::now().to_utc();
            return model_date.date_naive() == now.date_naive();
        }
    }
    false
}
