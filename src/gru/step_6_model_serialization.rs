// External imports
use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::SystemTime;

// Internal imports
use super::step_3_gru_model_arch::SequenceGru;

/// Metadata stored alongside a trained model
///
/// Carries everything needed to rebuild the architecture before loading the
/// recorded weights, plus the training parameters for the record.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelMetadata {
    pub version: String,
    pub timestamp: u64,
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub num_layers: usize,
    pub dropout: f64,
    pub learning_rate: f64,
    pub sequence_length: usize,
    pub description: String,
}

impl ModelMetadata {
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        num_layers: usize,
        dropout: f64,
        learning_rate: f64,
        sequence_length: usize,
        description: &str,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            input_size,
            hidden_size,
            output_size,
            num_layers,
            dropout,
            learning_rate,
            sequence_length,
            description: description.to_string(),
        }
    }
}

/// Save the model and its metadata next to each other
///
/// Two files are written: `{path}.bin` with the recorded weights and
/// `{path}.meta.json` with the metadata.
pub fn save_model_with_metadata<B: Backend>(
    model: &SequenceGru<B>,
    metadata: ModelMetadata,
    path: impl AsRef<Path>,
) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).context("Failed to create model parent directory")?;
    }
    // Save model artifact
    let model_path = path.as_ref().with_extension("bin");
    model
        .clone()
        .save_file::<BinFileRecorder<FullPrecisionSettings>, _>(&model_path, &Default::default())
        .context("Failed to save model")?;
    // Save metadata
    let metadata_path = path.as_ref().with_extension("meta.json");
    let metadata_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&metadata_path, metadata_json).context("Failed to write metadata file")?;
    Ok(())
}

/// Load a model and its metadata
///
/// The metadata is read first so the architecture can be rebuilt with the
/// recorded dimensions before the weights are loaded into it.
pub fn load_model_with_metadata<B: Backend>(
    path: impl AsRef<Path>,
    device: &B::Device,
) -> Result<(SequenceGru<B>, ModelMetadata)> {
    let metadata_path = path.as_ref().with_extension("meta.json");
    let metadata_json =
        std::fs::read_to_string(&metadata_path).context("Failed to read metadata file")?;
    let metadata: ModelMetadata =
        serde_json::from_str(&metadata_json).context("Failed to parse metadata")?;

    let model_path = path.as_ref().with_extension("bin");
    let template = SequenceGru::new(
        metadata.input_size,
        metadata.hidden_size,
        metadata.output_size,
        metadata.num_layers,
        metadata.dropout,
        device,
    );
    let model = template
        .load_file::<BinFileRecorder<FullPrecisionSettings>, _>(
            &model_path,
            &Default::default(),
            device,
        )
        .context("Failed to load model")?;

    Ok((model, metadata))
}

/// Check that both model artifacts exist and the metadata parses
pub fn verify_model(path: impl AsRef<Path>) -> Result<bool> {
    let model_path = path.as_ref().with_extension("bin");
    let metadata_path = path.as_ref().with_extension("meta.json");

    if !model_path.exists() || !metadata_path.exists() {
        return Ok(false);
    }

    let metadata_json =
        std::fs::read_to_string(&metadata_path).context("Failed to read metadata file")?;
    Ok(serde_json::from_str::<ModelMetadata>(&metadata_json).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::{NdArray, NdArrayDevice};
    use tempfile::tempdir;

    #[test]
    fn test_save_load_round_trip() -> Result<()> {
        let temp_dir = tempdir()?;
        let base_path = temp_dir.path().join("wave_model");

        let device = NdArrayDevice::Cpu;
        let model = SequenceGru::<NdArray>::new(1, 8, 1, 2, 0.2, &device);
        let metadata = ModelMetadata::new(1, 8, 1, 2, 0.2, 0.001, 30, "round trip test");

        save_model_with_metadata(&model, metadata.clone(), &base_path)?;
        assert!(base_path.with_extension("bin").exists());
        assert!(base_path.with_extension("meta.json").exists());
        assert!(verify_model(&base_path)?);

        let (loaded_model, loaded_metadata) =
            load_model_with_metadata::<NdArray>(&base_path, &device)?;

        assert_eq!(loaded_metadata.input_size, metadata.input_size);
        assert_eq!(loaded_metadata.hidden_size, metadata.hidden_size);
        assert_eq!(loaded_metadata.output_size, metadata.output_size);
        assert_eq!(loaded_metadata.num_layers, metadata.num_layers);
        assert_eq!(loaded_metadata.sequence_length, metadata.sequence_length);
        assert!((loaded_metadata.dropout - metadata.dropout).abs() < f64::EPSILON);

        assert_eq!(loaded_model.hidden_size(), 8);
        assert_eq!(loaded_model.num_layers(), 2);

        temp_dir.close()?;
        Ok(())
    }

    #[test]
    fn test_verify_missing_model() -> Result<()> {
        let temp_dir = tempdir()?;
        let base_path = temp_dir.path().join("missing_model");
        assert!(!verify_model(&base_path)?);
        temp_dir.close()?;
        Ok(())
    }
}
