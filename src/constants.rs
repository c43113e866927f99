// Model parameters
pub const SEQUENCE_LENGTH: usize = 30; // Number of time steps to look back

// Network defaults
pub const DEFAULT_HIDDEN_SIZE: usize = 100;
pub const DEFAULT_NUM_LAYERS: usize = 3;
pub const DEFAULT_DROPOUT: f64 = 0.2;
pub const L2_REGULARIZATION: f64 = 0.0001;

// Data preprocessing
pub const VALIDATION_SPLIT_RATIO: f64 = 0.2; // 20% of data for validation

// Model paths
pub const MODEL_PATH: &str = "models";
pub const MODEL_FILE_NAME: &str = "_wave_gru_model";

// Forecast report output
pub const FORECAST_PATH: &str = "forecasts";
