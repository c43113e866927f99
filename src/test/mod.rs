/// Test modules for the waveform forecasting package
///
/// * `gru` - Tests for the GRU cell, the stacked model and the
///   autoregressive prediction loop
/// * `pipeline_tests` - End-to-end generate/train/forecast smoke tests
///
/// Finer-grained tests (batch sequencing, signal synthesis, metrics,
/// serialization, reports) live in `#[cfg(test)]` modules next to the code
/// they cover.
pub mod gru;
pub mod pipeline_tests;
