/// Tests for the GRU (Gated Recurrent Unit) implementation
///
/// Covers the recurrence itself (forward pass shapes, step function), the
/// stacked `SequenceGru` architecture with its per-step projection, the MSE
/// loss, and the autoregressive forecasting helpers.
pub mod test_gru;
