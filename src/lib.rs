pub mod constants;
pub mod gru {
    pub mod step_1_tensor_preparation;
    pub mod step_2_gru_cell;
    pub mod step_3_gru_model_arch;
    pub mod step_4_train_model;
    pub mod step_5_prediction;
    pub mod step_6_model_serialization;
}
pub mod util {
    pub mod forecast_report;
    pub mod metrics;
    pub mod model_utils;
    pub mod run_logger;
    pub mod signal_generator;
}
#[cfg(test)]
pub mod test;

/// Build-time information generated by `built`
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
