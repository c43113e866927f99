use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Record of one training session
///
/// Captures the network shape, the training hyperparameters and the measured
/// outcomes, and is written as a JSON file so runs can be compared later.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrainingRun {
    pub timestamp: String,
    pub run_name: String,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub dropout: f64,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub epochs_run: usize,
    pub final_train_loss: Option<f64>,
    pub best_val_rmse: Option<f64>,
    pub test_rmse: Option<f64>,
    pub training_time_seconds: Option<f64>,
    pub rustc_version: String,
    pub notes: String,
}

impl TrainingRun {
    pub fn new(
        run_name: &str,
        hidden_size: usize,
        num_layers: usize,
        dropout: f64,
        batch_size: usize,
        learning_rate: f64,
    ) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            run_name: run_name.to_string(),
            hidden_size,
            num_layers,
            dropout,
            batch_size,
            learning_rate,
            epochs_run: 0,
            final_train_loss: None,
            best_val_rmse: None,
            test_rmse: None,
            training_time_seconds: None,
            rustc_version: crate::built_info::RUSTC_VERSION.to_string(),
            notes: String::new(),
        }
    }

    pub fn set_epochs_run(&mut self, epochs: usize) {
        self.epochs_run = epochs;
    }

    pub fn set_final_train_loss(&mut self, loss: f64) {
        self.final_train_loss = Some(loss);
    }

    pub fn set_best_val_rmse(&mut self, rmse: f64) {
        self.best_val_rmse = Some(rmse);
    }

    pub fn set_test_rmse(&mut self, rmse: f64) {
        self.test_rmse = Some(rmse);
    }

    pub fn set_training_time(&mut self, seconds: f64) {
        self.training_time_seconds = Some(seconds);
    }

    pub fn add_note(&mut self, note: &str) {
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(note);
    }

    /// Write the record as a timestamped JSON file under `dir`
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let filename = format!(
            "run_{}_{}.json",
            Local::now().format("%Y%m%d_%H%M%S"),
            self.run_name
        );
        let path = dir.join(filename);

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_reload_record() -> Result<()> {
        let temp_dir = tempdir()?;

        let mut run = TrainingRun::new("sine_demo", 100, 3, 0.2, 32, 0.001);
        run.set_epochs_run(10);
        run.set_final_train_loss(0.012);
        run.set_best_val_rmse(0.1);
        run.set_test_rmse(0.15);
        run.set_training_time(42.0);
        run.add_note("smoke test");
        run.add_note("second note");

        let path = run.save(temp_dir.path())?;
        assert!(path.exists());

        let json = std::fs::read_to_string(&path)?;
        let reloaded: TrainingRun = serde_json::from_str(&json)?;
        assert_eq!(reloaded.run_name, "sine_demo");
        assert_eq!(reloaded.epochs_run, 10);
        assert_eq!(reloaded.test_rmse, Some(0.15));
        assert!(reloaded.notes.contains("second note"));
        assert!(!reloaded.rustc_version.is_empty());

        temp_dir.close()?;
        Ok(())
    }
}
