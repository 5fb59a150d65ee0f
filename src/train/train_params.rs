use serde::{Deserialize, Serialize};

use crate::network::error::{NetworkError, Result};

/// Per-sample training knobs held by a `Network`.
///
/// - `learning_rate`  : step size of every weight update
/// - `error_threshold`: a sample counts as learned once its squared error
///                       drops below this and it is classified correctly
/// - `max_attempts`   : backward passes spent on one sample before giving up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub learning_rate: f64,
    pub error_threshold: f64,
    pub max_attempts: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        TrainParams { learning_rate: 0.01, error_threshold: 0.2, max_attempts: 100 }
    }
}

impl TrainParams {
    pub fn with_learning_rate(learning_rate: f64) -> Self {
        TrainParams { learning_rate, ..TrainParams::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetworkError::InvalidParams(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !self.error_threshold.is_finite() || self.error_threshold <= 0.0 {
            return Err(NetworkError::InvalidParams(format!(
                "error threshold must be a positive number, got {}",
                self.error_threshold
            )));
        }
        if self.max_attempts == 0 {
            return Err(NetworkError::InvalidParams("max attempts must be at least 1".into()));
        }
        Ok(())
    }
}
