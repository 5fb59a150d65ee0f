use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `max_epochs`         : upper bound on full passes over the sample set;
///                           at least one epoch always runs
/// - `acceptable_accuracy`: the loop returns as soon as the share of
///                           samples learned before their update exceeds this
/// - `progress_tx`        : optional channel sender; one `EpochStats` is sent
///                           per completed epoch.  If the receiver is dropped
///                           the loop terminates early.
/// - `stop_flag`          : optional atomic flag; when set to `true` from
///                           another thread the loop terminates after the
///                           current epoch.
pub struct TrainConfig {
    pub max_epochs: usize,
    pub acceptable_accuracy: f64,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(max_epochs: usize, acceptable_accuracy: f64) -> Self {
        TrainConfig {
            max_epochs,
            acceptable_accuracy,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
