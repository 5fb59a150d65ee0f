use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::info;

use crate::network::error::{NetworkError, Result};
use crate::network::network::Network;
use crate::sample::SampleSet;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` on `samples` one sample at a time and returns the
/// accuracy of the **last completed epoch**.
///
/// An epoch calls `Network::train_one` on every sample in order; the epoch
/// accuracy is the share of samples for which it returned `0`, i.e. samples
/// that were already learned before this epoch touched them.
///
/// # Early termination
/// The loop returns as soon as an epoch's accuracy exceeds
/// `config.acceptable_accuracy`. It also breaks after the current epoch if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// At least one epoch always runs.
///
/// # Errors
/// `EmptySet` for an empty sample set; any per-sample error from
/// `train_one` aborts the run.
pub fn train_loop(
    network: &mut Network,
    samples: &mut SampleSet,
    config: &TrainConfig,
) -> Result<f64> {
    if samples.is_empty() {
        return Err(NetworkError::EmptySet);
    }

    let max_epochs = config.max_epochs.max(1);
    let mut last_accuracy = 0.0;

    for epoch in 1..=max_epochs {
        let t_start = Instant::now();

        // ── One full pass over the samples ─────────────────────────────────
        let (solved, backward_passes, exhausted) = run_one_epoch(network, samples)?;
        let accuracy = solved as f64 / samples.len() as f64;
        last_accuracy = accuracy;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        info!(epoch, accuracy, backward_passes, exhausted, elapsed_ms, "epoch finished");

        // ── Emit progress ─────────────────────────────────────────────────
        let stats = EpochStats {
            epoch,
            max_epochs,
            accuracy,
            backward_passes,
            exhausted,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }

        if accuracy > config.acceptable_accuracy {
            break;
        }

        // Checked between epochs, so a run stopped early still reports the
        // accuracy of a finished epoch.
        if stop_requested(config) {
            break;
        }
    }

    Ok(last_accuracy)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

/// Runs `train_one` over every sample in order.
/// Returns (samples learned without an update, backward passes, samples given up on).
fn run_one_epoch(network: &mut Network, samples: &mut SampleSet) -> Result<(usize, usize, usize)> {
    let max_attempts = network.params().max_attempts;
    let mut solved = 0;
    let mut backward_passes = 0;
    let mut exhausted = 0;

    for sample in samples.iter_mut() {
        let attempts = network.train_one(sample)?;
        backward_passes += attempts;
        if attempts == 0 {
            solved += 1;
        } else if attempts >= max_attempts {
            exhausted += 1;
        }
    }

    Ok((solved, backward_passes, exhausted))
}
