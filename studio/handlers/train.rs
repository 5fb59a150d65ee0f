use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}, mpsc};
use std::thread;
use std::io::Cursor;

use serde::Deserialize;
use tiny_http::{Request, Response};
use tracing::{error, info};

use shapes_nn::{EpochStats, TrainConfig, train_loop};

use crate::routes::{busy, check_set_size, error_response, json_response, read_json};
use crate::state::{SharedState, TrainingStatus};

/// Body of `POST /train`.
#[derive(Deserialize)]
#[serde(default)]
pub struct TrainRequest {
    /// Number of figures generated for the training set.
    pub size:                usize,
    pub epochs:              usize,
    pub acceptable_accuracy: f64,
}

impl Default for TrainRequest {
    fn default() -> Self {
        TrainRequest { size: 100, epochs: 10, acceptable_accuracy: 0.9 }
    }
}

// ---------------------------------------------------------------------------
// POST /train
// ---------------------------------------------------------------------------

/// Generates a training set and trains on it in a background thread.
///
/// The thread takes the network out of the shared state, so every request
/// that needs it answers 409 until training is over.
pub fn handle_start(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let body: TrainRequest = match read_json(request) {
        Ok(b)  => b,
        Err(e) => return error_response(400, e),
    };
    start_training(body, state)
}

pub fn start_training(body: TrainRequest, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    if body.size == 0 {
        return error_response(400, "training set must not be empty");
    }
    if let Err(response) = check_set_size(body.size) {
        return response;
    }

    let mut st = state.lock().unwrap();
    let mut network = match st.network.take() {
        Some(n) => n,
        None    => return busy(),
    };
    let mut samples = st.generator.generate_set(body.size);

    let (tx, rx) = mpsc::channel::<EpochStats>();
    let stop_flag = Arc::new(AtomicBool::new(false));

    st.training = TrainingStatus::Running {
        stop_flag:  stop_flag.clone(),
        epoch_rx:   Arc::new(Mutex::new(rx)),
        max_epochs: body.epochs,
    };
    st.epoch_history.clear();
    drop(st);

    info!(size = body.size, epochs = body.epochs, "training started");

    // Spawn background training thread.
    let state_clone = state.clone();
    thread::spawn(move || {
        let mut config = TrainConfig::new(body.epochs, body.acceptable_accuracy);
        config.progress_tx = Some(tx);
        config.stop_flag   = Some(stop_flag.clone());

        let t_start = std::time::Instant::now();
        let result = train_loop(&mut network, &mut samples, &config);
        let elapsed_total_ms = t_start.elapsed().as_millis() as u64;
        let was_stopped = stop_flag.load(Ordering::Relaxed);

        let mut st = state_clone.lock().unwrap();
        // Pick up the epochs sent since the last status poll.
        st.drain_progress();
        st.training = match result {
            Ok(accuracy) => {
                info!(accuracy, elapsed_total_ms, was_stopped, "training finished");
                TrainingStatus::Done { accuracy, elapsed_total_ms, was_stopped }
            }
            Err(e) => {
                error!(error = %e, "training failed");
                TrainingStatus::Failed { reason: e.to_string() }
            }
        };
        st.network = Some(network);
    });

    json_response(202, &serde_json::json!({ "started": true }))
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let stopping = match &st.training {
        TrainingStatus::Running { stop_flag, .. } => {
            stop_flag.store(true, Ordering::Relaxed);
            true
        }
        _ => false,
    };
    json_response(200, &serde_json::json!({ "stopping": stopping }))
}
