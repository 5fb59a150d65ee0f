use std::io::Cursor;

use serde::{Deserialize, Serialize};
use tiny_http::{Request, Response};
use tracing::info;

use shapes_nn::{EpochStats, NetworkSpec, TrainParams};
use shapes_nn::network::parse_structure;

use crate::routes::{busy, error_response, json_response, read_json};
use crate::state::{SharedState, TrainingStatus};

// ---------------------------------------------------------------------------
// GET /status
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusView {
    name:          String,
    structure:     String,
    learning_rate: f64,
    busy:          bool,
    training:      TrainingView,
    epochs:        Vec<EpochStats>,
}

#[derive(Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
enum TrainingView {
    Idle,
    Running { max_epochs: usize },
    Done { accuracy: f64, elapsed_total_ms: u64, was_stopped: bool },
    Failed { reason: String },
}

pub fn handle_status(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    st.drain_progress();

    let training = match &st.training {
        TrainingStatus::Idle => TrainingView::Idle,
        TrainingStatus::Running { max_epochs, .. } => TrainingView::Running { max_epochs: *max_epochs },
        TrainingStatus::Done { accuracy, elapsed_total_ms, was_stopped } => TrainingView::Done {
            accuracy:         *accuracy,
            elapsed_total_ms: *elapsed_total_ms,
            was_stopped:      *was_stopped,
        },
        TrainingStatus::Failed { reason } => TrainingView::Failed { reason: reason.clone() },
    };

    let view = StatusView {
        name:          st.spec.name.clone(),
        structure:     st.spec.structure(),
        learning_rate: st.spec.train.learning_rate,
        busy:          st.is_busy(),
        training,
        epochs:        st.epoch_history.clone(),
    };
    json_response(200, &view)
}

// ---------------------------------------------------------------------------
// POST /network
// ---------------------------------------------------------------------------

/// Body of `POST /network`. Missing fields keep the current values.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RebuildRequest {
    pub name:      Option<String>,
    /// `;`-separated layer sizes, e.g. `"400;8;4"`.
    pub structure: Option<String>,
    pub train:     Option<TrainParams>,
    pub seed:      Option<u64>,
}

pub fn handle_rebuild(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let body: RebuildRequest = match read_json(request) {
        Ok(b)  => b,
        Err(e) => return error_response(400, e),
    };

    let mut st = state.lock().unwrap();
    if st.is_busy() {
        return busy();
    }

    let mut spec: NetworkSpec = st.spec.clone();
    if let Some(name) = body.name {
        spec.name = name;
    }
    if let Some(structure) = body.structure {
        match parse_structure(&structure) {
            Ok(layers) => spec.layers = layers,
            Err(e)     => return error_response(400, e.to_string()),
        }
    }
    if let Some(train) = body.train {
        spec.train = train;
    }
    if body.seed.is_some() {
        spec.seed = body.seed;
    }

    match st.rebuild(spec) {
        Ok(()) => {
            info!(structure = %st.spec.structure(), "network rebuilt");
            json_response(200, &serde_json::json!({ "structure": st.spec.structure() }))
        }
        Err(e) => error_response(400, e.to_string()),
    }
}
