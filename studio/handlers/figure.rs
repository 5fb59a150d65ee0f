use std::io::Cursor;

use serde::Serialize;
use tiny_http::Response;

use shapes_nn::Sample;

use crate::routes::{busy, error_response, json_response, not_found, png_response};
use crate::state::{SharedState, StudioState};

/// What the driver shows for one generated figure.
#[derive(Serialize)]
struct FigureResult {
    actual:     Option<String>,
    recognized: Option<String>,
    correct:    bool,
    outputs:    Vec<f64>,
    /// Backward passes spent by `/train-one`; absent for `/predict`.
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts:   Option<usize>,
}

fn describe(st: &StudioState, sample: &Sample, outputs: Vec<f64>, attempts: Option<usize>) -> FigureResult {
    FigureResult {
        actual:     sample.actual_class().map(|c| st.spec.label(c)),
        recognized: sample.recognized_class().map(|c| st.spec.label(c)),
        correct:    sample.correct(),
        outputs,
        attempts,
    }
}

// ---------------------------------------------------------------------------
// POST /predict
// ---------------------------------------------------------------------------

/// Draws a new figure and classifies it.
pub fn handle_predict(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let mut network = match st.network.take() {
        Some(n) => n,
        None    => return busy(),
    };

    let mut sample = st.generator.generate_sample();
    st.snapshot_figure();
    let result = network.predict(&mut sample);
    let outputs = network.outputs();
    st.network = Some(network);

    match result {
        Ok(_)  => json_response(200, &describe(&st, &sample, outputs, None)),
        Err(e) => error_response(500, e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// POST /train-one
// ---------------------------------------------------------------------------

/// Draws a new figure and trains on it alone.
pub fn handle_train_one(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let mut network = match st.network.take() {
        Some(n) => n,
        None    => return busy(),
    };

    let mut sample = st.generator.generate_sample();
    st.snapshot_figure();
    let result = network.train_one(&mut sample);
    let outputs = network.outputs();
    st.network = Some(network);

    match result {
        Ok(attempts) => json_response(200, &describe(&st, &sample, outputs, Some(attempts))),
        Err(e)       => error_response(500, e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// GET /figure.png
// ---------------------------------------------------------------------------

pub fn handle_png(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    match &st.figure_png {
        Some(png) => png_response(png.clone()),
        None      => not_found(),
    }
}
