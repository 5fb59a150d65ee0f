/// shapes-nn Studio
///
/// A small JSON-over-HTTP driver for the shape recognizer, served by a
/// synchronous tiny_http server.
///
/// Run with:
///   cargo run --bin studio --release -- [spec.json]
/// Then, for example:
///   curl -X POST localhost:7878/predict
///   curl -X POST localhost:7878/train -d '{"size":200,"epochs":50}'
///   curl localhost:7878/status
///
/// Endpoints:
///   GET  /status     : structure, busy flag, training progress
///   POST /network    : rebuild from `{ "structure": "400;8;4" }`
///   POST /predict    : classify a new figure
///   POST /train-one  : train on a new figure
///   POST /train      : train on a generated set in the background
///   POST /train/stop : stop the running training after its epoch
///   POST /test       : accuracy on a generated set
///   GET  /figure.png : the last generated figure

mod state;
mod routes;
mod handlers;

use std::sync::{Arc, Mutex};
use tiny_http::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shapes_nn::NetworkSpec;
use state::StudioState;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let spec = match std::env::args().nth(1) {
        Some(path) => match NetworkSpec::load_json(&path) {
            Ok(spec) => spec,
            Err(e) => {
                error!(path = %path, error = %e, "cannot read network spec");
                std::process::exit(1);
            }
        },
        None => NetworkSpec::default(),
    };

    let studio = match StudioState::new(spec) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "cannot build network");
            std::process::exit(1);
        }
    };

    let addr = "127.0.0.1:7878";
    let server = match Server::http(addr) {
        Ok(s) => s,
        Err(e) => {
            error!(addr, error = %e, "failed to bind HTTP server");
            std::process::exit(1);
        }
    };
    info!(addr, structure = %studio.spec.structure(), "shapes-nn studio listening");

    let shared_state = Arc::new(Mutex::new(studio));

    // One thread per request so a slow handler does not stall the others;
    // training itself runs on its own thread and never blocks a request.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}
