use std::io::Cursor;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::debug;

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &[u8], value: &[u8]) -> Header {
    Header::from_bytes(name, value).expect("static header is valid")
}

pub fn json_response<T: Serialize>(status: u16, body: &T) -> Response<Cursor<Vec<u8>>> {
    let bytes = serde_json::to_vec_pretty(body).unwrap_or_else(|_| b"null".to_vec());
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![header(b"Content-Type", b"application/json")],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn error_response(status: u16, message: impl Into<String>) -> Response<Cursor<Vec<u8>>> {
    json_response(status, &serde_json::json!({ "error": message.into() }))
}

/// Largest sample set a single request may ask for. Sets are generated
/// while the state lock is held.
pub const MAX_SET_SIZE: usize = 10_000;

/// 400 when a requested set size is above `MAX_SET_SIZE`.
pub fn check_set_size(size: usize) -> Result<(), Response<Cursor<Vec<u8>>>> {
    if size > MAX_SET_SIZE {
        return Err(error_response(400, format!("size {size} exceeds the limit of {MAX_SET_SIZE}")));
    }
    Ok(())
}

/// 409 for every request that needs the network while training holds it.
pub fn busy() -> Response<Cursor<Vec<u8>>> {
    error_response(409, "training in progress")
}

pub fn png_response(bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = bytes.len();
    Response::new(
        StatusCode(200),
        vec![
            header(b"Content-Type", b"image/png"),
            header(b"Cache-Control", b"no-cache"),
        ],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    error_response(404, "not found")
}

/// Reads a JSON request body; an empty body yields `T::default()`.
pub fn read_json<T: DeserializeOwned + Default>(request: &mut Request) -> Result<T, String> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body).map_err(|e| e.to_string())?;
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&body).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// Handlers that read a body receive `&mut Request`; the dispatcher keeps
/// ownership and responds at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();
    debug!(?method, %path, "request");

    let response = match (method, path.as_str()) {
        (Method::Get,  "/status")      => handlers::network::handle_status(state),
        (Method::Post, "/network")     => handlers::network::handle_rebuild(&mut request, state),

        (Method::Post, "/predict")     => handlers::figure::handle_predict(state),
        (Method::Post, "/train-one")   => handlers::figure::handle_train_one(state),
        (Method::Get,  "/figure.png")  => handlers::figure::handle_png(state),

        (Method::Post, "/train")       => handlers::train::handle_start(&mut request, state),
        (Method::Post, "/train/stop")  => handlers::train::handle_stop(state),

        (Method::Post, "/test")        => handlers::test::handle_test(&mut request, state),

        _ => not_found(),
    };

    let _ = request.respond(response);
}
