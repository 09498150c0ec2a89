//! HTTP endpoint handlers for the relay server.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::store::{FrameStore, EMPTY_TOKEN};

use super::page;

/// Largest accepted frame body. Encoded plots stay far below this; raw
/// bitmaps relayed through `show_image` can get large.
const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Build the relay router over a store.
pub fn router(store: FrameStore) -> Router {
    // The page may be opened from other devices on the LAN
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .route("/", get(viewer).post(ingest))
        .route("/poll", get(poll))
        .layer(DefaultBodyLimit::max(MAX_FRAME_BYTES))
        .layer(cors)
        .with_state(store)
}

/// Poll query parameters
#[derive(Debug, Deserialize)]
struct PollParams {
    token: String,
}

/// `POST /`: store the body as the new frame.
///
/// The bytes are not inspected; a malformed image surfaces in the
/// browser's decoder, not here.
async fn ingest(State(store): State<FrameStore>, body: Bytes) -> &'static str {
    let token = store.set(body);
    tracing::debug!("stored frame, token={}", token);
    "success"
}

/// `GET /`: the viewer page embedding the current frame.
///
/// An empty store still renders the page, with an empty image value.
async fn viewer(State(store): State<FrameStore>) -> Html<String> {
    let (frame, token) = store.get().unwrap_or((Bytes::new(), EMPTY_TOKEN));
    Html(page::render(&frame, token))
}

/// `GET /poll?token=<n>`: 200 while the page is current, 205 once stale.
///
/// A token that does not parse as an integer counts as stale.
async fn poll(State(store): State<FrameStore>, Query(params): Query<PollParams>) -> Response {
    match params.token.parse::<u64>() {
        Ok(token) if token == store.current_token() => {
            (StatusCode::OK, "success").into_response()
        }
        _ => StatusCode::RESET_CONTENT.into_response(),
    }
}
