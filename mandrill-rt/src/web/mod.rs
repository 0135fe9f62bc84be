//! Web server module for the Mandrill webhook.
//!
//! This module provides:
//! - `POST /mx`: receives event batches and forwards inbound mail to RT
//! - `HEAD /mx`: liveness probe Mandrill uses when the webhook is added

pub mod handlers;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::gateway::Gateway;

pub use handlers::{batch_status, probe, receive_events, AppState};

/// Build the webhook router.
pub fn router<G: Gateway + 'static>(state: AppState<G>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/mx", post(receive_events::<G>).head(probe))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
