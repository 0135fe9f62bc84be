//! Webhook endpoint handlers.
//!
//! Mandrill expects a quick 2xx for a batch it may retry later; a 5xx makes it
//! redeliver the whole batch.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Form,
};
use tracing::{error, info, warn};

use crate::error::DecodeError;
use crate::events::EVENTS_FIELD;
use crate::gateway::Gateway;
use crate::processor::{BatchOutcome, EventProcessor};

/// Shared application state.
pub struct AppState<G> {
    pub processor: Arc<EventProcessor<G>>,
}

impl<G> AppState<G> {
    pub fn new(processor: EventProcessor<G>) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
        }
    }
}

/// `HEAD /mx`, used by Mandrill to check the webhook URL exists.
pub async fn probe() -> StatusCode {
    info!("mx_probe");
    StatusCode::OK
}

/// `POST /mx`, a batch of Mandrill events.
///
/// The form may be urlencoded or multipart; the query string is consulted
/// when the body has no `mandrill_events` field. A missing or unreadable
/// field is handled as an empty value, which does not decode.
pub async fn receive_events<G: Gateway + 'static>(
    State(state): State<AppState<G>>,
    request: Request,
) -> StatusCode {
    let payload = read_events_field(request).await.unwrap_or_else(|| {
        warn!(field = EVENTS_FIELD, "mx_events_field_missing");
        String::new()
    });

    let result = state.processor.process(&payload).await;
    let status = batch_status(&result);

    info!(status_code = status.as_u16(), "mx_batch_complete");

    status
}

/// Map a batch result to the webhook response status.
pub fn batch_status(result: &Result<BatchOutcome, DecodeError>) -> StatusCode {
    match result {
        Err(e) => {
            error!(error = %e, "mx_batch_undecodable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Ok(outcome) if outcome.has_failures() => StatusCode::SERVICE_UNAVAILABLE,
        Ok(_) => StatusCode::NO_CONTENT,
    }
}

async fn read_events_field(request: Request) -> Option<String> {
    let query = request.uri().query().map(str::to_owned);

    read_body_field(request)
        .await
        .or_else(|| query.as_deref().and_then(query_field))
}

/// Body values take precedence over query values of the same name.
fn query_field(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == EVENTS_FIELD)
        .map(|(_, value)| value.into_owned())
}

async fn read_body_field(request: Request) -> Option<String> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        read_multipart_field(request).await
    } else {
        match Form::<HashMap<String, String>>::from_request(request, &()).await {
            Ok(Form(mut fields)) => fields.remove(EVENTS_FIELD),
            Err(e) => {
                warn!(error = %e, "mx_form_rejected");
                None
            }
        }
    }
}

async fn read_multipart_field(request: Request) -> Option<String> {
    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(e) => {
            warn!(error = %e, "mx_multipart_rejected");
            return None;
        }
    };

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(EVENTS_FIELD) {
                    continue;
                }
                // Decoded lossily, like urlencoded values.
                return match field.bytes().await {
                    Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(e) => {
                        warn!(error = %e, "mx_multipart_field_unreadable");
                        None
                    }
                };
            }
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "mx_multipart_unreadable");
                return None;
            }
        }
    }
}
