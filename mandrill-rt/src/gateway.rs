//! Outbound delivery to the RT mail gateway.
//!
//! RT exposes `REST/1.0/NoAuth/mail-gateway`, the same endpoint its
//! `rt-mailgate` helper posts to. It takes a form with `queue`, `action` and
//! the raw `message`.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::error::ForwardError;
use crate::routing::Route;

/// Form submitted to the mail gateway for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardRequest {
    pub queue: String,
    pub action: String,
    pub message: String,
}

impl ForwardRequest {
    pub fn new(route: &Route, message: impl Into<String>) -> Self {
        Self {
            queue: route.queue.clone(),
            action: route.action.to_string(),
            message: message.into(),
        }
    }
}

/// What the gateway answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    pub status: u16,
    /// `None` when the body could not be read
    pub body: Option<String>,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        self.status <= 299
    }
}

/// Something that can deliver a message to the ticketing system.
///
/// Implementations report every response they get, successful or not.
/// Only a missing response is an error.
pub trait Gateway: Send + Sync {
    fn forward(
        &self,
        request: &ForwardRequest,
    ) -> impl Future<Output = Result<GatewayReply, ForwardError>> + Send;
}

/// HTTP client for RT's mail gateway.
#[derive(Debug, Clone)]
pub struct RtGateway {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl RtGateway {
    pub fn new(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

impl Gateway for RtGateway {
    async fn forward(&self, request: &ForwardRequest) -> Result<GatewayReply, ForwardError> {
        info!(
            url = %self.url,
            queue = %request.queue,
            action = %request.action,
            message_length = request.message.len(),
            "gateway_post_starting"
        );

        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .form(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(
                        url = %self.url,
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "gateway_post_timeout"
                    );
                } else {
                    warn!(url = %self.url, error = %e, "gateway_post_error");
                }
                ForwardError::from(e)
            })?;

        let status = response.status().as_u16();

        let body = match response.text().await {
            Ok(body) => {
                info!(status_code = status, body = %body, "gateway_response");
                Some(body)
            }
            Err(e) => {
                warn!(status_code = status, error = %e, "gateway_response_read_failed");
                None
            }
        };

        Ok(GatewayReply { status, body })
    }
}
