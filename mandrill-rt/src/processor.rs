//! Batch processing - the core forwarding logic.
//!
//! A batch is decoded, every inbound event is routed and forwarded exactly
//! once, and the per-event results are folded into a `BatchOutcome`. One
//! event failing never stops the rest of the batch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{DecodeError, ForwardError};
use crate::events::{decode_events, InboundEvent};
use crate::gateway::{ForwardRequest, Gateway};
use crate::routing::{Route, RoutingTable};

/// Result of handling a single event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Not an inbound message
    Ignored { kind: String },
    /// Accepted by the gateway
    Forwarded {
        recipient: String,
        route: Route,
        status: u16,
    },
    /// Transport error or non-2xx response
    Failed {
        recipient: String,
        route: Route,
        error: ForwardError,
    },
}

impl EventOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, EventOutcome::Failed { .. })
    }
}

/// Everything that happened to one batch, in event order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outcomes: Vec<EventOutcome>,
}

impl BatchOutcome {
    fn record(mut self, outcome: EventOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    /// True when any forward attempt failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(EventOutcome::is_failure)
    }

    pub fn forwarded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EventOutcome::Forwarded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn ignored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EventOutcome::Ignored { .. }))
            .count()
    }
}

/// Routes Mandrill events and hands them to a gateway.
pub struct EventProcessor<G> {
    table: Arc<RoutingTable>,
    gateway: G,
}

impl<G: Gateway> EventProcessor<G> {
    pub fn new(table: Arc<RoutingTable>, gateway: G) -> Self {
        Self { table, gateway }
    }

    /// Process a raw `mandrill_events` payload.
    ///
    /// Returns `DecodeError` without contacting the gateway when the payload
    /// is not a JSON array of events.
    pub async fn process(&self, raw: &str) -> Result<BatchOutcome, DecodeError> {
        info!(payload_length = raw.len(), "events_received");
        debug!(payload = %raw, "events_raw_payload");

        let events = decode_events(raw).map_err(|e| {
            warn!(error = %e, "events_decode_failed");
            e
        })?;

        debug!(events = ?events, "events_decoded");

        let mut batch = BatchOutcome::default();
        for event in &events {
            batch = batch.record(self.handle_event(event).await);
        }

        info!(
            events = events.len(),
            forwarded = batch.forwarded(),
            failed = batch.failed(),
            ignored = batch.ignored(),
            "events_processed"
        );

        Ok(batch)
    }

    async fn handle_event(&self, event: &InboundEvent) -> EventOutcome {
        if !event.is_inbound() {
            info!(kind = %event.event, "event_ignored");
            return EventOutcome::Ignored {
                kind: event.event.clone(),
            };
        }

        let recipient = event.msg.email.clone();
        let route = self.table.route(&recipient);

        info!(
            recipient = %recipient,
            from = %event.msg.from_email,
            subject = %event.msg.subject,
            queue = %route.queue,
            action = %route.action,
            routed = !route.is_unrouted(),
            "event_routed"
        );

        let request = ForwardRequest::new(&route, event.msg.raw_msg.as_str());

        let error = match self.gateway.forward(&request).await {
            Ok(reply) if reply.is_success() => {
                info!(
                    recipient = %recipient,
                    queue = %route.queue,
                    status_code = reply.status,
                    "event_forwarded"
                );
                return EventOutcome::Forwarded {
                    recipient,
                    route,
                    status: reply.status,
                };
            }
            Ok(reply) => ForwardError::Rejected {
                status: reply.status,
            },
            Err(e) => e,
        };

        warn!(
            recipient = %recipient,
            queue = %route.queue,
            error = %error,
            "event_forward_failed"
        );

        EventOutcome::Failed {
            recipient,
            route,
            error,
        }
    }
}
