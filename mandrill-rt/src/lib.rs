//! mandrill-rt - Mandrill inbound webhook to RT mail gateway bridge.
//!
//! Mandrill posts batches of inbound email events; each inbound message is
//! routed to an RT queue by its recipient address and re-posted to RT.
//!
//! ## Architecture
//!
//! ```text
//! Mandrill → POST /mx → EventProcessor → RoutingTable::route → RtGateway → RT
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod processor;
pub mod routing;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigLoadError, DecodeError, ForwardError};
pub use events::{decode_events, InboundEvent, InboundMessage};
pub use gateway::{ForwardRequest, Gateway, GatewayReply, RtGateway};
pub use processor::{BatchOutcome, EventOutcome, EventProcessor};
pub use routing::{Action, Route, RoutingTable};
pub use web::AppState;
