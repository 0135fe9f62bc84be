//! Process configuration.
//!
//! Every setting is a command line flag that can also come from the
//! environment. Only the listen address and the routing table path are
//! usually changed; the rest exist for tests and unusual deployments.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

/// Default RT mail gateway endpoint.
pub const DEFAULT_GATEWAY_URL: &str = "https://rt.ntppool.org/REST/1.0/NoAuth/mail-gateway";

/// Mandrill inbound batches can carry large attachments.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Bridge from Mandrill inbound webhooks to the RT mail gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "mandrill-rt")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Pathname of the JSON address to queue configuration file
    #[arg(short, long, env = "MANDRILL_RT_CONFIG", default_value = "mandrill-rt.json")]
    pub config: PathBuf,

    /// Listen address
    #[arg(short, long, env = "MANDRILL_RT_LISTEN", default_value = "0.0.0.0:8002")]
    pub listen: SocketAddr,

    /// RT mail gateway URL messages are posted to
    #[arg(long, env = "MANDRILL_RT_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: Url,

    /// Timeout for each gateway request, in milliseconds
    #[arg(long, env = "MANDRILL_RT_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Maximum accepted webhook body size, in bytes
    #[arg(long, env = "MANDRILL_RT_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
