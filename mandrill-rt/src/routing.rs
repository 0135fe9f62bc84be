//! Address to queue routing.
//!
//! The routing table maps a target (a full address such as
//! `support@example.com`, or a bare local part such as `support`) to an RT
//! queue. Every target also has a comment variant: `support-comment@example.com`
//! or `support-comment` routes to the same queue with the `comment` action.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ConfigLoadError;

const COMMENT_SUFFIX: &str = "-comment";

/// What RT should do with a forwarded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Open a new ticket or reply on an existing one.
    Correspond,
    /// Attach the message as a private comment.
    Comment,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Correspond => "correspond",
            Action::Comment => "comment",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing decision for one recipient address.
///
/// An empty `queue` means no entry matched and RT falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub queue: String,
    pub action: Action,
}

impl Route {
    fn new(queue: &str, action: Action) -> Self {
        Self {
            queue: queue.to_string(),
            action,
        }
    }

    /// The no-match route.
    pub fn unrouted() -> Self {
        Self::new("", Action::Correspond)
    }

    pub fn is_unrouted(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Immutable address to queue table.
///
/// Entries are scanned in key order, so when two targets could both match an
/// address the lexicographically smaller key wins.
///
/// Keys are kept exactly as configured. Lookups lowercase the address, so a
/// key with uppercase characters never matches.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    entries: BTreeMap<String, String>,
}

impl RoutingTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        let table = Self { entries };
        table.warn_on_mixed_case_keys();
        table
    }

    /// Parse a table from a JSON object of `target -> queue`.
    pub fn from_json(raw: &str) -> Result<Self, ConfigLoadError> {
        let entries: BTreeMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self::new(entries))
    }

    /// Load a table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let table = Self::from_json(&raw)?;

        info!(
            path = %path.display(),
            entries = table.len(),
            "routing_table_loaded"
        );

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decide which queue and action an inbound recipient maps to.
    ///
    /// The full address is tried against every entry first, then the bare
    /// local part. Only the first `@` separates the local part.
    pub fn route(&self, address: &str) -> Route {
        let address = address.to_lowercase();

        let local = match address.find('@') {
            Some(idx) if idx > 0 => &address[..idx],
            _ => return Route::unrouted(),
        };

        for candidate in [address.as_str(), local] {
            for (target, queue) in &self.entries {
                if candidate == target {
                    return Route::new(queue, Action::Correspond);
                }
                if candidate == comment_variant(target) {
                    return Route::new(queue, Action::Comment);
                }
            }
        }

        Route::unrouted()
    }

    fn warn_on_mixed_case_keys(&self) {
        for target in self.entries.keys() {
            if target.chars().any(char::is_uppercase) {
                warn!(
                    target = %target,
                    "routing_target_not_lowercase"
                );
            }
        }
    }
}

/// `user@host` becomes `user-comment@host`; anything else gets the suffix appended.
fn comment_variant(target: &str) -> String {
    match target.find('@') {
        Some(idx) if idx > 0 => {
            format!("{}{}{}", &target[..idx], COMMENT_SUFFIX, &target[idx..])
        }
        _ => format!("{}{}", target, COMMENT_SUFFIX),
    }
}
