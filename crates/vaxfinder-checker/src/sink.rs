//! Outbound collaborator interfaces.
//!
//! The core never reaches into a UI; it is handed these sinks at construction.
//! Every sink may be called from several target tasks at once.

use std::sync::Arc;

/// Operator-facing history log.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Raised the moment a target reports availability.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, target_name: &str, message: &str);
}

/// Receives the CVS cities seen in the latest status feed, so a front end can
/// offer them as exclusion choices.
pub trait LocationsSink: Send + Sync {
    fn update(&self, cities: &[String]);
}

/// Forwards history lines to `tracing` at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn append(&self, line: &str) {
        tracing::info!(target: "vaxfinder::history", "{line}");
    }
}

/// The sinks every target task writes to.
#[derive(Clone)]
pub struct Sinks {
    pub log: Arc<dyn LogSink>,
    pub notifications: Arc<dyn NotificationSink>,
}

impl Sinks {
    pub fn new(log: Arc<dyn LogSink>, notifications: Arc<dyn NotificationSink>) -> Self {
        Self { log, notifications }
    }
}
