//! Terminal-side sinks handed to the polling engine.

use vaxfinder_checker::{LocationsSink, NotificationSink};

/// Prints each alert to stdout with a terminal bell, and logs it.
pub(crate) struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, target_name: &str, message: &str) {
        tracing::warn!(target_name, "appointment available");
        println!("\x07*** {target_name} ***\n{message}");
    }
}

/// Logs the CVS cities seen in the latest status feed.
pub(crate) struct LoggedLocations;

impl LocationsSink for LoggedLocations {
    fn update(&self, cities: &[String]) {
        tracing::info!(count = cities.len(), cities = %cities.join(", "), "CVS locations");
    }
}
