//! Shared fixtures for the checker integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use vaxfinder_checker::{LocationsSink, LogSink, NotificationSink, SessionClient, SessionOptions, Sinks};

pub const TEST_AGENT: &str = "vaxfinder-test/0.1";

/// Session with a 5-second timeout and no cookie jar.
pub fn plain_session() -> SessionClient {
    SessionClient::new(&SessionOptions::new(5, TEST_AGENT)).expect("failed to build test session")
}

#[derive(Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for RecordingLog {
    fn append(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingNotifications {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifications {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifications {
    fn notify(&self, target_name: &str, message: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((target_name.to_owned(), message.to_owned()));
    }
}

#[derive(Default)]
pub struct RecordingLocations {
    updates: Mutex<Vec<Vec<String>>>,
}

impl RecordingLocations {
    pub fn updates(&self) -> Vec<Vec<String>> {
        self.updates.lock().unwrap().clone()
    }
}

impl LocationsSink for RecordingLocations {
    fn update(&self, cities: &[String]) {
        self.updates.lock().unwrap().push(cities.to_vec());
    }
}

/// Recording sinks plus the [`Sinks`] bundle wired to them.
pub fn recording_sinks() -> (Arc<RecordingLog>, Arc<RecordingNotifications>, Sinks) {
    let log = Arc::new(RecordingLog::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let sinks = Sinks::new(log.clone(), notifications.clone());
    (log, notifications, sinks)
}
