//! Polling engine tests with scripted checkers and recording sinks.

mod common;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{timeout, Instant};

use vaxfinder_checker::{Availability, CheckError, Checker, PollState, Target, TargetSet};

use common::recording_sinks;

/// Replays a fixed script of outcomes, then reports nothing; records when
/// each cycle started.
struct ScriptedChecker {
    script: VecDeque<Result<Availability, CheckError>>,
    calls: Arc<Mutex<Vec<Instant>>>,
    after_found: PollState,
}

impl ScriptedChecker {
    fn new(script: Vec<Result<Availability, CheckError>>) -> (Self, Arc<Mutex<Vec<Instant>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let checker = Self {
            script: script.into(),
            calls: Arc::clone(&calls),
            after_found: PollState::FoundAppointmentDelay,
        };
        (checker, calls)
    }
}

#[async_trait]
impl Checker for ScriptedChecker {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn url(&self) -> &str {
        "https://clinic.test/book"
    }

    async fn check_availability(&mut self) -> Result<Availability, CheckError> {
        self.calls.lock().unwrap().push(Instant::now());
        self.script.pop_front().unwrap_or_else(|| Ok(Availability::none()))
    }

    fn state_after_found(&self) -> PollState {
        self.after_found
    }
}

fn structural_failure() -> CheckError {
    CheckError::MissingField {
        context: "scripted".into(),
        field: "data".into(),
    }
}

async fn wait_for_calls(calls: &Arc<Mutex<Vec<Instant>>>, n: usize) {
    timeout(Duration::from_secs(5), async {
        while calls.lock().unwrap().len() < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("checker was not called often enough");
}

#[tokio::test]
async fn stop_wakes_a_sleeping_target_immediately() {
    let (checker, calls) = ScriptedChecker::new(vec![]);
    let (_log, _notes, sinks) = recording_sinks();

    let target = Target::spawn(Box::new(checker), Duration::from_secs(3600), sinks);
    wait_for_calls(&calls, 1).await;

    let started = Instant::now();
    timeout(Duration::from_secs(1), target.shutdown())
        .await
        .expect("shutdown waited for the remaining period");
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn found_appointment_is_logged_and_notified() {
    let (checker, calls) = ScriptedChecker::new(vec![Ok(Availability::found("NORRISTOWN\n"))]);
    let (log, notes, sinks) = recording_sinks();

    let target = Target::spawn(Box::new(checker), Duration::from_secs(3600), sinks);
    wait_for_calls(&calls, 1).await;
    target.shutdown().await;

    assert_eq!(
        log.lines(),
        vec![
            "Beginning Scripted search...".to_string(),
            "Found appointment!".to_string(),
            "https://clinic.test/book\nNORRISTOWN\n".to_string(),
        ]
    );
    assert_eq!(
        notes.sent(),
        vec![(
            "Scripted".to_string(),
            "https://clinic.test/book\nNORRISTOWN\n".to_string()
        )]
    );
}

#[tokio::test]
async fn failures_are_logged_and_polling_continues() {
    let (checker, calls) = ScriptedChecker::new(vec![
        Err(structural_failure()),
        Err(structural_failure()),
        Ok(Availability::found("")),
    ]);
    let (log, notes, sinks) = recording_sinks();

    let target = Target::spawn(Box::new(checker), Duration::from_millis(20), sinks);
    wait_for_calls(&calls, 3).await;
    target.shutdown().await;

    let failures = log
        .lines()
        .iter()
        .filter(|l| l.starts_with("Scripted check failed:"))
        .count();
    assert_eq!(failures, 2);
    assert_eq!(notes.sent().len(), 1);
}

#[tokio::test]
async fn found_appointment_backs_off_four_periods() {
    let period = Duration::from_millis(100);
    let (checker, calls) = ScriptedChecker::new(vec![Ok(Availability::found("")), Ok(Availability::none())]);
    let (_log, _notes, sinks) = recording_sinks();

    let target = Target::spawn(Box::new(checker), period, sinks);
    wait_for_calls(&calls, 3).await;
    target.shutdown().await;

    let calls = calls.lock().unwrap();
    let after_found = calls[1] - calls[0];
    let after_none = calls[2] - calls[1];
    assert!(after_found >= period * 4, "after found: {after_found:?}");
    assert!(after_none < period * 4, "after none: {after_none:?}");
}

#[tokio::test]
async fn checker_can_keep_normal_cadence_after_found() {
    let period = Duration::from_millis(100);
    let (mut checker, calls) = ScriptedChecker::new(vec![Ok(Availability::found(""))]);
    checker.after_found = PollState::NormalCheck;
    let (_log, _notes, sinks) = recording_sinks();

    let target = Target::spawn(Box::new(checker), period, sinks);
    wait_for_calls(&calls, 2).await;
    target.shutdown().await;

    let calls = calls.lock().unwrap();
    assert!(calls[1] - calls[0] < period * 4);
}

#[tokio::test]
async fn dropping_a_target_stops_its_loop() {
    let (checker, calls) = ScriptedChecker::new(vec![]);
    let (_log, _notes, sinks) = recording_sinks();

    let target = Target::spawn(Box::new(checker), Duration::from_millis(20), sinks);
    wait_for_calls(&calls, 1).await;
    drop(target);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let seen = calls.lock().unwrap().len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.lock().unwrap().len(), seen);
}

#[tokio::test]
async fn replacing_a_target_set_joins_the_old_targets() {
    let (first, first_calls) = ScriptedChecker::new(vec![]);
    let (second, second_calls) = ScriptedChecker::new(vec![]);
    let (_log, _notes, sinks) = recording_sinks();

    let mut set: TargetSet = [Target::spawn(Box::new(first), Duration::from_secs(3600), sinks.clone())]
        .into_iter()
        .collect();
    wait_for_calls(&first_calls, 1).await;

    let next: TargetSet = [Target::spawn(Box::new(second), Duration::from_secs(3600), sinks)]
        .into_iter()
        .collect();
    timeout(Duration::from_secs(1), set.replace(next))
        .await
        .expect("replace waited for the old target's period");
    wait_for_calls(&second_calls, 1).await;

    assert_eq!(set.len(), 1);
    assert_eq!(first_calls.lock().unwrap().len(), 1);

    timeout(Duration::from_secs(1), set.shutdown_all()).await.unwrap();
    assert!(set.is_empty());
}

#[tokio::test]
async fn dropping_a_target_set_signals_every_target() {
    let (first, first_calls) = ScriptedChecker::new(vec![]);
    let (second, second_calls) = ScriptedChecker::new(vec![]);
    let (_log, _notes, sinks) = recording_sinks();

    let set: TargetSet = [
        Target::spawn(Box::new(first), Duration::from_millis(20), sinks.clone()),
        Target::spawn(Box::new(second), Duration::from_millis(20), sinks),
    ]
    .into_iter()
    .collect();
    wait_for_calls(&first_calls, 1).await;
    wait_for_calls(&second_calls, 1).await;
    drop(set);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let seen = (first_calls.lock().unwrap().len(), second_calls.lock().unwrap().len());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        (first_calls.lock().unwrap().len(), second_calls.lock().unwrap().len()),
        seen
    );
}
