//! Polling engine: one tokio task per target running check, notify, sleep
//! until told to stop.

use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::checker::{Availability, Checker, PollState};
use crate::sink::Sinks;

/// Multiplier applied to the check period after a cycle that found availability.
pub const FOUND_DELAY_FACTOR: u32 = 4;

#[must_use]
pub fn sleep_duration(state: PollState, period: Duration) -> Duration {
    match state {
        PollState::NormalCheck => period,
        PollState::FoundAppointmentDelay => period.saturating_mul(FOUND_DELAY_FACTOR),
    }
}

/// Operator notification body: the provider page, then the checker's detail.
#[must_use]
pub fn notification_text(url: &str, message: &str) -> String {
    format!("{url}\n{message}")
}

/// Handle to one running target.
///
/// Dropping the handle signals the task to stop but does not wait for it;
/// call [`Target::shutdown`] to join.
pub struct Target {
    name: String,
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Target {
    /// Starts polling `checker` every `period` on a new task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(checker: Box<dyn Checker>, period: Duration, sinks: Sinks) -> Self {
        let name = checker.name().to_owned();
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_check_loop(checker, period, sinks, stop_rx));
        tracing::info!(target_name = %name, period_secs = period.as_secs(), "target started");

        Self {
            name,
            stop_tx,
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests cancellation. A sleeping loop wakes immediately; a cycle in
    /// progress finishes first.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Stops the loop and waits for its task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(target_name = %self.name, error = %e, "target task did not exit cleanly");
            }
        }
        tracing::info!(target_name = %self.name, "target stopped");
    }
}

impl Drop for Target {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

async fn run_check_loop(
    mut checker: Box<dyn Checker>,
    period: Duration,
    sinks: Sinks,
    mut stop_rx: watch::Receiver<bool>,
) {
    let name = checker.name().to_owned();
    sinks.log.append(&format!("Beginning {name} search..."));

    loop {
        if *stop_rx.borrow_and_update() {
            break;
        }

        let state = match checker.check_availability().await {
            Ok(Availability {
                available: true,
                message,
            }) => {
                let text = notification_text(checker.url(), &message);
                sinks.log.append("Found appointment!");
                sinks.log.append(&text);
                sinks.notifications.notify(&name, &text);
                checker.state_after_found()
            }
            Ok(_) => {
                tracing::debug!(target_name = %name, "no appointments");
                PollState::NormalCheck
            }
            Err(e) => {
                tracing::warn!(target_name = %name, error = %e, "check failed");
                sinks.log.append(&format!("{name} check failed: {e}"));
                PollState::NormalCheck
            }
        };

        let delay = sleep_duration(state, period);
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(target_name = %name, "check loop exited");
}

/// The targets of one search. Replacing the search stops and joins every
/// running target before the new ones take over.
///
/// Dropping the set only signals its targets to stop; it cannot wait for them
/// from `Drop`. Call [`TargetSet::shutdown_all`] first when the caller must know
/// every task has exited.
#[derive(Default)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(Target::name)
    }

    /// Stops every target, then waits for all of them.
    pub async fn shutdown_all(&mut self) {
        for target in &self.targets {
            target.stop();
        }
        join_all(self.targets.drain(..).map(Target::shutdown)).await;
    }

    pub async fn replace(&mut self, next: TargetSet) {
        self.shutdown_all().await;
        self.targets = next.targets;
    }
}

impl FromIterator<Target> for TargetSet {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}
