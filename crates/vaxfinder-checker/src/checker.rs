//! The per-provider capability the polling engine drives.

use async_trait::async_trait;

use crate::error::CheckError;

/// Governs how long the engine sleeps after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    NormalCheck,
    FoundAppointmentDelay,
}

/// Verdict of one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    /// Human-readable location detail; may be empty even when available.
    pub message: String,
}

impl Availability {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn found(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }
}

/// One monitored provider.
///
/// `Err` means the cycle could not reach a verdict (transport or structural
/// parse failure). "No appointments" is `Ok` with `available == false`.
#[async_trait]
pub trait Checker: Send {
    /// Display label used in logs and notifications.
    fn name(&self) -> &str;

    /// Canonical provider page.
    fn url(&self) -> &str;

    async fn check_availability(&mut self) -> Result<Availability, CheckError>;

    /// State to enter after a cycle that found availability.
    fn state_after_found(&self) -> PollState {
        PollState::FoundAppointmentDelay
    }
}
