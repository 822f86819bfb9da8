//! Jefferson Health checker.
//!
//! The clinics page lists every site with a "full" banner when it has no
//! openings. Three or more banners mean all sites are full.

use async_trait::async_trait;

use crate::checker::{Availability, Checker};
use crate::error::CheckError;
use crate::session::{SessionClient, SessionOptions};

pub const FULL_REGISTRATION_PHRASE: &str = "Registration is currently full at this location.";

/// Banner count at which every listed clinic is considered full.
pub const FULL_CLINIC_THRESHOLD: usize = 3;

/// Non-overlapping occurrences of the "full" banner in `page`.
#[must_use]
pub fn count_full_statements(page: &str) -> usize {
    page.matches(FULL_REGISTRATION_PHRASE).count()
}

#[must_use]
pub fn has_open_registration(page: &str) -> bool {
    count_full_statements(page) < FULL_CLINIC_THRESHOLD
}

pub struct JeffersonChecker {
    url: String,
    session: SessionClient,
}

impl JeffersonChecker {
    pub fn new(url: &str, session: SessionClient) -> Self {
        Self {
            url: url.to_owned(),
            session,
        }
    }

    /// Plain page fetch: no cookies, redirects are not followed.
    #[must_use]
    pub fn session_options(timeout_secs: u64, user_agent: &str) -> SessionOptions {
        SessionOptions::new(timeout_secs, user_agent)
    }
}

#[async_trait]
impl Checker for JeffersonChecker {
    fn name(&self) -> &str {
        "Jefferson"
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn check_availability(&mut self) -> Result<Availability, CheckError> {
        let page = self.session.get(&self.url).await.inspect_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "Jefferson get failed");
        })?;

        if has_open_registration(&page) {
            Ok(Availability::found(String::new()))
        } else {
            tracing::debug!("every Jefferson clinic is full");
            Ok(Availability::none())
        }
    }
}
