//! CVS checker.
//!
//! Each cycle primes the session cookies with the public vaccine page, then
//! reads the per-state status feed with the page as referer.

mod parse;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::checker::{Availability, Checker};
use crate::error::CheckError;
use crate::session::{SessionClient, SessionOptions};
use crate::sink::LocationsSink;

pub use parse::{parse_status, CvsStatus, ExcludeList, FULLY_BOOKED};

pub const CVS_COOKIE_FILE: &str = ".cvsCookies";

pub struct CvsChecker {
    url: String,
    status_url: String,
    state: String,
    exclude: ExcludeList,
    session: SessionClient,
    locations_sink: Option<Arc<dyn LocationsSink>>,
}

impl CvsChecker {
    /// Creates a checker reading the production status feed for `state`.
    pub fn new<S: AsRef<str>>(
        url: &str,
        state: &str,
        exclude_cities: &[S],
        session: SessionClient,
    ) -> Self {
        let state = state.to_ascii_uppercase();
        Self {
            url: url.to_owned(),
            status_url: Self::status_url_for(&state),
            state,
            exclude: ExcludeList::new(exclude_cities.iter().map(AsRef::as_ref)),
            session,
            locations_sink: None,
        }
    }

    /// Points the status request somewhere else (a mock server in tests).
    #[must_use]
    pub fn with_status_url(mut self, status_url: &str) -> Self {
        status_url.clone_into(&mut self.status_url);
        self
    }

    #[must_use]
    pub fn with_locations_sink(mut self, sink: Arc<dyn LocationsSink>) -> Self {
        self.locations_sink = Some(sink);
        self
    }

    #[must_use]
    pub fn status_url_for(state: &str) -> String {
        format!(
            "https://www.cvs.com/immunizations/covid-19-vaccine.vaccine-status.{state}.json?vaccineinfo"
        )
    }

    /// CVS needs redirects followed and cookies kept between calls.
    #[must_use]
    pub fn session_options(timeout_secs: u64, user_agent: &str, cookie_dir: &Path) -> SessionOptions {
        SessionOptions::new(timeout_secs, user_agent)
            .follow_redirects()
            .cookie_file(cookie_dir.join(CVS_COOKIE_FILE))
    }
}

#[async_trait]
impl Checker for CvsChecker {
    fn name(&self) -> &str {
        "CVS"
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn check_availability(&mut self) -> Result<Availability, CheckError> {
        self.session.get(&self.url).await.inspect_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "CVS base get failed");
        })?;

        let body = self
            .session
            .get_with_referer(&self.status_url, &self.url)
            .await
            .inspect_err(|e| {
                tracing::warn!(url = %self.status_url, error = %e, "CVS get status failed");
            })?;

        let status = parse_status(&body, &self.state, &self.exclude)?;

        if let (Some(sink), Some(cities)) = (&self.locations_sink, &status.discovered_cities) {
            sink.update(cities);
        }

        Ok(status.availability)
    }
}
