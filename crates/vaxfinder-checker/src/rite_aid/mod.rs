//! Rite Aid checker.
//!
//! The store finder only returns the stores nearest one address, so the
//! operator supplies several search locations and the union is cached for a
//! day. Every cycle then asks each cached store for its slot status. A store
//! that reports a slot is postponed for ten check periods so it does not
//! re-notify while the operator is booking it.

mod cache;
mod parse;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::checker::{Availability, Checker, PollState};
use crate::error::CheckError;
use crate::session::{SessionClient, SessionOptions};

pub use cache::{Location, LocationCache, CACHE_MAX_AGE_HOURS};
pub use parse::{parse_slot_status, parse_store_list, PhillyMode};

pub const RITE_AID_COOKIE_FILE: &str = ".riteAidCookies";
pub const DEFAULT_API_BASE: &str = "https://www.riteaid.com";

/// Postponement after a store reports availability, in check periods.
pub const POSTPONE_PERIODS: u32 = 10;

const FIND_STORES_PATH: &str = "/services/ext/v2/stores/getStores";
const CHECK_SLOTS_PATH: &str = "/services/ext/v2/vaccine/checkSlots";
const SEARCH_RADIUS_MILES: &str = "50";

pub struct RiteAidChecker {
    url: String,
    api_base: String,
    search_locations: Vec<String>,
    home_state: String,
    philly_mode: PhillyMode,
    postpone_window: chrono::Duration,
    session: SessionClient,
    cache: LocationCache,
}

impl RiteAidChecker {
    pub fn new(
        url: &str,
        search_locations: Vec<String>,
        home_state: &str,
        philly_mode: PhillyMode,
        check_period: Duration,
        session: SessionClient,
    ) -> Self {
        let postpone = check_period.saturating_mul(POSTPONE_PERIODS);
        Self {
            url: url.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
            search_locations,
            home_state: home_state.to_ascii_uppercase(),
            philly_mode,
            postpone_window: chrono::Duration::from_std(postpone)
                .unwrap_or(chrono::Duration::MAX),
            session,
            cache: LocationCache::new(),
        }
    }

    /// Sends store-finder and slot requests to another origin (a mock server in tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn session_options(timeout_secs: u64, user_agent: &str, cookie_dir: &Path) -> SessionOptions {
        SessionOptions::new(timeout_secs, user_agent)
            .follow_redirects()
            .cookie_file(cookie_dir.join(RITE_AID_COOKIE_FILE))
    }

    #[must_use]
    pub fn cache(&self) -> &LocationCache {
        &self.cache
    }

    /// Runs one cycle as of `now`.
    ///
    /// # Errors
    ///
    /// Any transport failure aborts the cycle, including one on a single
    /// store's slot request. Parse failures for one search location or one
    /// store are logged and skipped.
    pub async fn check_at(&mut self, now: DateTime<Utc>) -> Result<Availability, CheckError> {
        self.session.get(&self.url).await.inspect_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "Rite Aid get failed");
        })?;

        if self.cache.is_stale(now) {
            self.rebuild_cache(now).await?;
        }

        let checkable: Vec<u64> = self.cache.checkable_mut(now).map(|s| s.store_id).collect();
        let mut found = Vec::new();

        for store_id in checkable {
            let slots_url = api_url(
                &self.api_base,
                CHECK_SLOTS_PATH,
                &[("storeNumber", &store_id.to_string())],
            )?;
            let body = self
                .session
                .get_with_referer(&slots_url, &self.url)
                .await
                .inspect_err(|e| {
                    tracing::warn!(store_id, error = %e, "Rite Aid check status failed");
                })?;

            match parse_slot_status(&body) {
                Ok(true) => found.push(store_id),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(store_id, error = %e, "unreadable Rite Aid slot status; skipping store");
                }
            }
        }

        // Postponements apply only to a cycle that completed.
        let postpone_until = now
            .checked_add_signed(self.postpone_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut availability = Availability::none();
        for store_id in found {
            let Some(store) = self.cache.get_mut(store_id) else {
                continue;
            };
            tracing::info!(store_id, until = %postpone_until, "Rite Aid slot found; postponing store");
            store.postpone(postpone_until);
            availability.available = true;
            availability.message.push_str(&store.describe());
            availability.message.push('\n');
        }

        Ok(availability)
    }

    async fn rebuild_cache(&mut self, now: DateTime<Utc>) -> Result<(), CheckError> {
        let mut rebuilt = LocationCache::new();

        for location in &self.search_locations {
            let url = find_stores_url(&self.api_base, location)?;
            let body = self
                .session
                .get_with_referer(&url, &self.url)
                .await
                .inspect_err(|e| {
                    tracing::warn!(location, error = %e, "Rite Aid get stores failed");
                })?;

            match parse_store_list(&body, &self.home_state, self.philly_mode) {
                Ok(stores) => {
                    let added = rebuilt.merge(stores);
                    tracing::debug!(location, added, "merged Rite Aid stores");
                }
                Err(e) => {
                    tracing::warn!(location, error = %e, "unreadable Rite Aid store list; skipping location");
                }
            }
        }

        tracing::info!(stores = rebuilt.len(), "rebuilt Rite Aid location cache");
        self.cache.replace_with(rebuilt, now);
        Ok(())
    }
}

#[async_trait]
impl Checker for RiteAidChecker {
    fn name(&self) -> &str {
        "Rite Aid Checker"
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn check_availability(&mut self) -> Result<Availability, CheckError> {
        self.check_at(Utc::now()).await
    }

    /// Per-store postponement already throttles repeats.
    fn state_after_found(&self) -> PollState {
        PollState::NormalCheck
    }
}

fn find_stores_url(api_base: &str, location: &str) -> Result<String, CheckError> {
    api_url(
        api_base,
        FIND_STORES_PATH,
        &[
            ("address", location),
            ("attrFilter", "PREF-112"),
            ("fetchMechanismVersion", "2"),
            ("radius", SEARCH_RADIUS_MILES),
        ],
    )
}

/// Joins `path` onto `api_base` with percent-encoded query parameters.
fn api_url(api_base: &str, path: &str, params: &[(&str, &str)]) -> Result<String, CheckError> {
    let mut url = Url::parse(api_base).map_err(|e| CheckError::InvalidUrl {
        url: api_base.to_owned(),
        reason: e.to_string(),
    })?;
    url.set_path(path);
    url.query_pairs_mut().extend_pairs(params);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_stores_url_encodes_search_location() {
        let url = find_stores_url(DEFAULT_API_BASE, "King of Prussia, PA").unwrap();
        assert_eq!(
            url,
            "https://www.riteaid.com/services/ext/v2/stores/getStores?address=King+of+Prussia%2C+PA&attrFilter=PREF-112&fetchMechanismVersion=2&radius=50"
        );
    }

    #[test]
    fn check_slots_url_carries_store_number() {
        let url = api_url(DEFAULT_API_BASE, CHECK_SLOTS_PATH, &[("storeNumber", "311")]).unwrap();
        assert_eq!(
            url,
            "https://www.riteaid.com/services/ext/v2/vaccine/checkSlots?storeNumber=311"
        );
    }

    #[test]
    fn api_url_rejects_bad_base() {
        let err = api_url("riteaid", CHECK_SLOTS_PATH, &[]).unwrap_err();
        assert!(matches!(err, CheckError::InvalidUrl { .. }));
    }
}
