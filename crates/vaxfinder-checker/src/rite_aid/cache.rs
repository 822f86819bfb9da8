//! Nearby-store cache with per-store notification postponement.

use chrono::{DateTime, Duration, Utc};

/// The cache is rebuilt once it is older than this.
pub const CACHE_MAX_AGE_HOURS: i64 = 24;

/// One Rite Aid store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub store_id: u64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    postponed_until: Option<DateTime<Utc>>,
}

impl Location {
    #[must_use]
    pub fn new(store_id: u64, address: &str, city: &str, state: &str, zip: &str) -> Self {
        Self {
            store_id,
            address: address.to_owned(),
            city: city.to_owned(),
            state: state.to_owned(),
            zip: zip.to_owned(),
            postponed_until: None,
        }
    }

    #[must_use]
    pub fn postponed_until(&self) -> Option<DateTime<Utc>> {
        self.postponed_until
    }

    /// Skip this store in availability checks until `until`.
    pub fn postpone(&mut self, until: DateTime<Utc>) {
        self.postponed_until = Some(until);
    }

    /// Postponed for all of `[start, until)`.
    #[must_use]
    pub fn is_postponed(&self, now: DateTime<Utc>) -> bool {
        self.postponed_until.is_some_and(|until| now < until)
    }

    /// Clears an elapsed postponement. Returns `true` if one was cleared.
    pub fn release_if_elapsed(&mut self, now: DateTime<Utc>) -> bool {
        if self.postponed_until.is_some_and(|until| now >= until) {
            self.postponed_until = None;
            return true;
        }
        false
    }

    /// Notification line for this store.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "Rite Aid Location Info:  {}, {}, {} {}",
            self.address, self.city, self.state, self.zip
        )
    }
}

/// Stores found for the operator's search locations, deduplicated by store id.
#[derive(Debug, Default)]
pub struct LocationCache {
    stores: Vec<Location>,
    built_at: Option<DateTime<Utc>>,
}

impl LocationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stores(&self) -> &[Location] {
        &self.stores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    #[must_use]
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    #[must_use]
    pub fn get(&self, store_id: u64) -> Option<&Location> {
        self.stores.iter().find(|s| s.store_id == store_id)
    }

    pub fn get_mut(&mut self, store_id: u64) -> Option<&mut Location> {
        self.stores.iter_mut().find(|s| s.store_id == store_id)
    }

    /// Empty, never built, or older than [`CACHE_MAX_AGE_HOURS`].
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        if self.stores.is_empty() {
            return true;
        }
        self.built_at
            .map_or(true, |built_at| now - built_at > Duration::hours(CACHE_MAX_AGE_HOURS))
    }

    /// Adds stores whose id is not cached yet; the first occurrence wins.
    /// Returns how many were added.
    pub fn merge<I>(&mut self, found: I) -> usize
    where
        I: IntoIterator<Item = Location>,
    {
        let mut added = 0;
        for store in found {
            if self.get(store.store_id).is_none() {
                self.stores.push(store);
                added += 1;
            }
        }
        added
    }

    /// Swaps in a freshly built store list, stamped `now`.
    ///
    /// Stores present in both keep their current postponement.
    pub fn replace_with(&mut self, mut rebuilt: LocationCache, now: DateTime<Utc>) {
        for store in &mut rebuilt.stores {
            if let Some(until) = self.get(store.store_id).and_then(Location::postponed_until) {
                store.postpone(until);
            }
        }
        self.stores = rebuilt.stores;
        self.built_at = Some(now);
    }

    /// Stores eligible for a slot check at `now`, after releasing elapsed
    /// postponements.
    pub fn checkable_mut(&mut self, now: DateTime<Utc>) -> impl Iterator<Item = &mut Location> {
        self.stores.iter_mut().filter_map(move |store| {
            store.release_if_elapsed(now);
            (!store.is_postponed(now)).then_some(store)
        })
    }
}
