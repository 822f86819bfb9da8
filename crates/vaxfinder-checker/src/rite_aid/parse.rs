//! Rite Aid store-finder and slot-status parsing.
//!
//! Store finder: `{ "Data": { "stores": [ { "storeNumber": 1234, "address": "...",
//! "city": "...", "state": "PA", "zipcode": "..." } ] } }`
//!
//! Slot status: `{ "Data": { "slots": { "1": bool, "2": bool } } }`. What
//! distinguishes the two flags is not documented by the provider; either one
//! being `true` counts as availability.

use serde_json::Value;

use super::cache::Location;
use crate::error::CheckError;

const PHILADELPHIA: &str = "Philadelphia";

/// Whether the operator is searching inside or outside Philadelphia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhillyMode {
    Within,
    Outside,
}

impl PhillyMode {
    #[must_use]
    pub fn from_flag(philly_mode: bool) -> Self {
        if philly_mode {
            PhillyMode::Within
        } else {
            PhillyMode::Outside
        }
    }

    #[must_use]
    pub fn admits(self, city: &str) -> bool {
        let in_philly = city.trim().eq_ignore_ascii_case(PHILADELPHIA);
        match self {
            PhillyMode::Within => in_philly,
            PhillyMode::Outside => !in_philly,
        }
    }
}

fn parse_root(body: &str, context: &str) -> Result<Value, CheckError> {
    serde_json::from_str(body).map_err(|e| CheckError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Parses a store-finder response, keeping stores in `home_state` that pass
/// the Philadelphia filter.
///
/// # Errors
///
/// - [`CheckError::Deserialize`] if the body is not JSON.
/// - [`CheckError::MissingField`] if `Data.stores` is missing.
///
/// A store missing one of its own fields is logged and skipped.
pub fn parse_store_list(
    body: &str,
    home_state: &str,
    mode: PhillyMode,
) -> Result<Vec<Location>, CheckError> {
    const CONTEXT: &str = "Rite Aid store list";

    let root = parse_root(body, CONTEXT)?;
    let stores = root
        .get("Data")
        .ok_or_else(|| CheckError::missing(CONTEXT, "Data"))?
        .get("stores")
        .and_then(Value::as_array)
        .ok_or_else(|| CheckError::missing(CONTEXT, "Data.stores"))?;

    let locations = stores
        .iter()
        .enumerate()
        .filter_map(|(index, store)| {
            let parsed = parse_store(store);
            if parsed.is_none() {
                tracing::warn!(index, "Rite Aid store entry is incomplete; skipping");
            }
            parsed
        })
        .filter(|loc| loc.state.eq_ignore_ascii_case(home_state) && mode.admits(&loc.city))
        .collect();

    Ok(locations)
}

fn parse_store(store: &Value) -> Option<Location> {
    let store_id = store.get("storeNumber").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
    })?;
    let text = |key: &str| store.get(key).and_then(Value::as_str).map(str::trim);

    Some(Location::new(
        store_id,
        text("address")?,
        text("city")?,
        text("state")?,
        text("zipcode")?,
    ))
}

/// Parses a slot-status response into a single availability flag.
///
/// # Errors
///
/// - [`CheckError::Deserialize`] if the body is not JSON.
/// - [`CheckError::MissingField`] if `Data.slots` or either flag is missing.
pub fn parse_slot_status(body: &str) -> Result<bool, CheckError> {
    const CONTEXT: &str = "Rite Aid slot status";

    let root = parse_root(body, CONTEXT)?;
    let slots = root
        .get("Data")
        .ok_or_else(|| CheckError::missing(CONTEXT, "Data"))?
        .get("slots")
        .ok_or_else(|| CheckError::missing(CONTEXT, "Data.slots"))?;

    let flag = |key: &str| {
        slots
            .get(key)
            .and_then(Value::as_bool)
            .ok_or_else(|| CheckError::missing(CONTEXT, &format!("Data.slots.{key}")))
    };

    let first = flag("1")?;
    let second = flag("2")?;
    Ok(first || second)
}
