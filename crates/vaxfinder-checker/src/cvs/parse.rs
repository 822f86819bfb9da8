//! CVS vaccine-status feed parsing.
//!
//! Observed shape:
//!
//! ```json
//! { "responsePayloadData": {
//!     "isBookingCompleted": false,
//!     "data": { "PA": [ { "status": "Fully Booked", "city": "PITTSBURGH" }, ... ] } } }
//! ```
//!
//! Only the literal status `"Fully Booked"` counts as closed. Any other value,
//! including unfamiliar or non-string ones, is treated as open so a real
//! opening is never missed.

use std::collections::HashSet;

use serde_json::Value;

use crate::checker::Availability;
use crate::error::CheckError;

pub const FULLY_BOOKED: &str = "Fully Booked";

const CONTEXT: &str = "CVS status response";

/// Cities the operator does not want to hear about, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ExcludeList(HashSet<String>);

impl ExcludeList {
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            cities
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn contains(&self, city: &str) -> bool {
        self.0.contains(&city.trim().to_uppercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvsStatus {
    pub availability: Availability,
    /// Every city named in the feed, in feed order. `None` when booking is
    /// closed and the location list was not read.
    pub discovered_cities: Option<Vec<String>>,
}

/// Parses the status feed for `state` (the key of the location array).
///
/// # Errors
///
/// - [`CheckError::Deserialize`] if the body is not JSON.
/// - [`CheckError::MissingField`] if `responsePayloadData`,
///   `isBookingCompleted`, `data` or the state array is missing.
pub fn parse_status(
    body: &str,
    state: &str,
    exclude: &ExcludeList,
) -> Result<CvsStatus, CheckError> {
    let root: Value = serde_json::from_str(body).map_err(|e| CheckError::Deserialize {
        context: CONTEXT.to_owned(),
        source: e,
    })?;

    let payload = root
        .get("responsePayloadData")
        .ok_or_else(|| CheckError::missing(CONTEXT, "responsePayloadData"))?;

    let booking_completed = payload
        .get("isBookingCompleted")
        .and_then(Value::as_bool)
        .ok_or_else(|| CheckError::missing(CONTEXT, "isBookingCompleted"))?;

    if booking_completed {
        return Ok(CvsStatus {
            availability: Availability::none(),
            discovered_cities: None,
        });
    }

    let entries = payload
        .get("data")
        .ok_or_else(|| CheckError::missing(CONTEXT, "data"))?
        .get(state)
        .and_then(Value::as_array)
        .ok_or_else(|| CheckError::missing(CONTEXT, &format!("data.{state}")))?;

    let mut discovered = Vec::new();
    let mut availability = Availability::none();

    for (index, entry) in entries.iter().enumerate() {
        let Some(status) = entry.get("status") else {
            tracing::warn!(index, "CVS location entry has no status; skipping");
            continue;
        };
        let Some(city) = entry.get("city").and_then(Value::as_str) else {
            tracing::warn!(index, "CVS location entry has no city; skipping");
            continue;
        };

        discovered.push(city.to_owned());

        if status.as_str() == Some(FULLY_BOOKED) || exclude.contains(city) {
            continue;
        }

        availability.available = true;
        availability.message.push_str(city);
        availability.message.push('\n');
    }

    Ok(CvsStatus {
        availability,
        discovered_cities: Some(discovered),
    })
}
